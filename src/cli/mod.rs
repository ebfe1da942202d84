//! CLI layer: argument parsing, script interpretation and output

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod script;

pub use args::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};
