//! Tree state and layout engine for hierarchical diagram editors.
//!
//! The [`domain`] layer holds the node model and the pure layout and
//! connector functions. The [`application`] layer owns the editable state:
//! [`application::EditorController`] accepts id-parameterized commands and
//! hands out immutable [`domain::Snapshot`]s.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
