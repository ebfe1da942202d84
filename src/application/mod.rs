//! Application layer: services and the editor controller
//!
//! This layer orchestrates domain logic and owns the mutable editor state.

pub mod controller;
pub mod error;
pub mod services;

pub use controller::{EditorController, EditorFeatures, IgnoreReason, RelinkState, SelectionOutcome};
pub use error::{ApplicationError, ApplicationResult, Feature};
