//! Application-level errors (wraps domain errors)

use std::fmt;

use thiserror::Error;

use crate::domain::DomainError;

/// Optional editor capabilities layered on the same engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Relink,
    Categories,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Relink => f.write_str("relink"),
            Feature::Categories => f.write_str("categories"),
        }
    }
}

/// Application errors wrap domain errors and add editor-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("feature disabled: {0}")]
    FeatureDisabled(Feature),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
