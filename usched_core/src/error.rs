//! Error types for the usched_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for usched_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Allocation requested while a result already exists; reset first
    #[error("Assignments already exist")]
    AlreadyAssigned,

    /// No eligible, unclaimed room fits the named section
    #[error("No suitable room for section {section_name} ({section_id})")]
    Infeasible {
        section_id: String,
        section_name: String,
    },

    /// A stored assignment references data missing from the catalog.
    ///
    /// This is never a business condition: it means commit atomicity or
    /// catalog immutability was broken somewhere else.
    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),
}

impl Error {
    /// True for failures that indicate a broken internal invariant
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Invariant(_) | Error::State(_))
    }
}
