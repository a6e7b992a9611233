//! Error types for the metabostat library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MetaboError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid value '{value}' at row {row}, column '{column}'")]
    InvalidValue {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Unknown sample group '{0}'")]
    UnknownGroup(String),

    #[error("Unknown compound '{0}'")]
    UnknownCompound(String),

    #[error("Expected exactly one row for compound '{compound}', found {found}")]
    MultipleRows { compound: String, found: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("All predictor values are identical; regression is undefined")]
    IdenticalPredictor,

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MetaboError>;
