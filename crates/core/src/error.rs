//! Error types for the trade-insights pipeline.
//!
//! Data-quality problems (an unparsable price, a garbled timestamp) are never
//! errors: they become missing cells. Only structural and configuration
//! problems surface here.

use thiserror::Error;

use crate::schema::Schema;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trade-insights pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Input is not a table of rows and columns.
    #[error("Input shape error: {0}")]
    InputShape(String),

    /// A column the schema cannot do without is absent from the input.
    #[error("Missing column '{column}' required by the {schema} schema")]
    MissingColumn { schema: Schema, column: String },

    /// A caller-named column does not exist in the table.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an input shape error.
    pub fn input_shape(msg: impl Into<String>) -> Self {
        Error::InputShape(msg.into())
    }

    /// Create a missing column error.
    pub fn missing_column(schema: Schema, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            schema,
            column: column.into(),
        }
    }

    /// Create an unknown column error.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Error::UnknownColumn(column.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// True for errors caused by the shape of the input rather than by configuration.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::InputShape(_) | Error::MissingColumn { .. })
    }
}
