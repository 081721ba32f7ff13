use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotifError {
    #[error("Invalid count matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid background distribution: {0}")]
    InvalidBackground(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Invalid sequence at position {position}: {message}")]
    InvalidSequence { position: usize, message: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Scan cancelled")]
    Cancelled,
}

/// Type alias for Result with MotifError
pub type Result<T> = std::result::Result<T, MotifError>;

impl MotifError {
    /// Create a new InvalidMatrix error
    pub fn invalid_matrix(message: impl Into<String>) -> Self {
        MotifError::InvalidMatrix(message.into())
    }

    /// Create a new InvalidBackground error
    pub fn invalid_background(message: impl Into<String>) -> Self {
        MotifError::InvalidBackground(message.into())
    }

    /// Create a new InvalidSequence error
    pub fn invalid_sequence(position: usize, message: impl Into<String>) -> Self {
        MotifError::InvalidSequence {
            position,
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        MotifError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error was raised while building or calibrating a motif.
    ///
    /// These errors are fatal to the affected motif only; the caller decides
    /// whether to skip it or abort the run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MotifError::InvalidMatrix(_)
                | MotifError::InvalidBackground(_)
                | MotifError::InvalidParameter { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for MotifError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        MotifError::DataError(e.to_string())
    }
}
