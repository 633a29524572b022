use crate::db::errors::DbError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or unusable configuration, detected before any connection attempt
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Entity input that cannot be turned into a create request
    #[error("Invalid {entity}: {message}")]
    Validation { entity: &'static str, message: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration { message: message.into() }
    }
}

/// Lets session closures use `?` on sqlx calls when their error type is [`Error`].
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(DbError::from(err))
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
