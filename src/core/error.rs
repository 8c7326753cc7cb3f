

use thiserror::Error;

use crate::db::StoreError;


#[derive(Error, Debug)]
pub enum SoftDeleteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema field collision: {0}")]
    FieldCollision(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SoftDeleteError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }


    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<config::ConfigError> for SoftDeleteError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}


pub type Result<T> = std::result::Result<T, SoftDeleteError>;
