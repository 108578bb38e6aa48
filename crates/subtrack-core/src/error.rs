//! Error types for Subtrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Malformed or missing input (bad amount, unknown cycle, empty name, ...)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The referenced subscription id does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Failure of the backing store itself, surfaced unchanged to the caller
    pub fn is_storage(&self) -> bool {
        !self.is_validation() && !self.is_not_found()
    }

    pub(crate) fn subscription_not_found(id: i64) -> Self {
        Self::NotFound(format!("Subscription {} not found", id))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
