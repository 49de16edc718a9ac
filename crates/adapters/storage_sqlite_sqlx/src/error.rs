//! Storage-specific error type wrapping sqlx errors.

use haulhub_domain::error::HaulHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a stored JSON value.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for HaulHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
