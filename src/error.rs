//! Error types shared between the storage backend and the HTTP layer

use thiserror::Error;

/// Boxed backend error carried by [`StorageError::Unavailable`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Outcome classes of a storage call
///
/// Handlers match on this exhaustively; the backend detail inside
/// `Unavailable` is for logs only and never reaches the client.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("alias already exists")]
    AliasExists,

    #[error("alias not found")]
    AliasNotFound,

    #[error("{op}: {source}")]
    Unavailable {
        op: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    /// Wraps any backend error with the name of the failing operation
    pub fn unavailable<E>(op: &'static str) -> impl FnOnce(E) -> StorageError
    where
        E: Into<BoxError>,
    {
        move |err| StorageError::Unavailable {
            op,
            source: err.into(),
        }
    }
}
