//! Repository trait for URL record storage.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a [`UrlRepository`].
///
/// The two `Duplicate*` variants are expected outcomes of concurrent inserts
/// and are handled by [`crate::application::services::SequenceAllocator`].
/// Everything else is a genuine fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("sequence id {0} is already assigned")]
    DuplicateSequenceId(u64),

    #[error("url is already shortened: {0}")]
    DuplicateOriginalUrl(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store returned corrupted data: {0}")]
    Corrupted(String),
}

/// Repository interface for the append-only set of URL records.
///
/// Implementations must enforce uniqueness of both `original_url` and
/// `sequence_id` inside the store itself. Concurrent allocators rely on
/// [`UrlRepository::insert_unique`] rejecting the losing side of a race.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Finds the record for an original URL, compared byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] on storage errors.
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, RepositoryError>;

    /// Finds the record holding a sequence id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] on storage errors.
    async fn find_by_sequence_id(
        &self,
        sequence_id: u64,
    ) -> Result<Option<UrlRecord>, RepositoryError>;

    /// Returns the highest assigned sequence id, or `None` for an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Corrupted`] if the stored maximum is not a
    /// valid sequence id, [`RepositoryError::Unavailable`] on storage errors.
    async fn find_max_sequence_id(&self) -> Result<Option<u64>, RepositoryError>;

    /// Inserts a record, failing if either unique key is already taken.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::DuplicateSequenceId`] if the sequence id is taken
    /// - [`RepositoryError::DuplicateOriginalUrl`] if the URL is taken
    /// - [`RepositoryError::Unavailable`] on storage errors
    async fn insert_unique(&self, new_record: NewUrlRecord) -> Result<UrlRecord, RepositoryError>;
}
