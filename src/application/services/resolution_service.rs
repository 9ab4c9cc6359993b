//! Short key resolution.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::key_codec;

/// Resolves short keys back to their records.
pub struct ResolutionService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UrlRepository + ?Sized> ResolutionService<R> {
    /// Creates a new resolution service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Decodes `key` and looks up the record holding that sequence id.
    ///
    /// Keys that are not base-36 and keys whose id was never assigned are
    /// both reported as [`AppError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record matches.
    /// Returns [`AppError::Unavailable`] / [`AppError::Internal`] on store faults.
    pub async fn resolve(&self, key: &str) -> Result<UrlRecord, AppError> {
        let Some(sequence_id) = key_codec::decode(key) else {
            debug!("Key {:?} is not base-36", key);
            return Err(AppError::key_not_found());
        };

        self.repository
            .find_by_sequence_id(sequence_id)
            .await?
            .ok_or_else(|| {
                debug!("No record for key {} (sequence_id {})", key, sequence_id);
                AppError::key_not_found()
            })
    }
}
