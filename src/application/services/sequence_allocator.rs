//! Sequence id allocation for newly shortened URLs.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{RepositoryError, UrlRepository};
use crate::error::AppError;

/// Default bound on insert attempts per `shorten` call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

/// First backoff delay after a sequence collision, in milliseconds.
const BACKOFF_BASE_MS: u64 = 2;

/// Upper bound on a single backoff delay.
const BACKOFF_MAX_DELAY: Duration = Duration::from_millis(50);

/// Outcome of one allocation attempt that did not produce a record.
#[derive(Debug)]
enum AttemptError {
    /// Another allocator took the candidate id first. Retryable.
    Collision(u64),
    /// Anything else. Aborts the request.
    Fatal(AppError),
}

impl From<RepositoryError> for AttemptError {
    fn from(e: RepositoryError) -> Self {
        Self::Fatal(e.into())
    }
}

/// Assigns sequence ids to URLs.
///
/// The next id is derived from the store at allocation time (`max + 1`) and
/// claimed with a unique insert. There is no in-process counter and no lock
/// across the read-then-insert steps: when two allocators pick the same
/// candidate the store rejects one insert, and the loser re-reads the maximum
/// and tries again. This holds across any number of service instances sharing
/// one store.
pub struct SequenceAllocator<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    max_attempts: usize,
}

impl<R: UrlRepository + ?Sized> SequenceAllocator<R> {
    /// Creates an allocator with [`DEFAULT_MAX_ATTEMPTS`].
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the insert attempt bound. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the record for `original_url`, creating it if needed.
    ///
    /// The URL is used verbatim; callers validate it beforehand. Shortening a
    /// URL that already has a record returns that record and consumes no id.
    ///
    /// # Errors
    ///
    /// - [`AppError::AllocationExhausted`] if every attempt lost a sequence id race
    /// - [`AppError::Unavailable`] / [`AppError::Internal`] on store faults,
    ///   which are never retried
    pub async fn shorten(&self, original_url: &str) -> Result<UrlRecord, AppError> {
        if let Some(existing) = self.repository.find_by_original_url(original_url).await? {
            debug!(
                "Dedupe hit for {} (sequence_id {})",
                original_url, existing.sequence_id
            );
            return Ok(existing);
        }

        // `take` counts retries, the first attempt comes on top.
        let strategy = ExponentialBackoff::from_millis(BACKOFF_BASE_MS)
            .max_delay(BACKOFF_MAX_DELAY)
            .map(jitter)
            .take(self.max_attempts - 1);

        let result = RetryIf::start(
            strategy,
            move || self.try_allocate(original_url),
            |e: &AttemptError| matches!(e, AttemptError::Collision(_)),
        )
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(AttemptError::Collision(last_candidate)) => {
                metrics::counter!("allocator_exhausted_total").increment(1);
                error!(
                    "Sequence allocation exhausted for {} after {} attempts (last candidate {})",
                    original_url, self.max_attempts, last_candidate
                );
                Err(AppError::AllocationExhausted {
                    attempts: self.max_attempts,
                })
            }
            Err(AttemptError::Fatal(e)) => Err(e),
        }
    }

    /// One read-max-then-insert round.
    async fn try_allocate(&self, original_url: &str) -> Result<UrlRecord, AttemptError> {
        let candidate = match self.repository.find_max_sequence_id().await? {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                RepositoryError::Corrupted(format!("sequence id space exhausted at {max}"))
            })?,
            None => 0,
        };

        let new_record = NewUrlRecord {
            original_url: original_url.to_string(),
            sequence_id: candidate,
        };

        match self.repository.insert_unique(new_record).await {
            Ok(record) => {
                metrics::counter!("urls_created_total").increment(1);
                info!("Shortened {} as sequence_id {}", record.original_url, record.sequence_id);
                Ok(record)
            }
            Err(RepositoryError::DuplicateSequenceId(taken)) => {
                metrics::counter!("allocator_collisions_total").increment(1);
                warn!("Sequence id {} taken concurrently, retrying", taken);
                Err(AttemptError::Collision(taken))
            }
            Err(RepositoryError::DuplicateOriginalUrl(_)) => {
                debug!("{} shortened concurrently, returning existing record", original_url);
                self.repository
                    .find_by_original_url(original_url)
                    .await?
                    .ok_or_else(|| {
                        AttemptError::Fatal(AppError::internal(
                            "Record vanished after duplicate insert",
                            json!({ "original_url": original_url }),
                        ))
                    })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::persistence::MemoryUrlRepository;
    use std::collections::HashSet;

    fn inserted(new_record: NewUrlRecord) -> Result<UrlRecord, RepositoryError> {
        Ok(new_record.into())
    }

    #[tokio::test]
    async fn test_shorten_empty_store_starts_at_zero() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .times(1)
            .returning(|| Ok(None));
        mock_repo
            .expect_insert_unique()
            .withf(|r| r.sequence_id == 0 && r.original_url == "https://example.com/a")
            .times(1)
            .returning(inserted);

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let record = allocator.shorten("https://example.com/a").await.unwrap();

        assert_eq!(record, UrlRecord::new("https://example.com/a", 0));
    }

    #[tokio::test]
    async fn test_shorten_uses_max_plus_one() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .returning(|| Ok(Some(41)));
        mock_repo
            .expect_insert_unique()
            .withf(|r| r.sequence_id == 42)
            .times(1)
            .returning(inserted);

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let record = allocator.shorten("https://example.com").await.unwrap();

        assert_eq!(record.sequence_id, 42);
    }

    #[tokio::test]
    async fn test_shorten_deduplicates() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_find_by_original_url()
            .times(1)
            .returning(|url| Ok(Some(UrlRecord::new(url, 5))));
        mock_repo.expect_find_max_sequence_id().times(0);
        mock_repo.expect_insert_unique().times(0);

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let record = allocator.shorten("https://example.com").await.unwrap();

        assert_eq!(record.sequence_id, 5);
    }

    #[tokio::test]
    async fn test_shorten_retries_after_sequence_collision() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));

        // The first read sees 6; a concurrent winner then takes 7.
        let mut reads = 0;
        mock_repo
            .expect_find_max_sequence_id()
            .times(2)
            .returning(move || {
                reads += 1;
                Ok(Some(5 + reads))
            });
        mock_repo
            .expect_insert_unique()
            .times(2)
            .returning(|r| match r.sequence_id {
                7 => Err(RepositoryError::DuplicateSequenceId(7)),
                _ => inserted(r),
            });

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let record = allocator.shorten("https://example.com").await.unwrap();

        assert_eq!(record.sequence_id, 8);
    }

    #[tokio::test]
    async fn test_shorten_exhausts_after_max_attempts() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .times(3)
            .returning(|| Ok(Some(0)));
        mock_repo
            .expect_insert_unique()
            .times(3)
            .returning(|r| Err(RepositoryError::DuplicateSequenceId(r.sequence_id)));

        let allocator = SequenceAllocator::new(Arc::new(mock_repo)).with_max_attempts(3);
        let result = allocator.shorten("https://example.com").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::AllocationExhausted { attempts: 3 }
        ));
    }

    #[tokio::test]
    async fn test_shorten_url_collision_returns_winner() {
        let mut mock_repo = MockUrlRepository::new();

        // Missing on the dedupe check, present once the concurrent insert landed.
        let mut lookups = 0;
        mock_repo
            .expect_find_by_original_url()
            .times(2)
            .returning(move |url| {
                lookups += 1;
                if lookups == 1 {
                    Ok(None)
                } else {
                    Ok(Some(UrlRecord::new(url, 3)))
                }
            });
        mock_repo
            .expect_find_max_sequence_id()
            .times(1)
            .returning(|| Ok(Some(2)));
        mock_repo
            .expect_insert_unique()
            .times(1)
            .returning(|r| Err(RepositoryError::DuplicateOriginalUrl(r.original_url)));

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let record = allocator.shorten("https://example.com").await.unwrap();

        assert_eq!(record, UrlRecord::new("https://example.com", 3));
    }

    #[tokio::test]
    async fn test_shorten_store_fault_is_not_retried() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .times(1)
            .returning(|| Ok(Some(0)));
        mock_repo
            .expect_insert_unique()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("connection reset".into())));

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let result = allocator.shorten("https://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_shorten_corrupted_max_is_fatal() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .times(1)
            .returning(|| Err(RepositoryError::Corrupted("negative sequence_id -4".into())));
        mock_repo.expect_insert_unique().times(0);

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let result = allocator.shorten("https://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_id_space_exhausted() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_by_original_url().returning(|_| Ok(None));
        mock_repo
            .expect_find_max_sequence_id()
            .returning(|| Ok(Some(u64::MAX)));
        mock_repo.expect_insert_unique().times(0);

        let allocator = SequenceAllocator::new(Arc::new(mock_repo));
        let result = allocator.shorten("https://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[test]
    fn test_max_attempts_floor() {
        let allocator =
            SequenceAllocator::new(Arc::new(MockUrlRepository::new())).with_max_attempts(0);
        assert_eq!(allocator.max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_sequential_shorten_same_url() {
        let repo = Arc::new(MemoryUrlRepository::new());
        let allocator = SequenceAllocator::new(repo.clone());

        let first = allocator.shorten("https://example.com/a").await.unwrap();
        let second = allocator.shorten("https://example.com/a").await.unwrap();

        assert_eq!(first.sequence_id, second.sequence_id);
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scenario_sequential_ids() {
        let repo = Arc::new(MemoryUrlRepository::new());
        let allocator = SequenceAllocator::new(repo);

        let a = allocator.shorten("https://example.com/a").await.unwrap();
        let b = allocator.shorten("https://example.com/b").await.unwrap();

        assert_eq!((a.sequence_id, a.key().as_str()), (0, "0"));
        assert_eq!((b.sequence_id, b.key().as_str()), (1, "1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_distinct_urls() {
        const N: usize = 64;

        let repo = Arc::new(MemoryUrlRepository::new());
        // Each lost race means another task won, so N attempts always suffice.
        let allocator = Arc::new(SequenceAllocator::new(repo.clone()).with_max_attempts(N));

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move {
                    allocator
                        .shorten(&format!("https://example.com/{i}"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().sequence_id);
        }

        assert_eq!(ids.len(), N);
        assert_eq!(repo.len().unwrap(), N);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_same_url() {
        const M: usize = 32;

        let repo = Arc::new(MemoryUrlRepository::new());
        let allocator = Arc::new(SequenceAllocator::new(repo.clone()));

        let handles: Vec<_> = (0..M)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move {
                    allocator.shorten("https://example.com/same").await.unwrap()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().sequence_id);
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(repo.len().unwrap(), 1);
    }
}
