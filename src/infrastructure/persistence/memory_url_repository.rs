//! In-process implementation of the URL repository.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{RepositoryError, UrlRepository};

#[derive(Debug, Default)]
struct Records {
    by_url: HashMap<String, u64>,
    by_sequence_id: BTreeMap<u64, String>,
}

/// In-memory repository used for development (`STORAGE_BACKEND=memory`) and
/// tests.
///
/// The two indexes live behind one `RwLock`, so an insert checks both unique
/// keys and writes both entries as one step. The lock is only held inside a
/// single repository call, never across the allocator's read-then-insert
/// sequence.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    records: RwLock<Records>,
}

impl MemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.by_sequence_id.len())
    }

    /// Returns true if no record has been stored yet.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Records>, RepositoryError> {
        self.records.read().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, RepositoryError> {
        let records = self.read()?;

        Ok(records
            .by_url
            .get(original_url)
            .map(|&sequence_id| UrlRecord::new(original_url, sequence_id)))
    }

    async fn find_by_sequence_id(
        &self,
        sequence_id: u64,
    ) -> Result<Option<UrlRecord>, RepositoryError> {
        let records = self.read()?;

        Ok(records
            .by_sequence_id
            .get(&sequence_id)
            .map(|url| UrlRecord::new(url.clone(), sequence_id)))
    }

    async fn find_max_sequence_id(&self) -> Result<Option<u64>, RepositoryError> {
        let records = self.read()?;

        Ok(records.by_sequence_id.keys().next_back().copied())
    }

    async fn insert_unique(&self, new_record: NewUrlRecord) -> Result<UrlRecord, RepositoryError> {
        let mut records = self.records.write().map_err(poisoned)?;

        if records.by_sequence_id.contains_key(&new_record.sequence_id) {
            return Err(RepositoryError::DuplicateSequenceId(new_record.sequence_id));
        }
        if records.by_url.contains_key(&new_record.original_url) {
            return Err(RepositoryError::DuplicateOriginalUrl(new_record.original_url));
        }

        records
            .by_url
            .insert(new_record.original_url.clone(), new_record.sequence_id);
        records
            .by_sequence_id
            .insert(new_record.sequence_id, new_record.original_url.clone());

        Ok(new_record.into())
    }
}
