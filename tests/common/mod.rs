#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use seq_shortener::domain::entities::{NewUrlRecord, UrlRecord};
use seq_shortener::domain::repositories::{RepositoryError, UrlRepository};
use seq_shortener::infrastructure::cache::{CacheError, CacheResult, CacheService, NullCache};
use seq_shortener::infrastructure::persistence::MemoryUrlRepository;
use seq_shortener::routes::app_router;
use seq_shortener::state::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const HOST: &str = "s.example.com";

/// State over an empty in-memory store with caching disabled.
pub fn create_test_state() -> (AppState, Arc<MemoryUrlRepository>) {
    let repo = Arc::new(MemoryUrlRepository::new());
    let state = AppState::new(repo.clone(), Arc::new(NullCache), 8);

    (state, repo)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(app_router(state)).unwrap()
}

pub async fn insert_record(repo: &MemoryUrlRepository, url: &str, sequence_id: u64) {
    repo.insert_unique(NewUrlRecord {
        original_url: url.to_string(),
        sequence_id,
    })
    .await
    .unwrap();
}

/// Repository whose every call fails as if the database were down.
pub struct UnavailableRepository;

#[async_trait]
impl UrlRepository for UnavailableRepository {
    async fn find_by_original_url(&self, _: &str) -> Result<Option<UrlRecord>, RepositoryError> {
        Err(down())
    }

    async fn find_by_sequence_id(&self, _: u64) -> Result<Option<UrlRecord>, RepositoryError> {
        Err(down())
    }

    async fn find_max_sequence_id(&self) -> Result<Option<u64>, RepositoryError> {
        Err(down())
    }

    async fn insert_unique(&self, _: NewUrlRecord) -> Result<UrlRecord, RepositoryError> {
        Err(down())
    }
}

fn down() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_string())
}

/// In-process cache that records writes; optionally fails every call.
#[derive(Default)]
pub struct RecordingCache {
    pub entries: Mutex<HashMap<String, String>>,
    pub failing: bool,
}

impl RecordingCache {
    pub fn with_entry(key: &str, url: &str) -> Self {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), url.to_string());
        cache
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl CacheService for RecordingCache {
    async fn get_url(&self, key: &str) -> CacheResult<Option<String>> {
        if self.failing {
            return Err(CacheError::OperationError("cache down".to_string()));
        }
        Ok(self.get(key))
    }

    async fn set_url(&self, key: &str, original_url: &str, _: Option<u64>) -> CacheResult<()> {
        if self.failing {
            return Err(CacheError::OperationError("cache down".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), original_url.to_string());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.failing
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}
