//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::{ResolutionService, SequenceAllocator};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheService;

/// Everything a handler needs, cheap to clone (all fields are `Arc`s or
/// small values).
#[derive(Clone)]
pub struct AppState {
    pub allocator: Arc<SequenceAllocator<dyn UrlRepository>>,
    pub resolver: Arc<ResolutionService<dyn UrlRepository>>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
    /// Fixed origin for short links; `None` derives it from the request.
    pub public_base_url: Option<String>,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services around one repository and cache.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        max_attempts: usize,
    ) -> Self {
        let allocator =
            SequenceAllocator::new(Arc::clone(&repository)).with_max_attempts(max_attempts);
        let resolver = ResolutionService::new(Arc::clone(&repository));

        Self {
            allocator: Arc::new(allocator),
            resolver: Arc::new(resolver),
            repository,
            cache,
            public_base_url: None,
            behind_proxy: false,
        }
    }

    /// Sets the fixed origin used for short links.
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// Trusts `X-Forwarded-*` headers when deriving the short-link origin.
    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }
}
