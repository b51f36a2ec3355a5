use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use lms_common::error::FetchError;
use lms_common::types::Resource;

/// Produces the current payload of a resource.
///
/// Implementations must be idempotent and must not mutate caller state; the
/// synchronizer may call them at any time and discards nothing but errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, resource: Resource) -> Result<serde_json::Value, FetchError>;

    /// Human-readable name for logs (e.g., "mock-rest").
    fn name(&self) -> &'static str;
}

/// Maps each resource to the fetcher that refreshes it.
#[derive(Clone, Default)]
pub struct FetcherSet {
    fetchers: HashMap<Resource, Arc<dyn Fetcher>>,
}

impl FetcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fetcher` for `resource`, replacing any previous one.
    pub fn register(mut self, resource: Resource, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetchers.insert(resource, fetcher);
        self
    }

    pub fn get(&self, resource: Resource) -> Option<Arc<dyn Fetcher>> {
        self.fetchers.get(&resource).cloned()
    }

    /// Resources with no registered fetcher.
    pub fn missing(&self) -> Vec<Resource> {
        Resource::ALL
            .iter()
            .copied()
            .filter(|r| !self.fetchers.contains_key(r))
            .collect()
    }

    /// Fail unless every resource has a fetcher.
    pub fn ensure_complete(&self) -> Result<(), FetchError> {
        match self.missing().first() {
            Some(resource) => Err(FetchError::Unavailable(resource.to_string())),
            None => Ok(()),
        }
    }
}
