use std::sync::Arc;

use tokio::sync::Semaphore;

use super::{SongQuery, TrackMatch, providers::SearchProvider};
use crate::{info, warning};

pub const DEFAULT_SEARCH_CONCURRENCY: usize = 4;

/// Maps song queries to track URIs, tolerating per-item failure.
///
/// The provider's own relevance ranking is trusted: the whole
/// `"Title - Artist"` string is sent as query text and the top result wins.
#[derive(Clone)]
pub struct TrackResolver {
    search: Arc<dyn SearchProvider>,
    concurrency: usize,
}

impl TrackResolver {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        TrackResolver {
            search,
            concurrency: DEFAULT_SEARCH_CONCURRENCY,
        }
    }

    /// Limits the number of searches in flight. `1` resolves strictly one
    /// query at a time; values above the semaphore's permit limit are capped.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolves one query. Zero results and provider errors both yield `None`.
    pub async fn resolve(&self, access_token: &str, query: &str) -> Option<String> {
        match self.search.search_track(access_token, query).await {
            Ok(Some(uri)) => {
                info!("Found: {}", uri);
                Some(uri)
            }
            Ok(None) => {
                warning!("No track found for '{}'", query);
                None
            }
            Err(e) => {
                warning!("Error searching for track '{}': {}", query, e);
                None
            }
        }
    }

    /// Resolves every query with bounded concurrency. The returned matches
    /// are in query order regardless of completion order.
    pub async fn resolve_all(
        &self,
        access_token: &str,
        queries: Vec<SongQuery>,
    ) -> Vec<TrackMatch> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(queries.len());

        for (i, query) in queries.iter().enumerate() {
            let resolver = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let access_token = access_token.to_string();
            let query = query.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                info!("Searching for track {}: {}", i + 1, query);
                resolver.resolve(&access_token, &query).await
            });
            handles.push(handle);
        }

        let mut matches = Vec::with_capacity(queries.len());
        for (query, handle) in queries.into_iter().zip(handles) {
            let uri = match handle.await {
                Ok(uri) => uri,
                Err(e) => {
                    warning!("Task join error: {}", e);
                    None
                }
            };
            matches.push(TrackMatch { query, uri });
        }

        matches
    }
}
