//! Best-effort cover enrichment for catalog pages.
//!
//! Lookups for one page run concurrently (bounded by `concurrency`), each one
//! capped by `timeout`. Failures of any kind leave the entry without a cover;
//! they never fail the page. Cached results expire after `cache_ttl_secs` so a
//! cover published later is eventually picked up.

use crate::error::ApiError;
use crate::{CoverClient, OpenLibraryClient};
use configuration::CoverConfig;
use core_types::CatalogEntry;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedCover {
    url: Option<String>,
    stored_at: Instant,
}

/// Resolves cover URLs for catalog entries.
#[derive(Clone)]
pub struct CoverService {
    client: Arc<dyn CoverClient>,
    timeout: Duration,
    concurrency: usize,
    /// Clean ISBN -> resolved URL (or `None` for "no cover"). `None` when
    /// caching is disabled.
    cache: Option<Arc<RwLock<HashMap<String, CachedCover>>>>,
    cache_ttl: Duration,
    cache_capacity: usize,
}

impl CoverService {
    pub fn new(client: Arc<dyn CoverClient>, config: &CoverConfig) -> Self {
        Self {
            client,
            timeout: config.timeout(),
            concurrency: config.concurrency.max(1),
            cache: config.cache.then(Default::default),
            cache_ttl: config.cache_ttl(),
            cache_capacity: config.cache_capacity.max(1),
        }
    }

    /// Builds the service against the live Open Library API.
    pub fn from_config(config: &CoverConfig) -> Result<Self, ApiError> {
        let client = OpenLibraryClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Fills `cover_url` on every entry, preserving their order.
    pub async fn enrich(&self, entries: &mut [CatalogEntry]) {
        let isbns: Vec<String> = entries.iter().map(|e| e.clean_isbn.clone()).collect();
        let urls: Vec<Option<String>> = stream::iter(isbns)
            .map(|isbn| async move { self.lookup(&isbn).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (entry, url) in entries.iter_mut().zip(urls) {
            entry.cover_url = url;
        }
    }

    /// Resolves a single cover, consulting the cache first.
    pub async fn lookup(&self, clean_isbn: &str) -> Option<String> {
        if clean_isbn.is_empty() {
            return None;
        }
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.read().await.get(clean_isbn) {
                if cached.stored_at.elapsed() < self.cache_ttl {
                    return cached.url.clone();
                }
            }
        }

        match self.fetch(clean_isbn).await {
            Ok(url) => {
                self.remember(clean_isbn, url.clone()).await;
                url
            }
            // Transient failures are not cached so the next page view retries.
            Err(e) => {
                tracing::warn!(isbn = clean_isbn, error = %e, "Cover lookup failed.");
                None
            }
        }
    }

    /// Stores a result, making room by dropping expired entries and then the
    /// oldest one.
    async fn remember(&self, clean_isbn: &str, url: Option<String>) {
        let Some(cache) = &self.cache else {
            return;
        };
        let mut cache = cache.write().await;
        if cache.len() >= self.cache_capacity && !cache.contains_key(clean_isbn) {
            let ttl = self.cache_ttl;
            cache.retain(|_, cached| cached.stored_at.elapsed() < ttl);
            if cache.len() >= self.cache_capacity {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, cached)| cached.stored_at)
                    .map(|(isbn, _)| isbn.clone());
                if let Some(oldest) = oldest {
                    cache.remove(&oldest);
                }
            }
        }
        cache.insert(clean_isbn.to_string(), CachedCover { url, stored_at: Instant::now() });
    }

    async fn fetch(&self, clean_isbn: &str) -> Result<Option<String>, ApiError> {
        tokio::time::timeout(self.timeout, self.client.cover_url(clean_isbn))
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_millis()))?
    }
}
