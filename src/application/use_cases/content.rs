use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{cache::SearchCache, validators::normalize_query},
    domain::entities::content::{ContentItem, ContentSummary, SearchHit},
};

pub const DEFAULT_UPLOAD_TITLE: &str = "uploaded.txt";

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn insert(&self, title: &str, body: &str) -> AppResult<ContentItem>;
    /// Newest first.
    async fn list(&self) -> AppResult<Vec<ContentSummary>>;
    /// Case-insensitive literal substring match on title or body, newest first.
    /// `query` is already lower-cased.
    async fn search(&self, query: &str) -> AppResult<Vec<ContentItem>>;
    /// The `limit` newest items, newest first.
    async fn recent(&self, limit: i64) -> AppResult<Vec<ContentItem>>;
    async fn count(&self) -> AppResult<i64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub cached: bool,
    pub results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct ContentUseCases {
    repo: Arc<dyn ContentRepo>,
    cache: Arc<SearchCache>,
}

impl ContentUseCases {
    pub fn new(repo: Arc<dyn ContentRepo>, cache: Arc<SearchCache>) -> Self {
        Self { repo, cache }
    }

    #[instrument(skip(self, body))]
    pub async fn create(&self, title: &str, body: &str) -> AppResult<ContentItem> {
        self.store(title.trim(), body.trim()).await
    }

    /// Store an uploaded file. Invalid UTF-8 sequences are replaced.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, filename: Option<&str>, bytes: &[u8]) -> AppResult<ContentItem> {
        let title = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_TITLE);
        let body = String::from_utf8_lossy(bytes);
        self.store(title, &body).await
    }

    async fn store(&self, title: &str, body: &str) -> AppResult<ContentItem> {
        let item = self.repo.insert(title, body).await?;
        self.cache.invalidate();
        tracing::info!(content_id = item.id, "Content stored");
        Ok(item)
    }

    pub async fn list(&self) -> AppResult<Vec<ContentSummary>> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> AppResult<SearchOutcome> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Err(AppError::InvalidInput("query required".into()));
        }

        if let Some(results) = self.cache.get(&query) {
            return Ok(SearchOutcome {
                cached: true,
                results,
            });
        }

        let generation = self.cache.generation();
        let results: Vec<SearchHit> = self
            .repo
            .search(&query)
            .await?
            .iter()
            .map(ContentItem::search_hit)
            .collect();
        self.cache.put_if_current(query, results.clone(), generation);
        Ok(SearchOutcome {
            cached: false,
            results,
        })
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repo.count().await
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}
