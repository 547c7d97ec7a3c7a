//! HTTP client for the external content API.
//!
//! The plain methods (`list_articles`, `get_article_by_slug`, `search`) never
//! fail: transport errors, bad statuses, and malformed bodies all degrade to
//! a renderable zero value. The `try_*` methods expose the typed error for
//! callers that must tell an outage apart from an empty result.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::{normalize_base_url, ContentApiConfig},
    error::FetchError,
    loader::PageSource,
    search::search_locally,
    text::sanitize_search_query,
    validate::{validate_article, validate_article_list, validate_search_results},
    Article, PagedList,
};

/// Page size of the default [`ListQuery`].
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Result cap for search when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
/// Page size used when the search endpoint has nothing and the client falls
/// back to scanning the latest posts.
pub const SEARCH_FALLBACK_PAGE_SIZE: u32 = 100;
const MAX_SLUG_LEN: usize = 200;
const PUBLISHED: &str = "published";

/// Parameters of one listing request. Also the key of cached listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Articles per page.
    pub page_size: u32,
    /// `None` lists every status.
    pub status: Option<String>,
}

impl ListQuery {
    /// Published articles only; page 0 is clamped to 1.
    pub fn published(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
            status: Some(PUBLISHED.to_string()),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::published(1, DEFAULT_PAGE_SIZE)
    }
}

/// Result of [`ContentClient::search`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Matching articles, in API order.
    pub results: Vec<Article>,
    /// True when results came from filtering the latest posts locally.
    pub fallback: bool,
}

/// Cheap-to-clone handle on the content API.
#[derive(Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
}

impl ContentClient {
    /// Build a client with the configured timeout.
    pub fn new(config: &ContentApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("vivacripto/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(http, &config.base_url))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /posts?page&page_size&status
    pub async fn try_list_articles(&self, query: &ListQuery) -> Result<PagedList, FetchError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(status) = query.status.as_deref().filter(|status| !status.is_empty()) {
            params.push(("status", status.to_string()));
        }

        let url = format!("{}/posts", self.base_url);
        let body = self.get_json(&url, &params).await?;
        Ok(validate_article_list(&body, query.page_size))
    }

    /// Like [`ContentClient::try_list_articles`], degrading to
    /// [`PagedList::empty`] on any failure.
    pub async fn list_articles(&self, query: &ListQuery) -> PagedList {
        match self.try_list_articles(query).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(
                    "listing page={} page_size={} failed: {err}",
                    query.page,
                    query.page_size
                );
                PagedList::empty(query.page_size)
            },
        }
    }

    /// GET /posts/slug/{slug}. A 404 is `Ok(None)`; a slug that fails
    /// validation never reaches the network.
    pub async fn try_get_article_by_slug(&self, slug: &str) -> Result<Option<Article>, FetchError> {
        if !is_valid_slug(slug) {
            return Err(FetchError::InvalidSlug(slug.to_string()));
        }

        let url = format!("{}/posts/slug/{slug}", self.base_url);
        match self.get_json(&url, &[]).await {
            Ok(body) => Ok(Some(validate_article(&body)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Like [`ContentClient::try_get_article_by_slug`]; every failure is `None`.
    pub async fn get_article_by_slug(&self, slug: &str) -> Option<Article> {
        match self.try_get_article_by_slug(slug).await {
            Ok(article) => article,
            Err(FetchError::InvalidSlug(slug)) => {
                tracing::debug!("rejected article slug {slug:?}");
                None
            },
            Err(err) => {
                tracing::warn!("article lookup for slug {slug:?} failed: {err}");
                None
            },
        }
    }

    /// Search published posts. Uses GET /posts/search first and falls back
    /// to filtering the latest posts when that yields nothing.
    pub async fn search(&self, query: &str, limit: u32) -> SearchOutcome {
        let sanitized = sanitize_search_query(query);
        if sanitized.is_empty() {
            return SearchOutcome::default();
        }

        match self.try_search_endpoint(&sanitized, limit).await {
            Ok(results) if !results.is_empty() => {
                return SearchOutcome {
                    results,
                    fallback: false,
                };
            },
            Ok(_) => tracing::debug!("search endpoint had no results for {sanitized:?}"),
            Err(err) => tracing::warn!("search endpoint failed, falling back to listing: {err}"),
        }

        let fallback_query = ListQuery::published(1, SEARCH_FALLBACK_PAGE_SIZE);
        match self.try_list_articles(&fallback_query).await {
            Ok(list) => {
                let mut results = search_locally(list.items, &sanitized);
                if limit > 0 {
                    results.truncate(limit as usize);
                }
                SearchOutcome {
                    results,
                    fallback: true,
                }
            },
            Err(err) => {
                tracing::warn!("search fallback listing failed: {err}");
                SearchOutcome::default()
            },
        }
    }

    async fn try_search_endpoint(&self, query: &str, limit: u32) -> Result<Vec<Article>, FetchError> {
        let url = format!("{}/posts/search", self.base_url);
        let params = [("q", query.to_string()), ("limit", limit.to_string())];
        let body = self.get_json(&url, &params).await?;
        Ok(validate_search_results(&body))
    }

    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PageSource for ContentClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PagedList, FetchError> {
        self.try_list_articles(&ListQuery::published(page, page_size))
            .await
    }
}

/// Slugs are at most 200 ASCII letters, digits, hyphens, or underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}
