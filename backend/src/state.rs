use std::sync::Arc;

use anyhow::{Context, Result};
use moka::future::Cache;
use vivacripto_shared::{ContentClient, FetchError, ListQuery, PagedList, PortalConfig};

/// Listing responses kept at once. Keys come from visitor-controlled
/// `page`/`page_size` parameters, so the cache must stay bounded.
pub const LISTING_CACHE_CAPACITY: u64 = 512;
/// Rendered home and listing pages kept at once.
pub const PAGE_CACHE_CAPACITY: u64 = 256;

#[derive(Clone)]
pub struct AppState {
    pub client: ContentClient,
    pub config: Arc<PortalConfig>,
    /// Successful listing responses, keyed by the query that produced them
    listings: Cache<ListQuery, PagedList>,
    /// Rendered home and listing pages, keyed by path plus query string
    pages: Cache<String, String>,
}

impl AppState {
    pub fn new(config: PortalConfig) -> Result<Self> {
        let client =
            ContentClient::new(&config.content_api).context("failed to build content API client")?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: PortalConfig, client: ContentClient) -> Self {
        let window = config.content_api.revalidate_window;
        Self {
            client,
            config: Arc::new(config),
            listings: Cache::builder()
                .max_capacity(LISTING_CACHE_CAPACITY)
                .time_to_live(window)
                .build(),
            pages: Cache::builder()
                .max_capacity(PAGE_CACHE_CAPACITY)
                .time_to_live(window)
                .support_invalidation_closures()
                .build(),
        }
    }

    /// Listing through the cache. Concurrent misses for the same query share
    /// one request; failures are returned to every waiter and never cached.
    pub async fn try_listing(&self, query: ListQuery) -> Result<PagedList, Arc<FetchError>> {
        let client = self.client.clone();
        let fetch_query = query.clone();
        self.listings
            .try_get_with(query, async move { client.try_list_articles(&fetch_query).await })
            .await
    }

    /// Like [`AppState::try_listing`], degrading to an empty page on failure.
    pub async fn listing(&self, query: ListQuery) -> PagedList {
        let page_size = query.page_size;
        match self.try_listing(query).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("listing unavailable, rendering empty page: {}", err);
                PagedList::empty(page_size)
            },
        }
    }

    pub async fn cached_page(&self, key: &str) -> Option<String> {
        self.pages.get(key).await
    }

    pub async fn store_page(&self, key: String, html: String) {
        self.pages.insert(key, html).await;
    }

    /// Forget rendered pages under each path and every cached listing.
    pub fn revalidate_paths(&self, paths: &[&str]) {
        let targets: Vec<String> = paths.iter().map(|path| path.to_string()).collect();
        let invalidated = self.pages.invalidate_entries_if(move |key, _| {
            let path = key.split_once('?').map_or(key.as_str(), |(path, _)| path);
            targets.iter().any(|target| target == path)
        });
        if let Err(err) = invalidated {
            tracing::warn!("selective invalidation failed ({:?}), dropping every page", err);
            self.pages.invalidate_all();
        }
        self.listings.invalidate_all();
        tracing::info!("revalidated {:?}", paths);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vivacripto_shared::{ContentApiConfig, ContentClient, ListQuery, PortalConfig};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::{AppState, PAGE_CACHE_CAPACITY};

    fn state_with_window(base_url: &str, window: Duration) -> AppState {
        let mut config = PortalConfig::from_env();
        config.content_api = ContentApiConfig {
            revalidate_window: window,
            ..ContentApiConfig::with_base_url(base_url)
        };
        let client = ContentClient::new(&config.content_api).expect("client");
        AppState::with_client(config, client)
    }

    fn state_for(base_url: &str) -> AppState {
        state_with_window(base_url, Duration::from_secs(60))
    }

    fn one_post_listing() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "id": "1", "title": "a", "slug": "a" }],
            "total": 1
        }))
    }

    #[tokio::test]
    async fn successful_listings_are_reused_and_failures_are_not() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(one_post_listing())
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let first = state.listing(ListQuery::published(1, 12)).await;
        let second = state.listing(ListQuery::published(1, 12)).await;
        assert_eq!(first, second);
        assert_eq!(first.items.len(), 1);

        let broken = state_for("http://127.0.0.1:9");
        assert!(broken.try_listing(ListQuery::published(1, 12)).await.is_err());
        assert!(broken.try_listing(ListQuery::published(1, 12)).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(one_post_listing().set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let (a, b, c) = tokio::join!(
            state.try_listing(ListQuery::published(1, 12)),
            state.try_listing(ListQuery::published(1, 12)),
            state.try_listing(ListQuery::published(1, 12)),
        );
        assert_eq!(a.expect("listing").items.len(), 1);
        assert!(b.is_ok());
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn revalidate_drops_only_the_named_paths() {
        let state = state_for("http://127.0.0.1:9");
        state.store_page("/".to_string(), "home".to_string()).await;
        state.store_page("/posts?page=2".to_string(), "listing".to_string()).await;
        state.store_page("/posts/um-post".to_string(), "detail".to_string()).await;

        state.revalidate_paths(&["/", "/posts"]);
        assert_eq!(state.cached_page("/").await, None);
        assert_eq!(state.cached_page("/posts?page=2").await, None);
        assert_eq!(state.cached_page("/posts/um-post").await.as_deref(), Some("detail"));
    }

    #[tokio::test]
    async fn expired_pages_are_reclaimed_without_being_read() {
        let state = state_with_window("http://127.0.0.1:9", Duration::from_millis(50));
        for page in 0..200 {
            state.store_page(format!("/posts?page={page}"), "listing".to_string()).await;
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        state.store_page("/".to_string(), "home".to_string()).await;
        state.pages.run_pending_tasks().await;

        assert_eq!(state.pages.entry_count(), 1);
        assert_eq!(state.cached_page("/").await.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn page_cache_stays_within_capacity() {
        let state = state_for("http://127.0.0.1:9");
        for page in 0..(PAGE_CACHE_CAPACITY * 4) {
            state.store_page(format!("/posts?page={page}"), "listing".to_string()).await;
        }
        state.pages.run_pending_tasks().await;
        assert!(state.pages.entry_count() <= PAGE_CACHE_CAPACITY);
    }
}
