//! `posts list` and `posts show`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use vivacripto_shared::{
    Article, ContentClient, IncrementalLoader, ListQuery, LoadOutcome, LoaderState,
};

/// Output of `posts list`.
#[derive(Debug, Serialize)]
pub struct ListedPosts {
    /// Total reported by the content API.
    pub total: u64,
    /// Posts actually fetched.
    pub loaded: usize,
    /// False when a page failed before the listing was exhausted.
    pub complete: bool,
    /// Posts in listing order.
    pub items: Vec<Article>,
}

/// Fetch `page`, then with `all` keep loading following pages through the
/// incremental loader until the listing is exhausted or a page fails.
pub async fn list(
    client: ContentClient,
    page: u32,
    page_size: u32,
    all: bool,
    dedupe: bool,
) -> Result<ListedPosts> {
    let first = client
        .try_list_articles(&ListQuery::published(page, page_size))
        .await
        .with_context(|| format!("failed to fetch page {page}"))?;

    let mut loader = IncrementalLoader::from_first_page(client, first);
    if dedupe {
        loader = loader.dedupe_by_id();
    }

    while all && loader.has_more() {
        match loader.load_more().await {
            LoadOutcome::Appended {
                count,
                has_more,
            } => {
                tracing::info!("page {}: {} new posts (more: {})", loader.page(), count, has_more);
            },
            LoadOutcome::Exhausted => tracing::info!("content API returned an empty page"),
            LoadOutcome::Failed => tracing::warn!("stopped after page {}: request failed", loader.page()),
            LoadOutcome::Skipped(state) => {
                tracing::debug!("loader not idle: {:?}", state);
                break;
            },
        }
    }

    let complete = loader.state() != LoaderState::Failed;
    let total = loader.total();
    let items = loader.into_items();
    Ok(ListedPosts {
        total,
        loaded: items.len(),
        complete,
        items,
    })
}

/// Fetch one post, failing when it does not exist.
pub async fn show(client: &ContentClient, slug: &str) -> Result<Article> {
    match client
        .try_get_article_by_slug(slug)
        .await
        .with_context(|| format!("failed to fetch post {slug:?}"))?
    {
        Some(article) => Ok(article),
        None => bail!("post not found: {slug}"),
    }
}
