//! "Load more" pagination over an initially rendered page of articles.
//!
//! The loader is an explicit state machine. Only [`LoaderState::Idle`]
//! issues requests; `load_more` takes `&mut self`, so at most one page is in
//! flight per loader. A failed page is terminal, like running out of posts,
//! and is never retried automatically.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::{error::FetchError, Article, PagedList};

/// Anything that can serve numbered pages of articles.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch 1-based page `page` of `page_size` articles.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PagedList, FetchError>;
}

/// Where an [`IncrementalLoader`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// More pages are available and none is being fetched.
    Idle,
    /// A page request is in flight.
    Loading,
    /// Every page has been seen, or the API returned an empty page.
    Exhausted,
    /// A page request failed; treated as the end of the list.
    Failed,
}

/// What one [`IncrementalLoader::load_more`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and `count` articles were appended.
    Appended {
        /// Articles actually appended, after de-duplication.
        count: usize,
        /// Whether another page may be requested.
        has_more: bool,
    },
    /// The page was empty; nothing more to load.
    Exhausted,
    /// The request failed; the loader will not try again.
    Failed,
    /// No request was issued because the loader was not idle.
    Skipped(LoaderState),
}

/// Appends following pages of a listing to the articles already shown.
pub struct IncrementalLoader<S> {
    source: S,
    items: Vec<Article>,
    seen_ids: Option<HashSet<String>>,
    page: u32,
    page_size: u32,
    total: u64,
    state: LoaderState,
}

impl<S: PageSource> IncrementalLoader<S> {
    /// `initial` is the page numbered `initial_page`; loading stops once
    /// `total` articles are held.
    pub fn new(source: S, initial: Vec<Article>, total: u64, initial_page: u32, page_size: u32) -> Self {
        let state = if (initial.len() as u64) < total {
            LoaderState::Idle
        } else {
            LoaderState::Exhausted
        };
        Self {
            source,
            items: initial,
            seen_ids: None,
            page: initial_page,
            page_size,
            total,
            state,
        }
    }

    /// Start from a page already fetched from the same source.
    pub fn from_first_page(source: S, first: PagedList) -> Self {
        Self::new(source, first.items, first.total, first.page, first.page_size)
    }

    /// Skip articles whose id was already loaded, keeping the first copy.
    pub fn dedupe_by_id(mut self) -> Self {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items.retain(|article| seen.insert(article.id.clone()));
        self.seen_ids = Some(seen);
        self
    }

    /// Current state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// True only while idle.
    pub fn has_more(&self) -> bool {
        self.state == LoaderState::Idle
    }

    /// Articles loaded so far, in arrival order.
    pub fn items(&self) -> &[Article] {
        &self.items
    }

    /// Consume the loader, keeping its articles.
    pub fn into_items(self) -> Vec<Article> {
        self.items
    }

    /// Last page successfully loaded.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Total reported by the first page.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Fetch the next page and append it.
    pub async fn load_more(&mut self) -> LoadOutcome {
        if self.state != LoaderState::Idle {
            return LoadOutcome::Skipped(self.state);
        }

        let next_page = self.page.saturating_add(1);
        self.state = LoaderState::Loading;
        let guard = LoadingGuard {
            state: &mut self.state,
            settled: false,
        };

        let list = match self.source.fetch_page(next_page, self.page_size).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("loading page {next_page} failed: {err}");
                guard.settle(LoaderState::Failed);
                return LoadOutcome::Failed;
            },
        };

        if list.items.is_empty() {
            guard.settle(LoaderState::Exhausted);
            return LoadOutcome::Exhausted;
        }

        let before = self.items.len();
        match self.seen_ids.as_mut() {
            Some(seen) => self
                .items
                .extend(list.items.into_iter().filter(|article| seen.insert(article.id.clone()))),
            None => self.items.extend(list.items),
        }
        let count = self.items.len() - before;

        self.page = next_page;
        self.total = list.total;
        let has_more = (self.items.len() as u64) < self.total;
        guard.settle(if has_more { LoaderState::Idle } else { LoaderState::Exhausted });

        LoadOutcome::Appended {
            count,
            has_more,
        }
    }
}

/// Puts the loader back to `Idle` if a `load_more` future is dropped before
/// the page arrives.
struct LoadingGuard<'a> {
    state: &'a mut LoaderState,
    settled: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, next: LoaderState) {
        *self.state = next;
        self.settled = true;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state = LoaderState::Idle;
        }
    }
}
