//! Search helpers: the local fallback filter and a cancellable search
//! session for interactive use.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    client::{ContentClient, SearchOutcome},
    text::{fold_for_search, sanitize_search_query},
    Article,
};

/// Accent- and case-insensitive substring match over title, excerpt, and
/// category name. Order is preserved.
pub fn search_locally(articles: Vec<Article>, query: &str) -> Vec<Article> {
    let needle = fold_for_search(query);
    if needle.is_empty() {
        return Vec::new();
    }

    articles
        .into_iter()
        .filter(|article| {
            let category = article
                .category
                .as_ref()
                .map(|category| category.name.as_str())
                .unwrap_or_default();
            let haystack =
                fold_for_search(&format!("{} {} {}", article.title, article.excerpt, category));
            haystack.contains(&needle)
        })
        .collect()
}

/// What a [`SearchSession`] is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing submitted, or the last search was cancelled.
    Idle,
    /// Waiting on results for `query`.
    Searching {
        /// Sanitized query.
        query: String,
    },
    /// Results for the latest query.
    Ready {
        /// Sanitized query.
        query: String,
        /// What the client returned.
        outcome: SearchOutcome,
    },
}

/// Runs at most one search at a time. Submitting a new query aborts the one
/// in flight, and a result is only published while its query is still the
/// latest, so a slow stale response can never overwrite newer results.
///
/// Must be used inside a tokio runtime.
pub struct SearchSession {
    client: ContentClient,
    limit: u32,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchSession {
    /// Idle session returning at most `limit` results per search.
    pub fn new(client: ContentClient, limit: u32) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            client,
            limit,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            in_flight: None,
        }
    }

    /// Receiver of every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Start searching for `query`, cancelling any earlier search. Returns
    /// the generation number assigned to this query.
    pub fn submit(&mut self, query: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_in_flight();

        let query = sanitize_search_query(query);
        if query.is_empty() {
            self.state.send_replace(SearchState::Idle);
            return generation;
        }

        self.state.send_replace(SearchState::Searching {
            query: query.clone(),
        });

        let client = self.client.clone();
        let limit = self.limit;
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = client.search(&query, limit).await;
            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = SearchState::Ready {
                    query,
                    outcome,
                };
                true
            });
            if !published {
                tracing::debug!("discarding stale search result for generation {generation}");
            }
        }));

        generation
    }

    /// Abort the in-flight search and return to idle.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_in_flight();
        self.state.send_replace(SearchState::Idle);
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
