//! `search`, one-shot or interactive.

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use vivacripto_shared::{
    search::SearchState, text::sanitize_search_query, Article, ContentClient, SearchOutcome,
    SearchSession,
};

/// Output of a one-shot search.
#[derive(Debug, Serialize)]
pub struct SearchReport {
    /// Query after sanitizing.
    pub query: String,
    /// Number of results.
    pub total: usize,
    /// True when results came from the local fallback filter.
    pub fallback: bool,
    /// Matching posts.
    pub results: Vec<Article>,
}

/// Run one search and collect the report.
pub async fn run_once(client: &ContentClient, query: &str, limit: u32) -> SearchReport {
    let SearchOutcome {
        results,
        fallback,
    } = client.search(query, limit).await;
    SearchReport {
        query: sanitize_search_query(query),
        total: results.len(),
        fallback,
        results,
    }
}

/// One query per stdin line. Typing a new line while a search is running
/// cancels it; an empty line just cancels. On EOF the last search is allowed
/// to finish before exiting.
pub async fn run_interactive(client: ContentClient, limit: u32) -> Result<()> {
    let mut session = SearchSession::new(client, limit);
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("Digite uma busca por linha (linha vazia cancela, Ctrl-D sai).");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    session.cancel();
                } else {
                    session.submit(&line);
                }
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                print_state(&updates.borrow_and_update().clone());
            },
        }
    }

    wait_until_settled(&mut updates).await;
    Ok(())
}

async fn wait_until_settled(updates: &mut watch::Receiver<SearchState>) {
    let mut unseen = updates.has_changed().unwrap_or(false);
    loop {
        let state = updates.borrow_and_update().clone();
        if !matches!(state, SearchState::Searching { .. }) {
            if unseen {
                print_state(&state);
            }
            return;
        }
        if updates.changed().await.is_err() {
            return;
        }
        unseen = true;
    }
}

fn print_state(state: &SearchState) {
    let SearchState::Ready {
        query,
        outcome,
    } = state
    else {
        return;
    };
    let source = if outcome.fallback { " (busca local)" } else { "" };
    println!("{} resultado(s) para \"{}\"{}", outcome.results.len(), query, source);
    for article in &outcome.results {
        println!("  - {} (/posts/{})", article.title, article.slug);
    }
}
