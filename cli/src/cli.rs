use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vivacripto_shared::client::DEFAULT_SEARCH_LIMIT;

/// Top-level arguments.
#[derive(Parser)]
#[command(name = "vc-cli", version, about = "VivaCripto content API CLI")]
pub struct Cli {
    /// Content API base URL (defaults to CONTENT_API_URL or the local API).
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Public site URL (defaults to SITE_BASE_URL or the production site).
    #[arg(long, global = true)]
    pub site_url: Option<String>,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect published posts.
    Posts {
        /// Posts subcommand.
        #[command(subcommand)]
        command: PostsCommands,
    },
    /// Search published posts.
    Search {
        /// Search terms. Required unless --interactive is given.
        #[arg(required_unless_present = "interactive")]
        query: Option<String>,
        /// Maximum number of results.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
        /// Read one query per line from stdin. A new line cancels the search
        /// still in flight.
        #[arg(long, conflicts_with = "query")]
        interactive: bool,
    },
    /// Ask a running portal to drop its cached home and listing pages.
    Revalidate {
        /// Shared secret configured on the portal.
        #[arg(long, env = "REVALIDATE_SECRET", hide_env_values = true)]
        secret: String,
        /// Portal base URL (defaults to the site URL).
        #[arg(long)]
        server: Option<String>,
    },
    /// Print sitemap.xml for the current published posts.
    Sitemap {
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// `posts` subcommands.
#[derive(Subcommand)]
pub enum PostsCommands {
    /// List published posts, one page or all of them.
    List {
        /// First page to fetch.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Posts per page.
        #[arg(long, default_value_t = 12)]
        page_size: u32,
        /// Keep loading pages until every post has been fetched.
        #[arg(long)]
        all: bool,
        /// Skip posts whose id was already listed.
        #[arg(long)]
        dedupe: bool,
    },
    /// Show one post by slug.
    Show {
        /// Post slug.
        slug: String,
    },
}
