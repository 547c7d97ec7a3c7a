//! Command dispatch and helpers shared by the commands.

pub mod posts;
pub mod revalidate;
pub mod search;
pub mod sitemap;

use anyhow::{Context, Result};
use serde::Serialize;
use vivacripto_shared::{config::normalize_base_url, ContentClient, PortalConfig};

use crate::cli::{Cli, Commands, PostsCommands};

/// Run the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.api_url.as_deref(), cli.site_url.as_deref());

    match cli.command {
        Commands::Posts {
            command,
        } => {
            let client = build_client(&config)?;
            match command {
                PostsCommands::List {
                    page,
                    page_size,
                    all,
                    dedupe,
                } => {
                    let listed = posts::list(client, page, page_size, all, dedupe).await?;
                    print_json(&listed)
                },
                PostsCommands::Show {
                    slug,
                } => print_json(&posts::show(&client, &slug).await?),
            }
        },
        Commands::Search {
            query,
            limit,
            interactive,
        } => {
            let client = build_client(&config)?;
            if interactive {
                search::run_interactive(client, limit).await
            } else {
                let query = query.unwrap_or_default();
                print_json(&search::run_once(&client, &query, limit).await)
            }
        },
        Commands::Revalidate {
            secret,
            server,
        } => {
            let server = server
                .map(|server| normalize_base_url(&server))
                .unwrap_or_else(|| config.site.base_url.clone());
            print_json(&revalidate::run(&server, &secret).await?)
        },
        Commands::Sitemap {
            output,
        } => {
            let client = build_client(&config)?;
            sitemap::run(&client, &config.site.base_url, output.as_deref()).await
        },
    }
}

/// Environment configuration with command-line overrides applied.
pub fn resolve_config(api_url: Option<&str>, site_url: Option<&str>) -> PortalConfig {
    let mut config = PortalConfig::from_env();
    if let Some(api_url) = api_url {
        config.content_api.base_url = normalize_base_url(api_url);
    }
    if let Some(site_url) = site_url {
        config.site.base_url = normalize_base_url(site_url);
    }
    config
}

fn build_client(config: &PortalConfig) -> Result<ContentClient> {
    ContentClient::new(&config.content_api).context("failed to build content API client")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
