//! `sitemap`: print or save sitemap.xml.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use vivacripto_shared::{sitemap::build_sitemap, ContentClient};

/// Build the sitemap and write it to `output`, or stdout when `None`.
pub async fn run(client: &ContentClient, site_url: &str, output: Option<&Path>) -> Result<()> {
    let xml = build_sitemap(client, site_url).await;
    match output {
        Some(path) => {
            fs::write(path, &xml).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("sitemap written to {}", path.display());
        },
        None => print!("{xml}"),
    }
    Ok(())
}
