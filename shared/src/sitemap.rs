//! sitemap.xml generation shared by the server route and the CLI.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    categories::CATEGORIES,
    client::{ContentClient, ListQuery},
    Article,
};

/// Posts requested for one sitemap.
pub const SITEMAP_PAGE_SIZE: u32 = 1000;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL.
    pub loc: String,
    /// `<lastmod>`, omitted when `None`.
    pub last_modified: Option<DateTime<Utc>>,
    /// `<changefreq>` value.
    pub change_frequency: &'static str,
    /// `<priority>` between 0.0 and 1.0.
    pub priority: f32,
}

/// Static routes first (home, listing, categories), then one URL per post
/// using its `updated_at` as last-modified.
pub fn sitemap_entries(site_base: &str, posts: &[Article], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let mut entries = Vec::with_capacity(posts.len() + CATEGORIES.len() + 2);
    entries.push(SitemapEntry {
        loc: site_base.to_string(),
        last_modified: Some(now),
        change_frequency: "daily",
        priority: 1.0,
    });
    entries.push(SitemapEntry {
        loc: format!("{site_base}/posts"),
        last_modified: Some(now),
        change_frequency: "hourly",
        priority: 0.9,
    });
    entries.extend(CATEGORIES.iter().map(|category| SitemapEntry {
        loc: format!("{site_base}/categoria/{}", category.slug),
        last_modified: None,
        change_frequency: "daily",
        priority: 0.7,
    }));
    entries.extend(posts.iter().map(|post| SitemapEntry {
        loc: format!("{site_base}/posts/{}", post.slug),
        last_modified: Some(post.updated_at),
        change_frequency: "weekly",
        priority: 0.8,
    }));
    entries
}

/// Serialize entries as a sitemaps.org `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&entry.loc)));
        if let Some(last_modified) = entry.last_modified {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_frequency));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Fetch published posts and render the full sitemap. An unreachable content
/// API still yields the static routes.
pub async fn build_sitemap(client: &ContentClient, site_base: &str) -> String {
    let posts = client
        .list_articles(&ListQuery::published(1, SITEMAP_PAGE_SIZE))
        .await;
    render_sitemap(&sitemap_entries(site_base, &posts.items, Utc::now()))
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
