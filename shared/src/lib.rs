//! Data layer for the VivaCripto news portal.
//!
//! Everything the pages need to render lives here: the article model, the
//! defensive validator that turns content-API JSON into it, the HTTP client,
//! the "load more" pager, search, sitemap generation, and the text helpers
//! used for titles, excerpts, and structured data.

pub mod categories;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod search;
pub mod sitemap;
pub mod text;
pub mod validate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::{ContentClient, ListQuery, SearchOutcome};
pub use config::{ContentApiConfig, PortalConfig, SiteConfig};
pub use error::{FetchError, ValidationError};
pub use loader::{IncrementalLoader, LoadOutcome, LoaderState, PageSource};
pub use search::SearchSession;

/// A news article as published by the content API, after validation.
///
/// `id`, `title`, and `slug` are never empty. Every other field has already
/// been defaulted when the API sent something unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Opaque identifier assigned by the CMS.
    pub id: String,
    /// Headline, possibly carrying Markdown markers.
    pub title: String,
    /// URL key under `/posts/`.
    pub slug: String,
    /// Markdown body.
    pub content_markdown: String,
    /// Pre-rendered HTML body; empty when the CMS did not send one.
    pub content_html: String,
    /// Short summary shown on cards.
    pub excerpt: String,
    /// Cover image; `None` unless the API sent a string.
    pub featured_image_url: Option<String>,
    /// Publication state.
    pub status: PublicationStatus,
    /// When the article went live, if known.
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time, or validation time when missing.
    pub created_at: DateTime<Utc>,
    /// Last edit time, or validation time when missing.
    pub updated_at: DateTime<Utc>,
    /// SEO title override.
    pub meta_title: Option<String>,
    /// SEO description override.
    pub meta_description: Option<String>,
    /// Canonical URL override.
    pub canonical_url: Option<String>,
    /// Byline.
    pub author: Option<AuthorRef>,
    /// Primary category.
    pub category: Option<CategoryRef>,
    /// Tags, with malformed entries already dropped.
    pub tags: Vec<TagRef>,
}

impl Article {
    /// Timestamp shown to readers: publication time when known, creation
    /// time otherwise.
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Slug of the article's category, if it has one.
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.slug.as_str())
    }
}

/// Publication state as reported by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PublicationStatus {
    /// Not public yet. Also the default for a missing status.
    Draft,
    /// Live on the site.
    Published,
    /// Any other state string, kept verbatim.
    Other(String),
}

impl PublicationStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for PublicationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "draft" => Self::Draft,
            "published" => Self::Published,
            _ => Self::Other(raw),
        }
    }
}

impl From<PublicationStatus> for String {
    fn from(status: PublicationStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Author reference embedded in an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    /// Author id, stringified when the API sent a number.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Category reference embedded in an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL key under `/categoria/`.
    pub slug: String,
}

/// Tag attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// Tag id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL key.
    pub slug: String,
}

/// One page of articles plus pagination metadata, in the order the content
/// API returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedList {
    /// At most `page_size` articles.
    pub items: Vec<Article>,
    /// Articles across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages for `total`.
    pub total_pages: u32,
}

impl PagedList {
    /// The zero value every listing degrades to when the API is unusable.
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
            total_pages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PublicationStatus;

    #[test]
    fn publication_status_round_trips_unknown_values() {
        let status = PublicationStatus::from("scheduled".to_string());
        assert_eq!(status, PublicationStatus::Other("scheduled".to_string()));
        assert_eq!(String::from(status), "scheduled");
        assert_eq!(PublicationStatus::from("published".to_string()), PublicationStatus::Published);
    }
}
