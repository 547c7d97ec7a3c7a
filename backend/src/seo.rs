use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use vivacripto_shared::{
    sitemap::build_sitemap,
    text::{clean_meta_description, escape_json_ld, strip_markdown},
    Article, SiteConfig,
};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// HTML escaping
// ---------------------------------------------------------------------------

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Head metadata
// ---------------------------------------------------------------------------

/// What a page tells crawlers and link previews about itself.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_type: &'static str,
    pub image: Option<String>,
    pub published_time: Option<String>,
    pub noindex: bool,
}

impl PageMeta {
    pub fn website(site: &SiteConfig, title: String, description: &str, path: &str) -> Self {
        Self {
            title,
            description: description.to_string(),
            canonical: format!("{}{}", site.base_url, path),
            og_type: "website",
            image: None,
            published_time: None,
            noindex: false,
        }
    }

    pub fn for_article(site: &SiteConfig, article: &Article) -> Self {
        Self {
            title: article
                .meta_title
                .clone()
                .unwrap_or_else(|| strip_markdown(&article.title)),
            description: article_description(article),
            canonical: article
                .canonical_url
                .clone()
                .unwrap_or_else(|| article_url(site, article)),
            og_type: "article",
            image: article.featured_image_url.clone(),
            published_time: article.published_at.map(|value| value.to_rfc3339()),
            noindex: false,
        }
    }

    pub fn render(&self, site: &SiteConfig) -> String {
        let mut tags = vec![
            format!("<title>{}</title>", html_escape(&self.title)),
            meta_name("description", &self.description),
            format!(r#"<link rel="canonical" href="{}" />"#, html_attr_escape(&self.canonical)),
            meta_property("og:title", &self.title),
            meta_property("og:description", &self.description),
            meta_property("og:url", &self.canonical),
            meta_property("og:site_name", &site.name),
            meta_property("og:locale", "pt_BR"),
            meta_property("og:type", self.og_type),
            meta_name("twitter:card", "summary_large_image"),
            meta_name("twitter:title", &self.title),
            meta_name("twitter:description", &self.description),
        ];
        if let Some(image) = self.image.as_deref() {
            tags.push(meta_property("og:image", image));
            tags.push(meta_name("twitter:image", image));
        }
        if let Some(published) = self.published_time.as_deref() {
            tags.push(meta_property("article:published_time", published));
        }
        if self.noindex {
            tags.push(meta_name("robots", "noindex"));
        }
        tags.join("\n")
    }
}

fn meta_name(name: &str, content: &str) -> String {
    format!(r#"<meta name="{}" content="{}" />"#, name, html_attr_escape(content))
}

fn meta_property(property: &str, content: &str) -> String {
    format!(r#"<meta property="{}" content="{}" />"#, property, html_attr_escape(content))
}

pub fn article_url(site: &SiteConfig, article: &Article) -> String {
    format!("{}/posts/{}", site.base_url, urlencoding::encode(&article.slug))
}

/// Meta description from `meta_description`, falling back to the excerpt.
pub fn article_description(article: &Article) -> String {
    let source = article
        .meta_description
        .as_deref()
        .unwrap_or(article.excerpt.as_str());
    clean_meta_description(source)
}

// ---------------------------------------------------------------------------
// JSON-LD structured data
// ---------------------------------------------------------------------------

/// `NewsArticle` structured data. Every CMS-sourced string goes through the
/// structured-data escaper, so the block can never close its own `<script>`.
pub fn build_article_json_ld(article: &Article, site: &SiteConfig) -> String {
    let author = article
        .author
        .as_ref()
        .map(|author| author.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(site.name.as_str());
    let images: Vec<String> = article
        .featured_image_url
        .as_deref()
        .map(|image| escape_json_ld(Some(image)))
        .into_iter()
        .collect();

    let ld = json!({
        "@context": "https://schema.org",
        "@type": "NewsArticle",
        "headline": escape_json_ld(Some(&strip_markdown(&article.title))),
        "image": images,
        "datePublished": article.published_at.map(|value| value.to_rfc3339()),
        "dateModified": article.updated_at.to_rfc3339(),
        "author": { "@type": "Person", "name": escape_json_ld(Some(author)) },
        "publisher": {
            "@type": "Organization",
            "name": escape_json_ld(Some(&site.name)),
            "logo": { "@type": "ImageObject", "url": format!("{}/logo.png", site.base_url) },
        },
        "description": escape_json_ld(Some(&article.excerpt)),
        "mainEntityOfPage": article_url(site, article),
    });

    format!(r#"<script type="application/ld+json">{}</script>"#, ld)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let xml = build_sitemap(&state.client, &state.config.site.base_url).await;
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
        .into_response()
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    let body = format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        state.config.site.base_url
    );
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
