//! Environment-driven configuration.

use std::{env, time::Duration};

const DEFAULT_CONTENT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_SITE_BASE_URL: &str = "https://vivacripto.com.br";
const DEFAULT_SITE_NAME: &str = "VivaCripto";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_REVALIDATE_SECONDS: u64 = 60;

/// Everything the portal reads from its environment, resolved once at the
/// composition root and handed to the pieces that need it.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Where articles come from.
    pub content_api: ContentApiConfig,
    /// Public identity of the site.
    pub site: SiteConfig,
    /// Shared secret for the revalidation endpoint. Unset means the endpoint
    /// reports a server configuration error.
    pub revalidate_secret: Option<String>,
    /// Analytics measurement id; the tracking snippet is omitted when unset.
    pub analytics_id: Option<String>,
}

/// Content API connection settings.
#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    /// Base URL, normalized without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// How long a successful listing may be reused before it is fetched again.
    pub revalidate_window: Duration,
}

/// Public site settings used for canonical URLs and titles.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public origin, without a trailing slash.
    pub base_url: String,
    /// Brand name shown in titles.
    pub name: String,
}

impl PortalConfig {
    /// Read `CONTENT_API_URL`, `CONTENT_API_TIMEOUT_SECONDS`,
    /// `LISTING_REVALIDATE_SECONDS`, `SITE_BASE_URL`, `REVALIDATE_SECRET`, and
    /// `ANALYTICS_ID`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let content_api = ContentApiConfig {
            base_url: read_env("CONTENT_API_URL")
                .map(|value| normalize_base_url(&value))
                .unwrap_or_else(|| DEFAULT_CONTENT_API_URL.to_string()),
            request_timeout: Duration::from_secs(
                read_u64_env("CONTENT_API_TIMEOUT_SECONDS")
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
                    .max(1),
            ),
            revalidate_window: Duration::from_secs(
                read_u64_env("LISTING_REVALIDATE_SECONDS").unwrap_or(DEFAULT_REVALIDATE_SECONDS),
            ),
        };
        let site = SiteConfig {
            base_url: read_env("SITE_BASE_URL")
                .map(|value| normalize_base_url(&value))
                .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string()),
            name: DEFAULT_SITE_NAME.to_string(),
        };

        Self {
            content_api,
            site,
            revalidate_secret: read_env("REVALIDATE_SECRET"),
            analytics_id: read_env("ANALYTICS_ID"),
        }
    }
}

impl Default for ContentApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CONTENT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            revalidate_window: Duration::from_secs(DEFAULT_REVALIDATE_SECONDS),
        }
    }
}

impl ContentApiConfig {
    /// Defaults with a different base URL.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_BASE_URL.to_string(),
            name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

/// Trims whitespace and trailing slashes so paths can be appended with `/`.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn read_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_u64_env(key: &str) -> Option<u64> {
    read_env(key).and_then(|value| value.parse::<u64>().ok())
}
