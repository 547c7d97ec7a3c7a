//! Defensive decoding of content-API JSON.
//!
//! The content API is an external system and occasionally sends records with
//! missing or wrong-typed fields. Required fields (`id`, `title`, `slug`)
//! reject the record; every other field is defaulted on its own so one bad
//! value never takes down a whole listing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    error::ValidationError, Article, AuthorRef, CategoryRef, PagedList, PublicationStatus, TagRef,
};

/// Validate a single article record.
pub fn validate_article(value: &Value) -> Result<Article, ValidationError> {
    let fields = Fields::of(value)?;
    validate_fields(&fields, Utc::now())
}

/// Validate a listing response. Never fails: a non-object degrades to
/// [`PagedList::empty`], invalid items are dropped.
pub fn validate_article_list(value: &Value, default_page_size: u32) -> PagedList {
    let fields = match Fields::of(value) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::debug!("listing response rejected: {err}");
            return PagedList::empty(default_page_size);
        },
    };

    let page_size = fields
        .count("page_size")
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_page_size);

    let mut items = validate_items(fields.get("items"));
    if page_size > 0 && items.len() > page_size as usize {
        tracing::warn!(
            "listing returned {} items for page_size {page_size}; truncating",
            items.len()
        );
        items.truncate(page_size as usize);
    }

    let total = fields.count("total").unwrap_or(items.len() as u64);
    let page = fields
        .count("page")
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(1);
    let total_pages = fields
        .count("total_pages")
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or_else(|| derive_total_pages(total, page_size));

    PagedList {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// Validate the `results` array of a search response.
pub fn validate_search_results(value: &Value) -> Vec<Article> {
    match value {
        Value::Object(map) => validate_items(map.get("results")),
        _ => Vec::new(),
    }
}

fn validate_items(items: Option<&Value>) -> Vec<Article> {
    let Some(Value::Array(items)) = items else {
        return Vec::new();
    };
    let now = Utc::now();
    items
        .iter()
        .filter_map(|item| {
            let result = Fields::of(item).and_then(|fields| validate_fields(&fields, now));
            match result {
                Ok(article) => Some(article),
                Err(err) => {
                    tracing::debug!("dropping invalid article from listing: {err}");
                    None
                },
            }
        })
        .collect()
}

fn validate_fields(fields: &Fields<'_>, now: DateTime<Utc>) -> Result<Article, ValidationError> {
    Ok(Article {
        id: fields.required_str("id")?,
        title: fields.required_str("title")?,
        slug: fields.required_str("slug")?,
        content_markdown: fields.string_or_empty("content_markdown"),
        content_html: fields.string_or_empty("content_html"),
        excerpt: fields.string_or_empty("excerpt"),
        featured_image_url: fields.optional_str("featured_image_url"),
        status: fields
            .optional_str("status")
            .map(PublicationStatus::from)
            .unwrap_or(PublicationStatus::Draft),
        published_at: fields.timestamp("published_at"),
        created_at: fields.timestamp("created_at").unwrap_or(now),
        updated_at: fields.timestamp("updated_at").unwrap_or(now),
        meta_title: fields.optional_str("meta_title"),
        meta_description: fields.optional_str("meta_description"),
        canonical_url: fields.optional_str("canonical_url"),
        author: fields.nested("author").map(|author| AuthorRef {
            id: author.loose_str("id"),
            name: author.loose_str("name"),
        }),
        category: fields.nested("category").map(|category| CategoryRef {
            id: category.loose_str("id"),
            name: category.loose_str("name"),
            slug: category.loose_str("slug"),
        }),
        tags: fields.tags(),
    })
}

fn derive_total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Typed accessors over one JSON object. Each accessor applies its own
/// default instead of failing.
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::NotAnObject(type_name(other))),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }

    fn required_str(&self, key: &'static str) -> Result<String, ValidationError> {
        match self.get(key) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(ValidationError::MissingField(key)),
        }
    }

    fn string_or_empty(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(value)) => value.clone(),
            _ => String::new(),
        }
    }

    fn optional_str(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(value)) if !value.trim().is_empty() => Some(value.clone()),
            _ => None,
        }
    }

    /// Strings pass through, numbers are stringified, anything else is empty.
    fn loose_str(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    fn count(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(Value::String(value)) => parse_timestamp(value),
            _ => None,
        }
    }

    fn nested(&self, key: &str) -> Option<Fields<'a>> {
        match self.get(key) {
            Some(Value::Object(map)) => Some(Fields(map)),
            _ => None,
        }
    }

    fn tags(&self) -> Vec<TagRef> {
        let Some(Value::Array(tags)) = self.get("tags") else {
            return Vec::new();
        };
        tags.iter()
            .filter_map(|tag| match tag {
                Value::Object(map) => {
                    let tag = Fields(map);
                    Some(TagRef {
                        id: tag.loose_str("id"),
                        name: tag.loose_str("name"),
                        slug: tag.loose_str("slug"),
                    })
                },
                _ => None,
            })
            .collect()
    }
}

/// Accepts RFC 3339, naive ISO-8601 date-times (read as UTC), and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
