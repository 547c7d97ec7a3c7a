//! Fixed category table used for navigation and category pages.

use serde::Serialize;

use crate::Article;

/// A site section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Display name.
    pub name: &'static str,
    /// URL key under `/categoria/`, matched against `Article::category`.
    pub slug: &'static str,
    /// One-line description used on the category page and in meta tags.
    pub description: &'static str,
}

/// Every category, in navigation order.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Bitcoin",
        slug: "bitcoin",
        description: "Notícias sobre Bitcoin, a primeira e maior criptomoeda do mundo",
    },
    Category {
        name: "Ethereum",
        slug: "ethereum",
        description: "Atualizações sobre Ethereum, contratos inteligentes e DApps",
    },
    Category {
        name: "Altcoins",
        slug: "altcoins",
        description: "Notícias sobre criptomoedas alternativas ao Bitcoin",
    },
    Category {
        name: "DeFi",
        slug: "defi",
        description: "Finanças descentralizadas e protocolos DeFi",
    },
    Category {
        name: "Regulação",
        slug: "regulacao",
        description: "Regulamentação e legislação sobre criptomoedas",
    },
    Category {
        name: "Airdrop",
        slug: "airdrop",
        description: "Airdrops, distribuições gratuitas de tokens e oportunidades",
    },
];

/// Look up a category by its exact slug.
pub fn category_by_slug(slug: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.slug == slug)
}

/// Keep only articles whose category slug matches, preserving order.
///
/// The content API has no category filter yet, so category pages scan a
/// fetched listing instead.
pub fn filter_by_category(articles: Vec<Article>, slug: &str) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| article.category_slug() == Some(slug))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{category_by_slug, filter_by_category, CATEGORIES};
    use crate::validate::validate_article;

    #[test]
    fn category_slugs_are_unique_and_resolvable() {
        for category in CATEGORIES {
            assert_eq!(category_by_slug(category.slug), Some(category));
        }
        assert_eq!(category_by_slug("Bitcoin"), None);
        assert_eq!(category_by_slug("nft"), None);
    }

    #[test]
    fn filter_by_category_keeps_order_and_skips_uncategorized() {
        let articles = ["a", "b", "c", "d"]
            .iter()
            .zip([Some("defi"), None, Some("bitcoin"), Some("defi")])
            .map(|(id, slug)| {
                let category = slug.map(|slug| json!({ "id": slug, "name": slug, "slug": slug }));
                validate_article(&json!({
                    "id": id,
                    "title": "t",
                    "slug": format!("post-{id}"),
                    "category": category,
                }))
                .expect("valid article")
            })
            .collect();
        let filtered = filter_by_category(articles, "defi");
        let ids: Vec<_> = filtered.iter().map(|article| article.id.as_str()).collect();
        assert_eq!(ids, ["a", "d"]);
    }
}
