//! Server-rendered HTML pages.
//!
//! Every page degrades instead of failing: an unreachable content API
//! renders the friendly empty state, and only a missing post, category, or
//! route answers 404. Home and listing pages are cached for the revalidate
//! window, but only when their listing actually came from the API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use vivacripto_shared::{
    categories::{category_by_slug, filter_by_category, Category, CATEGORIES},
    client::DEFAULT_SEARCH_LIMIT,
    text::{
        clean_meta_description, format_date, format_title, reading_time_minutes,
        remove_duplicate_title, strip_markdown, DateStyle,
    },
    Article, ListQuery, PagedList,
};

use crate::{
    institutional::INFO_PAGES,
    markdown::article_body_html,
    seo::{build_article_json_ld, html_attr_escape, html_escape, PageMeta},
    state::AppState,
};

pub const HOME_PAGE_SIZE: u32 = 13;
pub const LISTING_PAGE_SIZE: u32 = 12;
/// Posts scanned for a category page until the API can filter by category.
pub const CATEGORY_SCAN_SIZE: u32 = 50;
const RELATED_SCAN_SIZE: u32 = 10;
const RELATED_POSTS: usize = 3;

const SITE_DESCRIPTION: &str =
    "Portal de notícias sobre criptomoedas, Bitcoin, Ethereum e o mercado cripto.";
const EMPTY_STATE: &str = r#"<section class="empty-state"><h2>Em breve, muitas novidades!</h2><p>Estamos preparando conteúdo exclusivo sobre criptomoedas para você. Volte em breve!</p></section>"#;
const DISCLAIMER: &str = "<strong>Aviso:</strong> VivaCripto utiliza inteligência artificial para \
                          gerar parte de seu conteúdo. Este conteúdo é puramente informativo e não \
                          constitui recomendação de investimento.";

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    /// Kept raw so a malformed value falls back to page 1 instead of a 400.
    #[serde(default)]
    pub page: Option<String>,
}

impl ListingParams {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
pub async fn home_page(State(state): State<AppState>) -> Response {
    const KEY: &str = "/";
    if let Some(html) = state.cached_page(KEY).await {
        return Html(html).into_response();
    }

    let (list, fresh) = match state
        .try_listing(ListQuery::published(1, HOME_PAGE_SIZE))
        .await
    {
        Ok(list) => (list, true),
        Err(err) => {
            tracing::warn!("home listing failed: {}", err);
            (PagedList::empty(HOME_PAGE_SIZE), false)
        },
    };

    let html = render_home(&state, &list.items);
    if fresh {
        state.store_page(KEY.to_string(), html.clone()).await;
    }
    Html(html).into_response()
}

/// GET /posts?page=N
pub async fn posts_page(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Response {
    let page = params.page();
    let key = if page == 1 { "/posts".to_string() } else { format!("/posts?page={page}") };
    if let Some(html) = state.cached_page(&key).await {
        return Html(html).into_response();
    }

    let (list, fresh) = match state
        .try_listing(ListQuery::published(page, LISTING_PAGE_SIZE))
        .await
    {
        Ok(list) => (list, true),
        Err(err) => {
            tracing::warn!("listing page {} failed: {}", page, err);
            (PagedList::empty(LISTING_PAGE_SIZE), false)
        },
    };

    let html = render_listing(&state, page, &list);
    if fresh {
        state.store_page(key, html.clone()).await;
    }
    Html(html).into_response()
}

/// GET /posts/:slug
pub async fn post_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(article) = state.client.get_article_by_slug(&slug).await else {
        return not_found_response(&state);
    };

    let related: Vec<Article> = state
        .listing(ListQuery::published(1, RELATED_SCAN_SIZE))
        .await
        .items
        .into_iter()
        .filter(|candidate| candidate.id != article.id)
        .take(RELATED_POSTS)
        .collect();

    Html(render_post(&state, &article, &related)).into_response()
}

/// GET /categoria/:slug
pub async fn category_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(category) = category_by_slug(&slug) else {
        return not_found_response(&state);
    };

    let list = state
        .listing(ListQuery::published(1, CATEGORY_SCAN_SIZE))
        .await;
    let posts = filter_by_category(list.items, category.slug);
    Html(render_category(&state, category, &posts)).into_response()
}

/// GET /busca?q=
pub async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let results = if query.trim().is_empty() {
        None
    } else {
        Some(state.client.search(&query, DEFAULT_SEARCH_LIMIT).await.results)
    };
    Html(render_search(&state, query.trim(), results.as_deref())).into_response()
}

/// Fallback for every unknown route.
pub async fn not_found_page(State(state): State<AppState>) -> Response {
    not_found_response(&state)
}

fn not_found_response(state: &AppState) -> Response {
    (StatusCode::NOT_FOUND, Html(render_not_found(state))).into_response()
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

pub fn render_home(state: &AppState, posts: &[Article]) -> String {
    let site = &state.config.site;
    let meta = PageMeta::website(
        site,
        format!("{} - Notícias sobre Criptomoedas", site.name),
        SITE_DESCRIPTION,
        "",
    );

    let body = match posts.split_first() {
        None => EMPTY_STATE.to_string(),
        Some((hero, rest)) => {
            let mut body = format!(r#"<section class="hero">{}</section>"#, hero_card(hero));
            if !rest.is_empty() {
                body.push_str(&format!(
                    r#"<section class="latest"><h2>Últimas Notícias</h2>{}</section>"#,
                    post_grid(rest)
                ));
            }
            body
        },
    };

    layout(state, &meta, "", &body)
}

pub fn render_listing(state: &AppState, page: u32, list: &PagedList) -> String {
    let site = &state.config.site;
    let path = if page == 1 { "/posts".to_string() } else { format!("/posts?page={page}") };
    let meta = PageMeta::website(site, format!("Notícias - {}", site.name), SITE_DESCRIPTION, &path);

    if list.items.is_empty() {
        let body = format!("<h1>Todas as notícias</h1>{EMPTY_STATE}");
        return layout(state, &meta, "", &body);
    }

    let loaded = u64::from(page.saturating_sub(1)) * u64::from(list.page_size)
        + list.items.len() as u64;
    let mut body = format!(
        r#"<h1>Todas as notícias</h1><p class="count"><strong>{}</strong> notícias</p><div id="post-list">{}</div>"#,
        list.total,
        post_grid(&list.items)
    );
    if loaded < list.total {
        let next = page.saturating_add(1);
        body.push_str(&format!(
            r#"<div class="load-more" data-endpoint="/api/posts" data-next-page="{next}" data-page-size="{size}" data-total="{total}" data-loaded="{loaded}"><a href="/posts?page={next}" rel="next">Carregar mais notícias</a></div>"#,
            size = list.page_size,
            total = list.total,
        ));
    }

    layout(state, &meta, "", &body)
}

pub fn render_post(state: &AppState, article: &Article, related: &[Article]) -> String {
    let site = &state.config.site;
    let meta = PageMeta::for_article(site, article);
    let json_ld = build_article_json_ld(article, site);

    let title = strip_markdown(&article.title);
    let reading = reading_time_minutes(&remove_duplicate_title(
        &article.content_markdown,
        &article.title,
    ))
    .max(1);
    let published = article.display_date();

    let mut breadcrumbs = String::from(r#"<nav class="breadcrumbs"><a href="/">Início</a>"#);
    if let Some(category) = &article.category {
        breadcrumbs.push_str(&format!(
            r#" / <a href="/categoria/{}">{}</a>"#,
            html_attr_escape(&category.slug),
            html_escape(&category.name)
        ));
    }
    breadcrumbs.push_str(&format!(" / <span>{}</span></nav>", html_escape(&title)));

    let mut header = String::new();
    if let Some(category) = &article.category {
        header.push_str(&format!(r#"<span class="badge">{}</span>"#, html_escape(&category.name)));
    }
    header.push_str(&format!(
        r#"<h1>{}</h1><div class="meta"><time datetime="{}">{}</time> · <span>{} min de leitura</span></div>"#,
        html_escape(&title),
        published.to_rfc3339(),
        format_date(&published, DateStyle::Long),
        reading
    ));
    if let Some(image) = &article.featured_image_url {
        header.push_str(&format!(
            r#"<img class="featured" src="{}" alt="{}" />"#,
            html_attr_escape(image),
            html_attr_escape(&title)
        ));
    }

    let mut body = format!(
        r#"<article>{breadcrumbs}<header>{header}</header><div class="content">{content}</div><footer class="disclaimer"><p>{DISCLAIMER}</p></footer></article>"#,
        content = article_body_html(article),
    );
    if !related.is_empty() {
        body.push_str(&format!(
            r#"<section class="related"><h2>Leia Também</h2>{}</section>"#,
            post_grid(related)
        ));
    }

    layout(state, &meta, &json_ld, &body)
}

pub fn render_category(state: &AppState, category: &Category, posts: &[Article]) -> String {
    let site = &state.config.site;
    let meta = PageMeta::website(
        site,
        format!("{} - {}", category.name, site.name),
        category.description,
        &format!("/categoria/{}", category.slug),
    );

    let mut body = format!(
        r#"<nav class="breadcrumbs"><a href="/">Início</a> / <span>{name}</span></nav><h1>{name}</h1><p class="description">{description}</p>"#,
        name = html_escape(category.name),
        description = html_escape(category.description),
    );
    if posts.is_empty() {
        body.push_str(
            r#"<p class="empty">Nenhuma notícia encontrada nesta categoria ainda.</p>"#,
        );
    } else {
        let noun = if posts.len() == 1 { "notícia encontrada" } else { "notícias encontradas" };
        body.push_str(&format!(
            r#"<p class="count"><strong>{}</strong> {}</p>{}"#,
            posts.len(),
            noun,
            post_grid(posts)
        ));
    }

    layout(state, &meta, "", &body)
}

/// `results` is `None` when no query was submitted.
pub fn render_search(state: &AppState, query: &str, results: Option<&[Article]>) -> String {
    let site = &state.config.site;
    let mut meta = PageMeta::website(site, format!("Busca - {}", site.name), SITE_DESCRIPTION, "/busca");
    meta.noindex = true;

    let mut body = format!(
        r#"<h1>Buscar notícias</h1><form class="search" action="/busca" method="get"><input type="search" name="q" value="{}" placeholder="Bitcoin, Ethereum, DeFi..." /><button type="submit">Buscar</button></form>"#,
        html_attr_escape(query)
    );
    match results {
        None => {},
        Some([]) => body.push_str(&format!(
            r#"<p class="empty">Nenhum resultado para "{}".</p>"#,
            html_escape(query)
        )),
        Some(results) => body.push_str(&format!(
            r#"<p class="count"><strong>{}</strong> resultado(s) para "{}"</p>{}"#,
            results.len(),
            html_escape(query),
            post_grid(results)
        )),
    }

    layout(state, &meta, "", &body)
}

pub fn render_not_found(state: &AppState) -> String {
    let site = &state.config.site;
    let mut meta = PageMeta::website(
        site,
        format!("Página não encontrada - {}", site.name),
        "A página que você procura não existe.",
        "",
    );
    meta.noindex = true;
    let body = r#"<section class="not-found"><h1>404</h1><p>A página que você procura não existe ou foi removida.</p><a href="/">Voltar para o início</a></section>"#;
    layout(state, &meta, "", body)
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

pub(crate) fn layout(state: &AppState, meta: &PageMeta, head_extra: &str, body: &str) -> String {
    let site = &state.config.site;
    let nav: String = CATEGORIES
        .iter()
        .map(|category| {
            format!(r#"<a href="/categoria/{}">{}</a>"#, category.slug, html_escape(category.name))
        })
        .collect();
    let analytics = state
        .config
        .analytics_id
        .as_deref()
        .map(analytics_snippet)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
{meta}
{head_extra}
{analytics}
</head>
<body>
<header class="site-header"><a class="logo" href="/">{name}</a><nav>{nav}</nav><form action="/busca" method="get"><input type="search" name="q" placeholder="Buscar" /></form></header>
<main>
{body}
</main>
<footer class="site-footer"><nav>{institutional}</nav><p>© {year} {name}. Todos os direitos reservados.</p></footer>
</body>
</html>"#,
        meta = meta.render(site),
        institutional = institutional_links(),
        name = html_escape(&site.name),
        year = Utc::now().year(),
    )
}

fn institutional_links() -> String {
    INFO_PAGES
        .iter()
        .map(|page| format!(r#"<a href="{}">{}</a>"#, page.path, html_escape(page.title)))
        .collect()
}

fn analytics_snippet(id: &str) -> String {
    let id = html_attr_escape(id);
    format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
<script>window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config','{id}');</script>"#
    )
}

fn hero_card(article: &Article) -> String {
    let title = format_title(&strip_markdown(&article.title));
    let excerpt = format_title(&clean_meta_description(&article.excerpt));
    format!(
        r#"<article class="hero-post"><a href="/posts/{slug}">{image}<h1>{title}</h1></a><p>{excerpt}</p><div class="meta">{category}<time>{date}</time> · {minutes} min de leitura</div></article>"#,
        slug = html_attr_escape(&article.slug),
        image = card_image(article),
        title = html_escape(&title),
        excerpt = html_escape(&excerpt),
        category = category_badge(article),
        date = format_date(&article.display_date(), DateStyle::Long),
        minutes = reading_time_minutes(&article.content_markdown).max(1),
    )
}

fn post_card(article: &Article) -> String {
    let title = format_title(&strip_markdown(&article.title));
    let excerpt = clean_meta_description(&article.excerpt);
    format!(
        r#"<article class="post-card" data-id="{id}"><a href="/posts/{slug}">{image}<h2>{title}</h2></a><p>{excerpt}</p><div class="meta">{category}<time>{date}</time> · {minutes} min</div></article>"#,
        id = html_attr_escape(&article.id),
        slug = html_attr_escape(&article.slug),
        image = card_image(article),
        title = html_escape(&title),
        excerpt = html_escape(&excerpt),
        category = category_badge(article),
        date = format_date(&article.display_date(), DateStyle::Short),
        minutes = reading_time_minutes(&article.content_markdown).max(1),
    )
}

fn post_grid(posts: &[Article]) -> String {
    let cards: String = posts.iter().map(post_card).collect();
    format!(r#"<div class="post-grid">{cards}</div>"#)
}

fn card_image(article: &Article) -> String {
    match &article.featured_image_url {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" loading="lazy" />"#,
            html_attr_escape(url),
            html_attr_escape(&strip_markdown(&article.title))
        ),
        None => r#"<div class="placeholder"></div>"#.to_string(),
    }
}

fn category_badge(article: &Article) -> String {
    article
        .category
        .as_ref()
        .map(|category| format!(r#"<span class="badge">{}</span> "#, html_escape(&category.name)))
        .unwrap_or_default()
}
