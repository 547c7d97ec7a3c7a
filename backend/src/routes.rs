use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    handlers, institutional, pages, request_context::request_context_middleware, seo,
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/posts", get(handlers::list_posts))
        .route("/search", get(handlers::search_posts))
        .route("/categories", get(handlers::list_categories))
        .route("/revalidate", post(handlers::revalidate))
        .layer(cors);

    Router::new()
        .route("/", get(pages::home_page))
        .route("/posts", get(pages::posts_page))
        .route("/posts/:slug", get(pages::post_page))
        .route("/categoria/:slug", get(pages::category_page))
        .route("/busca", get(pages::search_page))
        .route("/sobre", get(institutional::about_page))
        .route("/contato", get(institutional::contact_page))
        .route("/termos", get(institutional::terms_page))
        .route("/privacidade", get(institutional::privacy_page))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        .route("/robots.txt", get(seo::robots_txt))
        .nest("/api", api)
        .fallback(pages::not_found_page)
        .with_state(state)
        .layer(middleware::from_fn(request_context_middleware))
}
