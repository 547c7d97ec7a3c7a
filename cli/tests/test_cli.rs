//! Integration tests for the vc-cli commands.
use clap::Parser;
use serde_json::json;
use vc_cli::{
    cli::{Cli, Commands, PostsCommands},
    commands::{posts, resolve_config, revalidate, search},
};
use vivacripto_shared::{ContentApiConfig, ContentClient};
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn post(id: &str) -> serde_json::Value {
    json!({ "id": id, "title": format!("Post {id}"), "slug": format!("post-{id}") })
}

fn client_for(server: &MockServer) -> ContentClient {
    ContentClient::new(&ContentApiConfig::with_base_url(&server.uri())).expect("client")
}

#[test]
fn parses_posts_list_flags() {
    let cli = Cli::try_parse_from([
        "vc-cli",
        "--api-url",
        "http://api.local/v1/",
        "posts",
        "list",
        "--all",
        "--page-size",
        "5",
    ])
    .expect("valid arguments");

    assert_eq!(cli.api_url.as_deref(), Some("http://api.local/v1/"));
    match cli.command {
        Commands::Posts {
            command:
                PostsCommands::List {
                    page,
                    page_size,
                    all,
                    dedupe,
                },
        } => {
            assert_eq!((page, page_size, all, dedupe), (1, 5, true, false));
        },
        _ => panic!("expected posts list"),
    }
}

#[test]
fn search_requires_a_query_unless_interactive() {
    assert!(Cli::try_parse_from(["vc-cli", "search"]).is_err());
    assert!(Cli::try_parse_from(["vc-cli", "search", "--interactive"]).is_ok());
    assert!(Cli::try_parse_from(["vc-cli", "search", "btc", "--interactive"]).is_err());

    let cli = Cli::try_parse_from(["vc-cli", "search", "bitcoin", "--limit", "3"]).expect("valid");
    match cli.command {
        Commands::Search {
            query,
            limit,
            interactive,
        } => {
            assert_eq!(query.as_deref(), Some("bitcoin"));
            assert_eq!(limit, 3);
            assert!(!interactive);
        },
        _ => panic!("expected search"),
    }
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let cli = Cli::try_parse_from(["vc-cli", "sitemap", "--site-url", "https://staging.example/"])
        .expect("valid");
    let config = resolve_config(cli.api_url.as_deref(), cli.site_url.as_deref());
    assert_eq!(config.site.base_url, "https://staging.example");
}

#[tokio::test]
async fn posts_list_all_follows_pages_until_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("1"), post("2")], "total": 3, "page": 1, "page_size": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("3")], "total": 3, "page": 2, "page_size": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listed = posts::list(client_for(&server), 1, 2, true, false)
        .await
        .expect("listing");
    assert_eq!(listed.loaded, 3);
    assert_eq!(listed.total, 3);
    assert!(listed.complete);
}

#[tokio::test]
async fn posts_list_reports_incomplete_listing_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("1")], "total": 5, "page": 1, "page_size": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let listed = posts::list(client_for(&server), 1, 1, true, false)
        .await
        .expect("first page succeeded");
    assert_eq!(listed.loaded, 1);
    assert!(!listed.complete);
}

#[tokio::test]
async fn posts_show_rejects_bad_slugs_and_missing_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/slug/sumiu"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = posts::show(&client, "sumiu").await.expect_err("missing");
    assert!(err.to_string().contains("post not found"));
    assert!(posts::show(&client, "../etc").await.is_err());
}

#[tokio::test]
async fn search_once_reports_sanitized_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/search"))
        .and(query_param("q", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [post("1")] })))
        .mount(&server)
        .await;

    let report = search::run_once(&client_for(&server), "<bitcoin>", 10).await;
    assert_eq!(report.query, "bitcoin");
    assert_eq!(report.total, 1);
    assert!(!report.fallback);
}

#[tokio::test]
async fn revalidate_posts_secret_and_surfaces_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .and(body_json(json!({ "secret": "segredo" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "revalidated": true, "now": 1 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .and(body_json(json!({ "secret": "errado" })))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid secret" })),
        )
        .mount(&server)
        .await;

    let body = revalidate::run(&server.uri(), "segredo").await.expect("accepted");
    assert_eq!(body["revalidated"], true);

    let err = revalidate::run(&server.uri(), "errado").await.expect_err("rejected");
    assert!(err.to_string().contains("Invalid secret"));
}
