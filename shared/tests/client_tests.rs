//! Integration tests for the content API client.
use std::time::Duration;

use serde_json::{json, Value};
use vivacripto_shared::{
    search::SearchState, ContentApiConfig, ContentClient, FetchError, IncrementalLoader,
    ListQuery, LoadOutcome, PagedList, SearchSession,
};
use wiremock::{
    matchers::{any, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn post(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": format!("post-{id}"),
        "excerpt": format!("Resumo de {title}"),
        "status": "published",
        "created_at": "2026-01-10T10:00:00Z",
        "updated_at": "2026-01-11T10:00:00Z",
        "category": { "id": "1", "name": "Bitcoin", "slug": "bitcoin" },
        "tags": []
    })
}

fn client_for(server: &MockServer) -> ContentClient {
    let config = ContentApiConfig {
        request_timeout: Duration::from_secs(2),
        ..ContentApiConfig::with_base_url(&format!("{}/api/v1", server.uri()))
    };
    ContentClient::new(&config).expect("build client")
}

#[tokio::test]
async fn list_articles_sends_paging_params_and_validates_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "12"))
        .and(query_param("status", "published"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("1", "Bitcoin sobe"), { "id": "2", "title": "sem slug" }],
            "total": 13,
            "page": 2,
            "page_size": 12,
            "total_pages": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client_for(&server)
        .list_articles(&ListQuery::published(2, 12))
        .await;
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].slug, "post-1");
    assert_eq!(list.total, 13);
    assert_eq!(list.page, 2);
}

#[tokio::test]
async fn list_articles_degrades_to_empty_page_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let list = client.list_articles(&ListQuery::published(3, 12)).await;
    assert_eq!(list, PagedList::empty(12));

    let err = client
        .try_list_articles(&ListQuery::published(3, 12))
        .await
        .expect_err("status error");
    assert!(matches!(err, FetchError::Status(503)));
}

#[tokio::test]
async fn list_articles_degrades_to_empty_page_on_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let list = client_for(&server).list_articles(&ListQuery::default()).await;
    assert_eq!(list, PagedList::empty(10));
}

#[tokio::test]
async fn list_articles_degrades_to_empty_page_when_unreachable() {
    let config = ContentApiConfig {
        request_timeout: Duration::from_secs(2),
        ..ContentApiConfig::with_base_url("http://127.0.0.1:9/api/v1")
    };
    let client = ContentClient::new(&config).expect("build client");

    let list = client.list_articles(&ListQuery::published(1, 7)).await;
    assert_eq!(
        list,
        PagedList {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 7,
            total_pages: 0,
        }
    );
}

#[tokio::test]
async fn get_article_by_slug_rejects_traversal_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(post("1", "x")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.get_article_by_slug("../../etc/passwd").await, None);
    assert!(matches!(
        client.try_get_article_by_slug("a/b").await,
        Err(FetchError::InvalidSlug(_))
    ));
}

#[tokio::test]
async fn get_article_by_slug_maps_404_and_invalid_bodies_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/slug/post-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post("1", "Bitcoin sobe")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/slug/quebrado"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "9" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/slug/sumiu"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let article = client.get_article_by_slug("post-1").await.expect("article");
    assert_eq!(article.title, "Bitcoin sobe");

    assert_eq!(client.get_article_by_slug("quebrado").await, None);
    assert_eq!(client.get_article_by_slug("sumiu").await, None);
    assert!(matches!(client.try_get_article_by_slug("sumiu").await, Ok(None)));
}

#[tokio::test]
async fn search_prefers_dedicated_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .and(query_param("q", "scriptbitcoin"))
        .and(query_param("limit", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [post("1", "Bitcoin")] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client_for(&server).search("<script>bitcoin", 50).await;
    assert!(!outcome.fallback);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn search_falls_back_to_local_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("1", "Regulação no Brasil"), post("2", "Ethereum cai")],
            "total": 2
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).search("regulacao", 50).await;
    assert!(outcome.fallback);
    let ids: Vec<_> = outcome.results.iter().map(|article| article.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
}

#[tokio::test]
async fn search_with_blank_query_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client_for(&server).search(" <> ;; ", 10).await;
    assert!(outcome.results.is_empty());
    assert!(!outcome.fallback);
}

#[tokio::test]
async fn loader_pages_through_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post("3", "c")],
            "total": 3,
            "page": 2,
            "page_size": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = vivacripto_shared::validate::validate_article_list(
        &json!({ "items": [post("1", "a"), post("2", "b")], "total": 3, "page": 1, "page_size": 2 }),
        2,
    );
    let mut loader = IncrementalLoader::from_first_page(client, first);
    assert_eq!(
        loader.load_more().await,
        LoadOutcome::Appended {
            count: 1,
            has_more: false
        }
    );
    assert_eq!(loader.items().len(), 3);
}

#[tokio::test]
async fn search_session_never_lets_a_stale_result_win() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .and(query_param("q", "lento"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [post("slow", "lento")] }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .and(query_param("q", "rapido"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [post("fast", "rapido")] })),
        )
        .mount(&server)
        .await;

    let mut session = SearchSession::new(client_for(&server), 10);
    let mut updates = session.subscribe();
    session.submit("lento");
    session.submit("rapido");

    let ready = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            updates.changed().await.expect("session alive");
            if let SearchState::Ready { query, outcome } = updates.borrow_and_update().clone() {
                return (query, outcome);
            }
        }
    })
    .await
    .expect("search finished");
    assert_eq!(ready.0, "rapido");
    assert_eq!(ready.1.results[0].id, "fast");

    tokio::time::sleep(Duration::from_millis(600)).await;
    match session.current() {
        SearchState::Ready { query, .. } => assert_eq!(query, "rapido"),
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn search_session_cancel_returns_to_idle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [post("1", "x")] }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut session = SearchSession::new(client_for(&server), 10);
    session.submit("bitcoin");
    assert!(matches!(session.current(), SearchState::Searching { .. }));
    session.cancel();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(session.current(), SearchState::Idle);
}

#[tokio::test]
async fn dropping_a_search_session_aborts_the_search_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [post("1", "x")] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut session = SearchSession::new(client_for(&server), 10);
    session.submit("bitcoin");
    let mut updates = session.subscribe();
    drop(session);

    // The channel only closes once the spawned search has released its
    // sender, which happens long before the response if it was aborted.
    let closed = tokio::time::timeout(Duration::from_millis(500), updates.changed())
        .await
        .expect("search task still running after the session was dropped");
    assert!(closed.is_err());
    assert!(matches!(*updates.borrow(), SearchState::Searching { .. }));
}
