//! Integration tests for [`HttpCatalog`] against a wiremock server.

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cardseer::{CardLookup, CatalogSource, HttpCatalog, RetryConfig, UpstreamError};

const PIKACHU_Q: &str = r#"name:"Pikachu" number:"58""#;

fn search_body() -> serde_json::Value {
    serde_json::json!({
        "data": [{
            "id": "base1-58",
            "name": "Pikachu",
            "number": "58",
            "rarity": "Common",
            "types": ["Lightning"],
            "set": {"id": "base1", "name": "Base", "printedTotal": 102},
            "images": {"small": "https://img/base1/58.png"},
            "attacks": [{"name": "Gnaw", "cost": ["Colorless"], "damage": "10"}]
        }],
        "page": 1,
        "totalCount": 1
    })
}

fn catalog(server: &MockServer) -> HttpCatalog {
    HttpCatalog::with_url(format!("{}/v2/cards", server.uri()), Duration::from_secs(2)).unwrap()
}

// =============================================================================
// Request shape and decoding
// =============================================================================

#[tokio::test]
async fn search_sends_query_and_decodes_cards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/cards"))
        .and(query_param("q", PIKACHU_Q))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let list = catalog(&server).search(PIKACHU_Q).await.unwrap();

    assert_eq!(list.data.len(), 1);
    let card = &list.data[0];
    assert_eq!(card.set_id(), Some("base1"));
    assert_eq!(card.printed_total(), Some(102));
    assert_eq!(card.best_image(), Some("https://img/base1/58.png"));
}

#[tokio::test]
async fn null_data_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .mount(&server)
        .await;

    let list = catalog(&server).search(PIKACHU_Q).await.unwrap();
    assert!(list.data.is_empty());
}

#[tokio::test]
async fn sparse_cards_do_not_spoil_the_list() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": [
            search_body()["data"][0].clone(),
            {
                "number": "58",
                "set": {"id": "jungle", "name": "Jungle", "printedTotal": 64},
                "types": null,
                "attacks": [{"name": "Spark", "cost": ["Lightning"], "text": null}]
            }
        ]
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let list = catalog(&server).search(PIKACHU_Q).await.unwrap();

    assert_eq!(list.data.len(), 2);
    let sparse = &list.data[1];
    assert_eq!(sparse.name, "");
    assert!(sparse.types.is_empty());
    assert_eq!(sparse.attacks[0].text, "");
    assert_eq!(sparse.set_id(), Some("jungle"));
}

#[tokio::test]
async fn lookup_selects_among_sparse_cards() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": [
            {"number": "58", "set": {"id": "jungle", "name": "Jungle", "printedTotal": 64}},
            search_body()["data"][0].clone()
        ]
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let lookup = CardLookup::builder()
        .catalog_url(format!("{}/v2/cards", server.uri()))
        .build()
        .unwrap();

    let card = lookup.lookup(1, "Pikachu", "58", 102).await.unwrap();
    assert_eq!(card.set_id(), Some("base1"));
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = catalog(&server).search(PIKACHU_Q).await.unwrap_err();
    assert_eq!(err, UpstreamError::RateLimited);
    assert!(err.is_transient());
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = catalog(&server).search(PIKACHU_Q).await.unwrap_err();
    assert_eq!(
        err,
        UpstreamError::Api {
            status: 503,
            message: "maintenance".into()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = catalog(&server).search(PIKACHU_Q).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Decode(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let catalog = HttpCatalog::with_url(
        format!("{}/v2/cards", server.uri()),
        Duration::from_millis(100),
    )
    .unwrap();

    let err = catalog.search(PIKACHU_Q).await.unwrap_err();
    assert_eq!(err, UpstreamError::Timeout);
}

// =============================================================================
// Full pipeline over HTTP
// =============================================================================

#[tokio::test]
async fn lookup_retries_after_upstream_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", PIKACHU_Q))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    let lookup = CardLookup::builder()
        .catalog_url(format!("{}/v2/cards", server.uri()))
        .retry(
            RetryConfig::new()
                .initial_delay(Duration::from_millis(10))
                .jitter(Duration::ZERO),
        )
        .build()
        .unwrap();

    let card = lookup.lookup_query(1, "Pikachu (58/102)").await.unwrap();
    assert_eq!(card.rarity.as_deref(), Some("Common"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}
