//! HTTP fetcher behavior against a mock API

use crate::common::{article, envelope, tag, API_KEY};
use catalog_harvest::config::ApiConfig;
use catalog_harvest::harvest::{HttpPageFetcher, PageFetcher};
use catalog_harvest::{FetchError, ResourceEndpoint};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> HttpPageFetcher {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    HttpPageFetcher::new(&config, API_KEY).unwrap()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

#[tokio::test]
async fn test_catalog_page_sends_filters() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/tags"))
        .and(query_param("api-key", API_KEY))
        .and(query_param("type", "keyword"))
        .and(query_param("section", "business"))
        .and(query_param("page-size", "50"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            vec![tag(&base, "business/retail"), tag(&base, "business/banking")],
            2,
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher(&server)
        .fetch_catalog_page("business", 2)
        .await
        .unwrap();

    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].api_url, format!("{}/business/retail", base));
}

#[tokio::test]
async fn test_content_page_sends_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/business/retail"))
        .and(query_param("api-key", API_KEY))
        .and(query_param("show-fields", "all"))
        .and(query_param("page-size", "100"))
        .and(query_param("from-date", "2021-01-01"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            (0..3).map(|i| article("business/retail", 1, i)).collect(),
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = ResourceEndpoint::new(format!("{}/business/retail", server.uri()));
    let page = fetcher(&server)
        .fetch_content_page(&endpoint, start_date(), 1)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[2].id, "business/retail/p1/2");
    let fields = page.items[0].fields.as_ref().unwrap();
    assert_eq!(fields.byline.as_deref(), Some("A. Reporter"));
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .fetch_catalog_page("business", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_api_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "status": "error", "message": "Invalid authentication credentials" }
        })))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .fetch_catalog_page("business", 1)
        .await
        .unwrap_err();

    match err {
        FetchError::Api { message, .. } => {
            assert_eq!(message, "Invalid authentication credentials")
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .fetch_catalog_page("business", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::EmptyBody { .. }));
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .fetch_catalog_page("business", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_errors_do_not_leak_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let endpoint = ResourceEndpoint::new(format!("{}/business/retail", server.uri()));
    let err = fetcher(&server)
        .fetch_content_page(&endpoint, start_date(), 1)
        .await
        .unwrap_err();

    assert!(!err.to_string().contains(API_KEY));
    assert!(err.to_string().contains("/business/retail"));
}
