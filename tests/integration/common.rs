//! Shared mock API helpers

use catalog_harvest::config::{Config, HarvestStrategy};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

/// Creates a test configuration pointed at the mock server
pub fn create_test_config(base_url: &str, output: &Path, strategy: HarvestStrategy) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.api_key = Some(API_KEY.to_string());
    config.api.timeout_secs = 5;
    config.harvest.strategy = strategy;
    config.harvest.tick_interval_ms = 10; // Very short for testing
    config.harvest.max_concurrent_pages = 4;
    config.output.path = output.display().to_string();
    config
}

/// Wraps results in the API's `{"response": ...}` envelope
pub fn envelope(results: Vec<Value>, current_page: u32, pages: u32) -> Value {
    json!({
        "response": {
            "status": "ok",
            "total": results.len(),
            "currentPage": current_page,
            "pages": pages,
            "results": results,
        }
    })
}

pub fn tag(base_url: &str, resource: &str) -> Value {
    json!({
        "id": resource,
        "webTitle": resource,
        "apiUrl": format!("{}/{}", base_url, resource),
    })
}

pub fn article(resource: &str, page: u32, index: usize) -> Value {
    json!({
        "id": format!("{}/p{}/{}", resource, page, index),
        "webPublicationDate": "2021-03-04T05:06:07Z",
        "sectionId": "business",
        "fields": {
            "headline": format!("Story {} of page {}", index, page),
            "byline": "A. Reporter",
            "bodyText": "Body text",
            "shortUrl": format!("https://short.test/{}", index),
        }
    })
}

/// Mounts the catalog: `pages[i]` lists the resource paths on page `i + 1`
pub async fn mount_catalog(server: &MockServer, category: &str, pages: &[Vec<&str>]) {
    let total = pages.len() as u32;
    for (i, resources) in pages.iter().enumerate() {
        let page = i as u32 + 1;
        let results = resources.iter().map(|r| tag(&server.uri(), r)).collect();
        Mock::given(method("GET"))
            .and(path("/tags"))
            .and(query_param("section", category))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(results, page, total)))
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Mounts a resource: `sizes[i]` articles on page `i + 1`
pub async fn mount_resource(server: &MockServer, resource: &str, sizes: &[usize]) {
    let total = sizes.len() as u32;
    for (i, size) in sizes.iter().enumerate() {
        let page = i as u32 + 1;
        let results = (0..*size).map(|n| article(resource, page, n)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/{}", resource)))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(results, page, total)))
            .mount(server)
            .await;
    }
}

/// Makes one page of a resource answer with `status`
///
/// Must be mounted before `mount_resource`; the first matching mock wins.
pub async fn mount_failing_page(server: &MockServer, resource: &str, page: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", resource)))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
