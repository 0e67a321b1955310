//! Full harvest runs against a mock API

use crate::common::{create_test_config, mount_catalog, mount_failing_page, mount_resource};
use catalog_harvest::catalog::ROW_HEADERS;
use catalog_harvest::config::{parse_start_date, HarvestStrategy};
use catalog_harvest::harvest::run_harvest;
use catalog_harvest::sink::clear_output;
use catalog_harvest::HarvestError;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Reads a CSV output back as (headers, rows)
fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

async fn mount_business_section(server: &MockServer) {
    mount_catalog(
        server,
        "business",
        &[
            vec!["business/retail", "business/banking"],
            vec!["business/energy"],
        ],
    )
    .await;
    mount_resource(server, "business/retail", &[100, 100, 12]).await;
    mount_resource(server, "business/banking", &[40]).await;
    mount_resource(server, "business/energy", &[100, 3]).await;
}

#[tokio::test]
async fn test_throttled_harvest_to_csv() {
    let server = MockServer::start().await;
    mount_business_section(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("file.csv");
    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Throttled);

    let summary = run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.resources_total, 3);
    assert_eq!(summary.resources_succeeded, 3);
    assert_eq!(summary.total_rows, 355);

    let (headers, rows) = read_csv(&output);
    assert_eq!(headers, ROW_HEADERS);
    assert_eq!(rows.len(), 355);

    // Rows of a resource keep page order
    let retail: Vec<&Vec<String>> = rows
        .iter()
        .filter(|r| r[0].starts_with("business/retail/"))
        .collect();
    assert_eq!(retail.len(), 212);
    assert_eq!(retail[0][0], "business/retail/p1/0");
    assert_eq!(retail[100][0], "business/retail/p2/0");
    assert_eq!(retail[211][0], "business/retail/p3/11");
    assert_eq!(retail[0][3], "A. Reporter");
    assert_eq!(retail[0][6], "business");
}

#[tokio::test]
async fn test_eager_harvest_to_sqlite() {
    let server = MockServer::start().await;
    mount_business_section(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("articles.db");
    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Eager);

    let summary = run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        Some("abc123".to_string()),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.total_rows, 355);

    let conn = Connection::open(&output).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 355);

    let (status, total, hash): (String, i64, Option<String>) = conn
        .query_row(
            "SELECT status, total_rows, config_hash FROM runs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(status, "completed");
    assert_eq!(total, 355);
    assert_eq!(hash.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_failed_resource_contributes_no_rows() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        "business",
        &[vec!["business/retail", "business/banking"]],
    )
    .await;
    mount_failing_page(&server, "business/retail", 2, 500).await;
    mount_resource(&server, "business/retail", &[100, 100, 12]).await;
    mount_resource(&server, "business/banking", &[40]).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("file.csv");
    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Throttled);

    let summary = run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.resources_succeeded, 1);
    assert_eq!(summary.resources_failed, 1);
    assert_eq!(summary.total_rows, 40);

    let (_, rows) = read_csv(&output);
    assert_eq!(rows.len(), 40);
    assert!(rows.iter().all(|r| r[0].starts_with("business/banking/")));
}

#[tokio::test]
async fn test_catalog_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("file.csv");
    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Eager);

    let err = run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::Resolution(_)));
    // No content endpoint was ever requested
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/tags"));
}

#[tokio::test]
async fn test_missing_api_key_is_rejected() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("articles.db");
    let mut config = create_test_config(&server.uri(), &output, HarvestStrategy::Eager);
    config.api.api_key = None;

    let err = run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::Config(_)));
    // No store and no dangling "running" run row
    assert!(!output.exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rerun_after_clear_replaces_output() {
    let server = MockServer::start().await;
    mount_catalog(&server, "business", &[vec!["business/banking"]]).await;
    mount_resource(&server, "business/banking", &[40]).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("file.csv");
    std::fs::write(&output, "stale,data\n1,2\n").unwrap();

    assert!(clear_output(&output).unwrap());

    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Throttled);
    run_harvest(
        &config,
        "business",
        parse_start_date("2021-01-01").unwrap(),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let (headers, rows) = read_csv(&output);
    assert_eq!(headers, ROW_HEADERS);
    assert_eq!(rows.len(), 40);
}

#[tokio::test]
async fn test_rerun_without_clear_duplicates_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crate::common::envelope(
            vec![crate::common::tag(&server.uri(), "business/banking")],
            1,
            1,
        )))
        .expect(2)
        .mount(&server)
        .await;
    mount_resource(&server, "business/banking", &[40]).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("file.csv");
    let config = create_test_config(&server.uri(), &output, HarvestStrategy::Eager);
    let start = parse_start_date("2021-01-01").unwrap();

    for _ in 0..2 {
        run_harvest(&config, "business", start, None, CancellationToken::new())
            .await
            .unwrap();
    }

    // Header once, rows appended by both runs
    let (headers, rows) = read_csv(&output);
    assert_eq!(headers, ROW_HEADERS);
    assert_eq!(rows.len(), 80);
}
