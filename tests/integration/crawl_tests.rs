//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the
//! full fetch-and-write cycle end-to-end.

use arrow::datatypes::DataType;
use async_trait::async_trait;
use harvest::config::Config;
use harvest::crawler::{crawl, crawl_with, Fetch, FetchError, FetchResult, FetchedPage};
use harvest::table::{read_records, read_table, CREATED_AT_KEY, SOURCE_KEY};
use harvest::targets::load_targets;
use harvest::HarvestError;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short timeout
fn create_test_config(workers: usize) -> Config {
    let mut config = Config::default();
    config.fetch.workers = workers;
    config.fetch.timeout_secs = 2;
    config
}

fn by_uri(results: Vec<FetchResult>) -> HashMap<String, FetchResult> {
    results.into_iter().map(|r| (r.uri.clone(), r)).collect()
}

/// Always answers 200 with a fixed body and a declared length of 5
struct StubFetcher;

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, _uri: &str) -> Result<FetchedPage, FetchError> {
        Ok(FetchedPage {
            status_code: 200,
            content_length: 5,
            text: "hello world".to_string(),
        })
    }
}

/// Answers from a fixed table of URIs; anything else is a connection error
struct ScriptedFetcher;

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchedPage, FetchError> {
        match uri {
            "http://test1" => Ok(FetchedPage {
                status_code: 200,
                content_length: 5,
                text: "hello world".to_string(),
            }),
            "http://test2" => Ok(FetchedPage {
                status_code: 404,
                content_length: 0,
                text: String::new(),
            }),
            _ => Err(FetchError::Other("Connection error".to_string())),
        }
    }
}

#[tokio::test]
async fn test_scripted_success_and_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    crawl_with(
        ScriptedFetcher,
        &["http://test1", "http://test2"],
        &output,
        &create_test_config(2),
    )
    .await
    .expect("Crawl failed");

    let results = by_uri(read_records(&output).expect("Failed to read output"));
    assert_eq!(results.len(), 2);

    let first = &results["http://test1"];
    assert_eq!(first.status_code, Some(200));
    assert_eq!(first.content_length, 5);
    assert_eq!(first.snippet, "hello world");

    let second = &results["http://test2"];
    assert_eq!(second.status_code, Some(404));
    assert_eq!(second.content_length, 0);
    assert_eq!(second.snippet, "");
}

#[tokio::test]
async fn test_scripted_connection_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    crawl_with(ScriptedFetcher, &["http://badurl"], &output, &create_test_config(2))
        .await
        .expect("Crawl failed");

    let results: Vec<FetchResult> = read_records(&output).expect("Failed to read output");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, None);
    assert_eq!(results[0].content_length, 0);
    assert!(results[0].snippet.contains("ERROR"));

    // Every fetch failed, the status column keeps its integer type
    let contents = read_table(&output).expect("Failed to read output");
    let status = contents
        .schema
        .field_with_name("status_code")
        .expect("Missing status_code column");
    assert_eq!(status.data_type(), &DataType::Int64);
    assert!(status.is_nullable());
}

#[tokio::test]
async fn test_crawl_success_and_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    let ok_uri = format!("{}/a", mock_server.uri());
    let missing_uri = format!("{}/missing", mock_server.uri());
    let targets = vec![ok_uri.clone(), missing_uri.clone()];

    let report = crawl(&targets, &output, &create_test_config(2))
        .await
        .expect("Crawl failed");

    assert_eq!(report.rows, 2);
    assert_eq!(report.statistics.succeeded, 1);
    assert_eq!(report.statistics.http_errors, 1);

    let results = by_uri(read_records(&output).expect("Failed to read output"));
    assert_eq!(results.len(), 2);

    let ok = &results[&ok_uri];
    assert_eq!(ok.status_code, Some(200));
    assert_eq!(ok.content_length, 11);
    assert_eq!(ok.snippet, "hello world");

    let missing = &results[&missing_uri];
    assert_eq!(missing.status_code, Some(404));
    assert_eq!(missing.snippet, "");
}

#[tokio::test]
async fn test_unreachable_uri_recorded_as_error_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    let good = format!("{}/good", mock_server.uri());
    let targets = vec![good.clone(), "badurl".to_string()];

    let report = crawl(&targets, &output, &create_test_config(2))
        .await
        .expect("Crawl failed");

    assert_eq!(report.rows, 2);
    assert_eq!(report.statistics.failed, 1);

    let results = by_uri(read_records(&output).expect("Failed to read output"));

    let bad = &results["badurl"];
    assert_eq!(bad.status_code, None);
    assert_eq!(bad.content_length, 0);
    assert!(bad.snippet.starts_with("ERROR"), "snippet: {}", bad.snippet);

    assert_eq!(results[&good].status_code, Some(200));
}

#[tokio::test]
async fn test_slow_target_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    let mut config = create_test_config(1);
    config.fetch.timeout_secs = 1;

    let targets = vec![format!("{}/slow", mock_server.uri())];
    crawl(&targets, &output, &config).await.expect("Crawl failed");

    let results: Vec<FetchResult> = read_records(&output).expect("Failed to read output");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, None);
    assert!(results[0].snippet.starts_with("ERROR"));
}

#[tokio::test]
async fn test_crawl_from_targets_file_with_blank_lines() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("urls.txt");
    let output = temp_dir.path().join("out.parquet");

    std::fs::write(
        &input,
        format!(
            "{base}/one\n\n   \n{base}/two\n{base}/three\n\n",
            base = mock_server.uri()
        ),
    )
    .unwrap();

    let targets = load_targets(&input).expect("Failed to load targets");
    assert_eq!(targets.len(), 3);

    let report = crawl(&targets, &output, &create_test_config(5))
        .await
        .expect("Crawl failed");
    assert_eq!(report.rows, 3);

    let contents = read_table(&output).expect("Failed to read output");
    assert_eq!(contents.num_rows(), 3);
    assert_eq!(contents.metadata_value(SOURCE_KEY), Some("crawl"));
    assert!(contents.metadata_value(CREATED_AT_KEY).is_some());
}

#[tokio::test]
async fn test_empty_target_list_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");
    let targets: Vec<String> = Vec::new();

    let result = crawl(&targets, &output, &create_test_config(2)).await;

    assert!(matches!(result, Err(HarvestError::NoTargets)));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_stub_fetcher_rows_preserved_in_any_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");

    let targets: Vec<String> = (0..25).map(|i| format!("http://host{}/", i)).collect();

    let report = crawl_with(StubFetcher, &targets, &output, &create_test_config(4))
        .await
        .expect("Crawl failed");
    assert_eq!(report.rows, 25);

    let mut uris: Vec<String> = read_records::<FetchResult>(&output)
        .expect("Failed to read output")
        .into_iter()
        .inspect(|r| {
            assert_eq!(r.status_code, Some(200));
            assert_eq!(r.content_length, 5);
            assert_eq!(r.snippet, "hello world");
        })
        .map(|r| r.uri)
        .collect();
    uris.sort();

    let mut expected = targets.clone();
    expected.sort();
    assert_eq!(uris, expected);
}

#[tokio::test]
async fn test_rerun_overwrites_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.parquet");
    let config = create_test_config(2);

    crawl_with(StubFetcher, &["http://a", "http://b", "http://c"], &output, &config)
        .await
        .expect("First crawl failed");
    crawl_with(StubFetcher, &["http://d"], &output, &config)
        .await
        .expect("Second crawl failed");

    let results: Vec<FetchResult> = read_records(&output).expect("Failed to read output");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].uri, "http://d");
}
