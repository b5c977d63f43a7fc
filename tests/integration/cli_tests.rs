//! Integration tests for the `harvest` binary
//!
//! These run the compiled executable and check its exit status, stdout
//! confirmations and the files it leaves behind.

use harvest::crawler::FetchResult;
use harvest::table::read_records;
use std::path::Path;
use std::process::{Output, Stdio};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn harvest() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_harvest"));
    command.env_remove("RUST_LOG");
    command
}

async fn run(args: &[&str]) -> Output {
    harvest()
        .args(args)
        .output()
        .await
        .expect("Failed to run harvest")
}

async fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = harvest()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn harvest");

    let mut stdin = child.stdin.take().expect("Missing stdin handle");
    stdin
        .write_all(input.as_bytes())
        .await
        .expect("Failed to write stdin");
    drop(stdin);

    child
        .wait_with_output()
        .await
        .expect("Failed to wait for harvest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("Non UTF-8 temp path")
}

#[tokio::test]
async fn test_crawl_blank_input_fails_without_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("urls.txt");
    let output = temp_dir.path().join("out.parquet");
    std::fs::write(&input, "\n   \n\t\n").unwrap();

    let result = run(&["crawl", arg(&input), arg(&output)]).await;

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(stdout(&result).is_empty());
    assert!(String::from_utf8_lossy(&result.stderr).contains("No URIs found in input"));
}

#[tokio::test]
async fn test_crawl_prints_confirmation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("urls.txt");
    let output = temp_dir.path().join("out.parquet");
    std::fs::write(
        &input,
        format!("{base}/one\n{base}/two\n", base = mock_server.uri()),
    )
    .unwrap();

    let result = run(&["--quiet", "crawl", arg(&input), arg(&output), "--workers", "2"]).await;

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        stdout(&result),
        format!("Crawled 2 URLs. Results saved to {}\n", output.display())
    );

    let results: Vec<FetchResult> = read_records(&output).expect("Failed to read output");
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_logs_stay_off_stdout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("urls.txt");
    let output = temp_dir.path().join("out.parquet");
    std::fs::write(&input, format!("{}/page\n", mock_server.uri())).unwrap();

    let result = run(&["-v", "crawl", arg(&input), arg(&output)]).await;

    assert!(result.status.success());
    let out = stdout(&result);
    assert!(out.starts_with(&format!(
        "Crawled 1 URLs. Results saved to {}\n",
        output.display()
    )));
    assert!(!out.contains("Fetching 1 targets"));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Fetching 1 targets"));
}

#[tokio::test]
async fn test_ingest_reads_stdin() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("table.parquet");

    let result = run_with_stdin(
        &["--quiet", "ingest", arg(&output)],
        "[{\"a\": 1}, {\"a\": 2}]",
    )
    .await;

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        stdout(&result),
        format!("Saved 2 rows to {}\n", output.display())
    );
    assert!(output.exists());
}

#[tokio::test]
async fn test_ingest_blank_stdin_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("table.parquet");

    let result = run_with_stdin(&["ingest", arg(&output)], "  \n").await;

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("No input data received"));
}

#[tokio::test]
async fn test_ingest_parse_failure_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("table.parquet");

    let result = run_with_stdin(&["ingest", arg(&output), "--format", "json"], "{\"a\": ").await;

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error parsing input as json"));
}
