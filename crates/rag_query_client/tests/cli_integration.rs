//! Integration tests for the rag-query binary.
//! Runs the binary with assert_cmd, a real temp config, and an in-process HTTP server.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write as _;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn free_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap().port()
}

/// Write a minimal YAML config to a temp file pointing at `base_url`.
fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "api:\n  base_url: {}", base_url).unwrap();
    path
}

async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("query_text", "What is in the doc?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Test answer.",
            "contexts": [{
                "score": 0.5,
                "metadata": {
                    "file_name": "doc.pdf",
                    "file_type": "application/pdf",
                    "file_size": 1536,
                    "last_modified_date": "2024-01-15"
                }
            }]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn one_shot_prints_answer_and_sources() {
    let server = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(&config_path)
        .arg("What is in the doc?");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Test answer."))
        .stdout(predicate::str::contains("doc.pdf (50.0% relevant)"))
        .stdout(predicate::str::contains("Size: 1.5 KB"))
        .stderr(predicate::str::contains("Loading..."));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_flag_with_config_env_var() {
    let server = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.env("RAG_QUERY_CONFIG", &config_path)
        .arg("--json")
        .arg("What is in the doc?");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Sources [Show Summary]"))
        .stdout(predicate::str::contains("\"file_name\": \"doc.pdf\""))
        .stdout(predicate::str::contains("relevant").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_reads_queries_and_commands_from_stdin() {
    let server = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(&config_path)
        .write_stdin("What is in the doc?\n:json\n:quit\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Test answer."))
        .stdout(predicate::str::contains("50.0% relevant"))
        .stdout(predicate::str::contains("\"score\": 0.5"));
}

#[test]
fn server_down_prints_fallback_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &format!("http://127.0.0.1:{}", free_port()));

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config").arg(&config_path).arg("hello");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error occurred while fetching response",
        ));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_index_commands() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"name": "notes.md", "size": 3072, "last_modified": 1705312800.5}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Index reloaded successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"upload.md\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"message": "Successfully uploaded upload.md and updated index"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());
    let upload = dir.path().join("upload.md");
    std::fs::write(&upload, "# Upload\n").unwrap();

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(&config_path)
        .write_stdin(format!(
            ":docs\n:reload\n:upload {}\n:upload\n:quit\n",
            upload.display()
        ));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("notes.md  3.0 KB  1/15/2024"))
        .stdout(predicate::str::contains("Index reloaded successfully"))
        .stdout(predicate::str::contains("Successfully uploaded upload.md"))
        .stderr(predicate::str::contains("usage: :upload <path>"));
}

#[test]
fn write_config_creates_file_with_defaults_filled() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nested").join("config.yaml");

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(&config_path)
        .arg("--write-config")
        .arg("--base-url")
        .arg("http://rag.internal:9000");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let cfg = rag_query_client::config::load(&config_path).expect("written config loads");
    assert_eq!(cfg.api.base_url.as_deref(), Some("http://rag.internal:9000"));
    assert_eq!(cfg.display.date_format.as_deref(), Some("%-m/%-d/%Y"));
}

#[test]
fn write_config_rejects_bad_base_url() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    let mut cmd = Command::from(cargo_bin_cmd!("rag-query"));
    cmd.arg("--config")
        .arg(&config_path)
        .arg("--write-config")
        .arg("--base-url")
        .arg("not a url");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
    assert!(!config_path.exists());
}
