//! End-to-end tests for the `augur` binary.
//!
//! Each run gets an explicit config file, an isolated `HOME` and a scrubbed
//! provider environment so the host setup cannot leak in.
#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Output, Stdio};

use tempfile::{NamedTempFile, TempDir};
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn augur(config: &NamedTempFile, home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_augur"));
    cmd.arg("--config")
        .arg(config.path())
        .env("HOME", home.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn missing_api_key_exits_with_failure() {
    let config = write_config("");
    let home = TempDir::new().unwrap();

    let output = augur(&config, &home)
        .args(["--text", "hello"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("OPENAI_API_KEY is not set"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn unknown_prompt_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = write_config("");
    let home = TempDir::new().unwrap();
    let output = augur(&config, &home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.uri())
        .args(["--text", "hello", "--prompt", "verbose"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(
        err.contains("unknown prompt template 'verbose'. Available: analysis_first, concise"),
        "unexpected stderr: {err}"
    );
    assert!(!err.contains("UnknownTemplate"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn unknown_prompt_wins_over_missing_key() {
    let config = write_config("");
    let home = TempDir::new().unwrap();

    let output = augur(&config, &home)
        .args(["--text", "hello", "--prompt", "verbose"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown prompt template 'verbose'"));
}

#[tokio::test]
async fn list_prompts_includes_config_templates() {
    let config = write_config(
        r#"
        [templates.terse]
        system = "Intents: {labels}"
        "#,
    );
    let home = TempDir::new().unwrap();

    let output = augur(&config, &home)
        .arg("--list-prompts")
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "analysis_first\nconcise\nterse\n"
    );
}

#[tokio::test]
async fn prints_classification_as_indented_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"intent":"greeting","confidence":0.9,"rationale":"says hallo, grüß dich"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = write_config("");
    let home = TempDir::new().unwrap();
    let output = augur(&config, &home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.uri())
        .args(["--text", "grüß dich"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\n  \"intent\": \"greeting\""));
    assert!(stdout.contains("grüß dich"));

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["confidence"], 0.9);
}

#[tokio::test]
async fn label_flags_override_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"intent":"greeting","confidence":0.8,"rationale":"hi"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = write_config(
        r#"
        [defaults]
        labels = ["greeting"]
        "#,
    );
    let home = TempDir::new().unwrap();
    let output = augur(&config, &home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.uri())
        .args(["--text", "hi", "--labels", "refund, shipping", "--strict-labels"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // "greeting" is outside the overriding label set
    assert_eq!(result["intent"], "fallback");
    assert_eq!(result["rationale"], "<parse failed>");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("refund, shipping"));
    assert!(!system.contains("Allowed intents: greeting."));
}
