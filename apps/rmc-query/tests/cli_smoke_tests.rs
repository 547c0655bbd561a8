#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the rmc-query binary
//!
//! Runs the real binary against temporary config files and local mock
//! token and catalog endpoints.

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Run rmc-query with a clean `RMC__`/`RUST_LOG` environment
fn run_rmc_query(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rmc-query"));
    for (key, _) in std::env::vars() {
        if key.starts_with("RMC__") {
            cmd.env_remove(key);
        }
    }
    cmd.env_remove("RUST_LOG")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute rmc-query")
}

fn write_config(dir: &TempDir, auth_base: &str, api_base: &str) -> std::path::PathBuf {
    let path = dir.path().join("rmc-query.yaml");
    let yaml = format!(
        r"
auth:
  base_url: {auth_base}
  client_id: smoke-client
  client_secret: smoke-secret-value
api:
  base_url: {api_base}
http:
  request_timeout: 5s
  allow_insecure_http: true
logging:
  level: warn
"
    );
    fs::write(&path, yaml).unwrap();
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_help_command() {
    let output = run_rmc_query(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rmc-query"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("query"), "Should contain 'query' subcommand");
    assert!(stdout.contains("token"), "Should contain 'token' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_rmc_query(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rmc-query"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_rmc_query(&["frobnicate"]);

    assert!(!output.status.success(), "Unknown subcommand should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_cli_missing_config_file() {
    let output = run_rmc_query(&["--config", "/nonexistent/rmc-query.yaml", "check"]);

    assert!(!output.status.success(), "Missing config should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file does not exist"));
}

#[test]
fn test_cli_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "auth: [unclosed\n  client_id: x").unwrap();

    let output = run_rmc_query(&["--config", path_str(&path), "check"]);
    assert!(!output.status.success(), "Broken YAML should fail");
}

#[test]
fn test_cli_check_redacts_secret() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "https://auth.example.com", "https://api.example.com");

    let output = run_rmc_query(&["--config", path_str(&path), "check"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("smoke-client"));
    assert!(stdout.contains("[REDACTED]"));
    assert!(!stdout.contains("smoke-secret-value"));
    assert!(stdout.contains("configuration is valid"));
}

#[test]
fn test_cli_rejects_invalid_log_level() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "https://auth.example.com", "https://api.example.com");
    let yaml = fs::read_to_string(&path).unwrap().replace("level: warn", "level: rmc_auth=loud");
    fs::write(&path, yaml).unwrap();

    let output = run_rmc_query(&["--config", path_str(&path), "check"]);
    assert!(!output.status.success(), "Invalid log level should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid logging.level directive"), "{stderr}");
}

#[test]
fn test_cli_check_rejects_missing_credentials() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.yaml");
    fs::write(
        &path,
        "auth:\n  base_url: https://auth.example.com\napi:\n  base_url: https://api.example.com\n",
    )
    .unwrap();

    let output = run_rmc_query(&["--config", path_str(&path), "check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("client_id"));
}

#[test]
fn test_cli_query_prints_catalog_response() {
    let auth = MockServer::start();
    let token_mock = auth.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200)
            .json_body(json!({"access_token": "smoke-token", "expires_in": 3600, "token_type": "Bearer"}));
    });
    let api = MockServer::start();
    let api_mock = api.mock(|when, then| {
        when.method(POST)
            .path("/v1/catalog/query")
            .header("authorization", "smoke-token")
            .json_body(json!({
                "part_number": ["PN1000", "PN-0500", "PN 07-23 "],
                "pn_matching": "alphanumeric",
                "apply_filter_quantity": false,
                "ignore_empty_parts": false,
                "test_mode": true
            }));
        then.status(200)
            .json_body(json!({"results": [{"part_number": "PN1000", "stock": 12}]}));
    });

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &auth.base_url(), &api.base_url());
    let output = run_rmc_query(&["--config", path_str(&path), "query"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["results"][0]["stock"], 12);
    token_mock.assert_calls(1);
    api_mock.assert_calls(1);
}

#[test]
fn test_cli_query_failure_is_reported_not_fatal() {
    let auth = MockServer::start();
    auth.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200)
            .json_body(json!({"access_token": "smoke-token", "expires_in": 3600}));
    });
    let api = MockServer::start();
    let api_mock = api.mock(|when, then| {
        when.method(POST).path("/v1/catalog/query");
        then.status(503).body("down for maintenance");
    });

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &auth.base_url(), &api.base_url());
    let output = run_rmc_query(&["--config", path_str(&path), "query", "BAV99"]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error during catalog query:"), "{stderr}");
    assert!(stderr.contains("503"), "{stderr}");
    assert!(!stderr.contains("smoke-token"));
    assert!(output.stdout.is_empty());
    api_mock.assert_calls(1);
}

#[test]
fn test_cli_token_prints_expiry_not_token() {
    let auth = MockServer::start();
    let token_mock = auth.mock(|when, then| {
        when.method(POST)
            .path("/oauth2/token")
            .body_includes("client_id=smoke-client");
        then.status(200)
            .json_body(json!({"access_token": "never-printed", "expires_in": 600}));
    });

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &auth.base_url(), "https://api.example.com");
    let output = run_rmc_query(&["--config", path_str(&path), "token"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("access token acquired"));
    assert!(!stdout.contains("never-printed"));
    token_mock.assert_calls(1);
}

#[test]
fn test_cli_env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "https://auth.example.com", "https://api.example.com");

    let output = Command::new(env!("CARGO_BIN_EXE_rmc-query"))
        .env("RMC__AUTH__CLIENT_ID", "from-environment")
        .args(["--config", path_str(&path), "check"])
        .output()
        .expect("Failed to execute rmc-query");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("from-environment"));
}
