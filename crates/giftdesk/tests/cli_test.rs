//! Integration tests for the `giftdesk` CLI binary.
//!
//! Argument parsing, help output, completions, and error exit codes, plus
//! a few end-to-end runs against a wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `giftdesk` binary with env isolation.
///
/// Clears all `GIFTDESK_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn giftdesk_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("giftdesk");
    cmd.env("HOME", "/tmp/giftdesk-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/giftdesk-cli-test-nonexistent")
        .env(
            "GIFTDESK_CONFIG",
            "/tmp/giftdesk-cli-test-nonexistent/config.toml",
        )
        .env_remove("GIFTDESK_PROFILE")
        .env_remove("GIFTDESK_API_URL")
        .env_remove("GIFTDESK_APP_URL")
        .env_remove("GIFTDESK_API_KEY")
        .env_remove("GIFTDESK_TOKEN")
        .env_remove("GIFTDESK_OUTPUT")
        .env_remove("GIFTDESK_TIMEOUT")
        .env_remove("GIFTDESK_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn voucher(expires: &str, redeemed_at: Option<&str>) -> serde_json::Value {
    json!({
        "_id": "v1",
        "code": "AB12CD34",
        "status": "active",
        "expirationDate": expires,
        "redeemedAt": redeemed_at,
        "amount": 25
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = giftdesk_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    giftdesk_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("vouchers")
            .and(predicate::str::contains("orders"))
            .and(predicate::str::contains("customers"))
            .and(predicate::str::contains("whoami")),
    );
}

#[test]
fn test_version_flag() {
    giftdesk_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("giftdesk"));
}

#[test]
fn test_vouchers_help_lists_subcommands() {
    giftdesk_cmd()
        .args(["vouchers", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("redeem")
                .and(predicate::str::contains("link"))
                .and(predicate::str::contains("status")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    giftdesk_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    giftdesk_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("giftdesk"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = giftdesk_cmd()
        .args(["--output", "xml", "vouchers", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bad_filter_syntax() {
    let output = giftdesk_cmd()
        .args(["--api-url", "http://127.0.0.1:9/api", "stores", "list", "-f", "nokey"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("key=value"));
}

#[test]
fn test_zero_page_rejected() {
    let output = giftdesk_cmd()
        .args(["vouchers", "list", "--page", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_backend_configured() {
    let output = giftdesk_cmd().args(["vouchers", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No backend configured"));
}

#[test]
fn test_unknown_profile() {
    let output = giftdesk_cmd()
        .args(["--profile", "nope", "vouchers", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_config_show_masks_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "shop"

[profiles.shop]
api_url = "https://api.example.com/api"
api_key = "super-secret-key"
"#,
    )
    .unwrap();

    giftdesk_cmd()
        .env("GIFTDESK_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.shop]")
                .and(predicate::str::contains("api_key = \"****\""))
                .and(predicate::str::contains("super-secret-key").not()),
        );
}

#[test]
fn test_set_default_unknown_profile() {
    let output = giftdesk_cmd()
        .args(["config", "set-default", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ── Backend round trips ─────────────────────────────────────────────

#[test]
fn test_unreachable_backend_is_connection_error() {
    let output = giftdesk_cmd()
        .args(["--api-url", "http://127.0.0.1:9/api", "vouchers", "get", "AB12CD34"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_json_log_format_on_stderr() {
    let output = giftdesk_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--log-format",
            "json",
            "-vv",
            "vouchers",
            "get",
            "AB12CD34",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"level\":\"DEBUG\""), "{stderr}");
}

#[test]
fn test_invalid_log_format() {
    giftdesk_cmd()
        .args(["--log-format", "xml", "whoami"])
        .assert()
        .code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_voucher_status_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers/code/AB12CD34"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voucher("2020-01-01T00:00:00Z", None)),
        )
        .mount(&server)
        .await;

    giftdesk_cmd()
        .args(["--api-url", &server.uri(), "-o", "plain", "vouchers", "status", "AB12CD34"])
        .assert()
        .success()
        .stdout(predicate::str::diff("expired\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_voucher_get_json_reports_effective_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers/code/AB12CD34"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voucher("2020-01-01T00:00:00Z", None)),
        )
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "-o", "json", "vouchers", "get", "AB12CD34"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "expired");
    assert_eq!(body["stored_status"], "active");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_order_get_json_carries_derived_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/o1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "_id": "o1",
                "customerId": "c1",
                "voucher": voucher("2020-01-01T00:00:00Z", None),
                "paymentDetails": {
                    "paymentId": "pay_1",
                    "paymentStatus": "completed",
                    "provider": "stripe",
                    "amount": 25
                }
            }
        })))
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "-o", "json-compact", "orders", "get", "o1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "expired");
    assert_eq!(body["voucher"]["status"], "expired");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_expired_voucher_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers/code/AB12CD34"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voucher("2020-01-01T00:00:00Z", None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/vouchers/redeem/AB12CD34"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "--yes", "vouchers", "redeem", "AB12CD34"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_requires_confirmation_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/vouchers/redeem/AB12CD34"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "vouchers", "redeem", "AB12CD34"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers/code/AB12CD34"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voucher("2099-01-01T00:00:00Z", None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/vouchers/redeem/AB12CD34"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": voucher("2099-01-01T00:00:00Z", Some("2026-10-19T12:00:00Z"))
        })))
        .expect(1)
        .mount(&server)
        .await;

    giftdesk_cmd()
        .args(["--api-url", &server.uri(), "--yes", "vouchers", "redeem", "AB12CD34"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redeemed at 2026-10-19 12:00 UTC"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vouchers_list_json_keeps_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [voucher("2099-01-01T00:00:00Z", None)],
            "pagination": {"page": 1, "limit": 10, "total": 11, "pages": 2}
        })))
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "-o", "json", "vouchers", "list"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["total"], 11);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["items"][0]["code"], "AB12CD34");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_voucher_link_uses_app_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vouchers/code/AB12CD34"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voucher("2099-01-01T00:00:00Z", None)),
        )
        .mount(&server)
        .await;

    giftdesk_cmd()
        .args([
            "--api-url",
            &server.uri(),
            "--app-url",
            "https://gifts.example.com/",
            "-o",
            "plain",
            "vouchers",
            "link",
            "AB12CD34",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "https://gifts.example.com/vouchers/redeem/AB12CD34\n",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(wiremock::matchers::header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"_id": "u1", "name": "Ana", "email": "ana@example.com", "role": "admin"}
        })))
        .mount(&server)
        .await;

    giftdesk_cmd()
        .args(["--api-url", &server.uri(), "--token", "tok-1", "-o", "plain", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::diff("ana@example.com\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "invalid token"})),
        )
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args(["--api-url", &server.uri(), "whoami"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("invalid token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_order_create_without_store_is_usage_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = giftdesk_cmd()
        .args([
            "--api-url",
            &server.uri(),
            "orders",
            "create",
            "--customer",
            "c1",
            "--payment-status",
            "completed",
            "--provider",
            "stripe",
            "--payment-email",
            "buyer@example.com",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("select a store"));
}
