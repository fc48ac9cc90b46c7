#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use perfscope_server::app;
use perfscope_server::config::ServerConfig;
use perfscope_server::state::AppState;
use serde_json::Value;
use std::io::Write;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

/// Context backed by the built-in rule set.
pub fn build_test_context() -> Result<TestContext> {
    build_context(None, |_| {})
}

/// Context whose rules are read from a YAML file inside the context's
/// temp dir, see [`rules_file`].
pub fn build_test_context_with_rules(rules_yaml: &str) -> Result<TestContext> {
    build_context(Some(rules_yaml), |_| {})
}

pub fn build_context(
    rules_yaml: Option<&str>,
    customize: impl FnOnce(&mut AppState),
) -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;

    let rules_path = match rules_yaml {
        Some(yaml) => {
            let path = rules_file(&temp_dir);
            let mut file = std::fs::File::create(&path)?;
            file.write_all(yaml.as_bytes())?;
            Some(path.to_string_lossy().to_string())
        }
        None => None,
    };

    let config = ServerConfig {
        http_port: 0,
        rules_path,
        analysis_timeout_secs: 5,
        ..Default::default()
    };

    let mut state = AppState::new(config);
    customize(&mut state);
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

pub fn rules_file(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("rules.yaml")
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    request_raw(app, method, uri, "application/json", req_body).await
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    content_type: &str,
    body: String,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["status"], "success");
    assert!(json["trace_id"].is_string());
    assert!(json.get("err_code").is_none());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["status"], "error");
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json["trace_id"].is_string());
    assert!(json.get("suggestions").is_none());
}

/// JMeter CSV with one successful 1200 ms `Login` sample and twenty 300 ms
/// `Checkout` samples of which one failed (5% error rate).
pub fn login_checkout_csv() -> String {
    let mut csv = String::from("timeStamp,elapsed,label,responseCode,success\n");
    csv.push_str("1700000000000,1200,Login,200,true\n");
    for i in 0..20 {
        let success = if i == 0 { "false" } else { "true" };
        csv.push_str(&format!(
            "{},300,Checkout,200,{success}\n",
            1_700_000_000_000u64 + (i + 1) * 100
        ));
    }
    csv
}

pub const LOADRUNNER_REPORT: &str = r#"<html><body>
<table class="TransactionSummary">
  <tr><th>Transaction Name</th><th>SLA Status</th><th>Average</th><th>Maximum</th><th>Fail %</th></tr>
  <tr><td>Login</td><td>Pass</td><td>2.45</td><td>3.10</td><td>1.23%</td></tr>
  <tr><td>Check&amp;Pay</td><td>Pass</td><td>0.30</td><td>0.90</td><td>0%</td></tr>
</table>
</body></html>"#;

pub const LOGIN_CHECKOUT_RULES: &str = r#"
rules:
  - id: slow_avg
    condition:
      metric: avg_response_time_ms
      operator: ">"
      threshold: 1000
    suggestion: "{transaction_name} average {value} ms exceeds {threshold} ms"
    priority: 1
  - id: high_errors
    condition:
      metric: error_rate_percent
      operator: ">"
      threshold: 1.0
    suggestion: "{transaction_name} error rate {value}% exceeds {threshold}%"
    priority: 2
"#;
