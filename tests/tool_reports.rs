//! Integration tests for the status, list, test-all and switch reports
//!
//! Each operation runs against a wiremock daemon and the resulting text
//! report and error flag are checked.

use clashpilot::config::Config;
use clashpilot::handlers::AppState;
use clashpilot::metrics::{Outcome, ToolName};
use clashpilot::nodes::{DelayProber, ProbeOptions, ProbeOutcome};
use clashpilot::tools::params::{SwitchNodeParams, TestAllParams};
use clashpilot::tools::{self, nodes, status, switch};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

fn create_test_state(mock_url: &str) -> AppState {
    let toml = format!(
        r#"
[daemon]
api_url = "{mock_url}"
request_timeout_seconds = 5

[probe]
timeout_ms = 800
default_group = "Proxies"

[status]
key_groups = ["Proxies", "GLOBAL", "Streaming"]
"#
    );
    let config: Config = toml.parse().expect("should parse TOML config");
    AppState::new(Arc::new(config)).expect("state should build")
}

fn table() -> serde_json::Value {
    json!({
        "proxies": {
            "GLOBAL": { "name": "GLOBAL", "type": "Selector", "now": "Proxies", "all": ["Proxies", "DIRECT"] },
            "Proxies": { "name": "Proxies", "type": "Selector", "now": "HK 01", "all": ["HK 01", "JP 02", "剩余流量：10GB"] },
            "HK 01": { "name": "HK 01", "type": "Vmess", "history": [{ "time": "t", "delay": 88 }] },
            "JP 02": { "name": "JP 02", "type": "Trojan", "history": [{ "time": "t", "delay": 0 }] },
            "剩余流量：10GB": { "name": "剩余流量：10GB", "type": "Shadowsocks" },
            "DIRECT": { "name": "DIRECT", "type": "Direct" },
            "REJECT": { "name": "REJECT", "type": "Reject" }
        }
    })
}

async fn mount_table(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table()))
        .mount(server)
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_report_shows_daemon_and_key_groups() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "version": "v1.18.1", "meta": true })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": "rule",
            "mixed-port": 7890,
            "tun": { "enable": true, "device": "utun9" }
        })))
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let report = status::run(&state).await;

    assert!(!report.is_error(), "report: {}", report.text());
    let text = report.text();
    assert!(text.contains("mihomo v1.18.1"));
    assert!(text.contains("rule"));
    assert!(text.contains("7890"));
    assert!(text.contains("ON (utun9)"));
    assert!(text.contains("Proxies"));
    assert!(text.contains("HK 01"));
    // Configured but absent from the table
    assert!(!text.contains("Streaming"));
}

#[tokio::test]
async fn test_status_reports_upstream_failure() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/configs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let report = status::run(&state).await;

    assert!(report.is_error());
    assert!(report.text().contains("401"), "report: {}", report.text());
}

// ─────────────────────────────────────────────────────────────────────────────
// List and test-all
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_excludes_groups_and_info_entries() {
    let server = MockServer::start().await;
    mount_table(&server).await;

    let state = create_test_state(&server.uri());
    let report = nodes::list(&state).await;

    assert!(!report.is_error());
    let text = report.text();
    assert!(text.starts_with("2 eligible nodes"), "report: {}", text);
    assert!(text.contains("88ms"));
    assert!(!text.contains("剩余流量"));
    assert!(text.contains("Groups (2):"));
}

#[tokio::test]
async fn test_all_probes_only_eligible_nodes() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/proxies/HK%2001/delay"))
        .and(query_param("timeout", "800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 210 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/JP%2002/delay"))
        .respond_with(ResponseTemplate::new(408).set_body_json(json!({ "message": "Timeout" })))
        .expect(1)
        .mount(&server)
        .await;
    // Groups, built-ins and placeholders are never probed
    for node in ["DIRECT", "REJECT", "Proxies", "GLOBAL"] {
        Mock::given(method("GET"))
            .and(path(format!("/proxies/{}/delay", node)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 1 })))
            .expect(0)
            .mount(&server)
            .await;
    }

    let state = create_test_state(&server.uri());
    let report = nodes::test_all(&state, TestAllParams::default()).await;

    assert!(!report.is_error());
    let text = report.text();
    assert!(text.starts_with("Tested 2 nodes"), "report: {}", text);
    assert!(text.contains("1/2 nodes available | Best: HK 01 (210ms)"));
    assert!(text.contains("timeout"));
    assert!(text.contains("210ms"));
}

#[tokio::test]
async fn test_all_rejects_out_of_range_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = TestAllParams {
        timeout_ms: Some(120_000),
        url: None,
    };
    let report = nodes::test_all(&state, params).await;

    assert!(report.is_error());
    assert!(report.text().starts_with("Invalid arguments"));
}

#[tokio::test]
async fn test_malformed_delay_body_counts_as_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies/X/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/Y/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let options = ProbeOptions::new(800, "https://www.gstatic.com/generate_204");

    assert_eq!(
        state.client().probe("X", &options).await,
        ProbeOutcome::Unreachable
    );
    assert_eq!(
        state.client().probe("Y", &options).await,
        ProbeOutcome::Unreachable
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Switch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_switch_sends_node_name_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Proxies"))
        .and(body_json(json!({ "name": " HK 01 " })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/%20HK%2001%20/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 77 })))
        .expect(1)
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: " HK 01 ".to_string(),
        group: None,
    };
    let report = switch::run(&state, params).await;

    assert!(!report.is_error(), "report: {}", report.text());
    assert!(report.text().contains("Delay: 77ms"));
}

#[tokio::test]
async fn test_switch_reports_delay_of_new_node() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Proxies"))
        .and(body_json(json!({ "name": "JP 02" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/JP%2002/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 64 })))
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: "JP 02".to_string(),
        group: None,
    };
    let report = switch::run(&state, params).await;

    assert!(!report.is_error());
    assert_eq!(report.text(), "Switched [Proxies] -> JP 02\n  Delay: 64ms");
    assert_eq!(state.metrics().probe_count(true), 1);
}

#[tokio::test]
async fn test_switch_warns_when_new_node_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/GLOBAL"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/DIRECT/delay"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: "DIRECT".to_string(),
        group: Some("GLOBAL".to_string()),
    };
    let report = switch::run(&state, params).await;

    assert!(!report.is_error());
    assert!(report.text().contains("Warning: node may not be reachable"));
}

#[tokio::test]
async fn test_switch_failure_lists_eligible_members() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Proxies"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"message":"Selector update error: proxy not exist"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/Proxies"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table()["proxies"]["Proxies"].clone()),
        )
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: "KR 09".to_string(),
        group: None,
    };
    let report = switch::run(&state, params).await;

    assert!(report.is_error());
    let text = report.text();
    assert!(text.contains("Error switching [Proxies] -> KR 09"));
    assert!(text.contains("HTTP 400"));
    assert!(text.contains("proxy not exist"));
    assert!(text.contains("  - HK 01\n  - JP 02"));
    assert!(!text.contains("剩余流量"));
}

#[tokio::test]
async fn test_switch_into_missing_group_says_so() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "resource not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/Nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "resource not found" })))
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: "HK 01".to_string(),
        group: Some("Nope".to_string()),
    };
    let report = switch::run(&state, params).await;

    assert!(report.is_error());
    assert!(report.text().contains("HTTP 404"));
    assert!(
        report.text().contains("(group [Nope] does not exist)"),
        "report: {}",
        report.text()
    );
}

#[tokio::test]
async fn test_switch_rejects_empty_node() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let state = create_test_state(&server.uri());
    let params = SwitchNodeParams {
        node: "   ".to_string(),
        group: None,
    };
    let report = switch::run(&state, params).await;

    assert!(report.is_error());
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation boundary
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_daemon_yields_error_report() {
    // Nothing listens on the discard port
    let state = create_test_state("http://127.0.0.1:9");
    let report = tools::guarded(&state, ToolName::ListNodes, |state| async move {
        nodes::list(&state).await
    })
    .await;

    assert!(report.is_error());
    assert!(report.text().starts_with("Error: cannot fetch proxies"));
    assert_eq!(
        state
            .metrics()
            .tool_call_count(ToolName::ListNodes, Outcome::Failure),
        1
    );
}
