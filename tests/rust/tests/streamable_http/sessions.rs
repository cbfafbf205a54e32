use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use successco_mcp::ToolRegistry;
use tests::{spawn_app, spawn_mock_upstream, tool_payload, DEAD_UPSTREAM};

const SESSION_HEADER: &str = "mcp-session-id";

fn initialize_body() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "integration-test", "version": "0.0.1" }
        }
    })
}

async fn initialize(client: &reqwest::Client, app: &tests::TestApp) -> (String, Value) {
    let resp = client
        .post(app.url("/mcp"))
        .json(&initialize_body())
        .send()
        .await
        .expect("initialize request");
    assert_eq!(resp.status(), 200);
    let session_id = resp
        .headers()
        .get(SESSION_HEADER)
        .expect("session id header")
        .to_str()
        .expect("header is ascii")
        .to_string();
    let body: Value = resp.json().await.expect("json body");
    (session_id, body)
}

async fn session_count(client: &reqwest::Client, app: &tests::TestApp, kind: &str) -> u64 {
    let health: Value = client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");
    health["transports"][kind].as_u64().expect("count")
}

#[tokio::test]
async fn initialize_creates_exactly_one_session() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, body) = initialize(&client, &app).await;
    assert!(!session_id.is_empty());
    assert_eq!(body["result"]["serverInfo"]["name"], "successco-mcp");
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");

    assert_eq!(session_count(&client, &app, "streamable").await, 1);
    assert_eq!(session_count(&client, &app, "sse").await, 0);
}

#[tokio::test]
async fn repeat_initialize_on_a_session_does_not_mint_a_second() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;

    let resp = client
        .post(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .json(&initialize_body())
        .send()
        .await
        .expect("repeat initialize");
    assert_eq!(resp.status(), 200);
    let echoed = resp
        .headers()
        .get(SESSION_HEADER)
        .expect("session id header")
        .to_str()
        .expect("ascii");
    assert_eq!(echoed, session_id);

    assert_eq!(session_count(&client, &app, "streamable").await, 1);
}

#[tokio::test]
async fn non_initialize_without_session_is_refused_without_creating_state() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/mcp"))
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32000);

    assert_eq!(session_count(&client, &app, "streamable").await, 0);
}

#[tokio::test]
async fn unknown_session_id_is_refused() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/mcp"))
        .header(SESSION_HEADER, "not-a-session")
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn delete_tears_down_and_reports_unknown_on_repeat() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;
    assert_eq!(session_count(&client, &app, "streamable").await, 1);

    let resp = client
        .delete(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["ok"], true);
    assert_eq!(session_count(&client, &app, "streamable").await, 0);

    // Second delete: the id no longer resolves, reported as such rather
    // than crashing or pretending success.
    let resp = client
        .delete(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .send()
        .await
        .expect("second delete");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn tools_list_enumerates_every_registered_tool_once() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;
    let resp = client
        .post(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .json(&json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .send()
        .await
        .expect("tools/list");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    let tools = body["result"]["tools"].as_array().expect("tools array");

    let registry = ToolRegistry::new();
    assert_eq!(tools.len(), registry.len());
    let mut seen: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().expect("name"))
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), registry.len(), "duplicate tool names listed");
}

#[tokio::test]
async fn tool_call_runs_as_the_request_bearer_token() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;
    let resp = client
        .post(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .header("authorization", "Bearer token-alpha")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "get_teams", "arguments": {} }
        }))
        .send()
        .await
        .expect("tools/call");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    let payload = tool_payload(&body["result"]);
    assert_eq!(payload["ok"], true);
    // The mock upstream reflects the credential it saw into the team name.
    assert_eq!(payload["results"][0]["name"], "token-alpha");
}

#[tokio::test]
async fn concurrent_calls_on_one_session_keep_credentials_isolated() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;

    let call = |token: &'static str, id: u64| {
        let client = client.clone();
        let url = app.url("/mcp");
        let session_id = session_id.clone();
        async move {
            let resp = client
                .post(url)
                .header(SESSION_HEADER, session_id)
                .header("authorization", format!("Bearer {token}"))
                .json(&json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": "tools/call",
                    "params": { "name": "get_teams", "arguments": {} }
                }))
                .send()
                .await
                .expect("tools/call");
            let body: Value = resp.json().await.expect("json body");
            tool_payload(&body["result"])
        }
    };

    // Both requests are in flight at once (the mock delays its answers);
    // neither may observe the other's token.
    let (alpha, beta) = tokio::join!(call("token-alpha", 10), call("token-beta", 11));
    assert_eq!(alpha["results"][0]["name"], "token-alpha");
    assert_eq!(beta["results"][0]["name"], "token-beta");
}

#[tokio::test]
async fn upstream_failure_degrades_to_error_shaped_content() {
    let app = spawn_app(DEAD_UPSTREAM).await;
    let client = reqwest::Client::new();

    let (session_id, _) = initialize(&client, &app).await;
    let resp = client
        .post(app.url("/mcp"))
        .header(SESSION_HEADER, &session_id)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": { "name": "get_teams", "arguments": {} }
        }))
        .send()
        .await
        .expect("tools/call");

    // Still a successful JSON-RPC exchange; the failure lives in content.
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert!(body.get("error").is_none());
    let payload = tool_payload(&body["result"]);
    assert_eq!(payload["ok"], false);
    assert!(payload["error"].as_str().is_some_and(|e| !e.is_empty()));
}
