use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::time::timeout;

use tests::{spawn_app, spawn_mock_upstream, tool_payload, EventStream, DEAD_UPSTREAM};

const EVENT_WAIT: Duration = Duration::from_secs(5);

/// Open /sse and return the event stream plus the sessionId extracted
/// from the initial `endpoint` event.
async fn open_sse(client: &reqwest::Client, app: &tests::TestApp) -> (EventStream, String) {
    let resp = client
        .get(app.url("/sse"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .expect("open /sse");
    assert_eq!(resp.status(), 200);

    let mut stream = EventStream::new(resp);
    let endpoint = timeout(EVENT_WAIT, stream.next_event())
        .await
        .expect("endpoint event before timeout")
        .expect("stream open");
    assert_eq!(endpoint.event, "endpoint");
    let session_id = endpoint
        .data
        .split("sessionId=")
        .nth(1)
        .expect("sessionId in endpoint data")
        .to_string();
    (stream, session_id)
}

async fn post_message(
    client: &reqwest::Client,
    app: &tests::TestApp,
    session_id: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(app.url(&format!("/messages?sessionId={session_id}")))
        .json(&body)
        .send()
        .await
        .expect("post /messages")
}

async fn next_message(stream: &mut EventStream) -> Value {
    let event = timeout(EVENT_WAIT, stream.next_event())
        .await
        .expect("message event before timeout")
        .expect("stream open");
    assert_eq!(event.event, "message");
    serde_json::from_str(&event.data).expect("message is JSON-RPC")
}

#[tokio::test]
async fn full_session_flow_over_the_legacy_transport() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (mut stream, session_id) = open_sse(&client, &app).await;

    let health: Value = client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health")
        .json()
        .await
        .expect("health body");
    assert_eq!(health["transports"]["sse"], 1);

    // initialize: acknowledged on the POST, answered on the stream.
    let resp = post_message(
        &client,
        &app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "legacy-test", "version": "0.0.1" }
            }
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let ack: Value = resp.json().await.expect("ack body");
    assert_eq!(ack["ok"], true);

    let init = next_message(&mut stream).await;
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "successco-mcp");

    // tools/call without a bearer token falls back to the configured API
    // key; the response arrives on the stream and reflects that identity.
    post_message(
        &client,
        &app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": { "name": "get_teams", "arguments": {} }
        }),
    )
    .await;
    let call = next_message(&mut stream).await;
    assert_eq!(call["id"], 2);
    let payload = tool_payload(&call["result"]);
    assert_eq!(payload["ok"], true);
    assert_eq!(payload["results"][0]["name"], "test-key");
}

#[tokio::test]
async fn client_disconnect_removes_the_session() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let (stream, _session_id) = open_sse(&client, &app).await;
    drop(stream);

    // The disconnect watcher removes the session shortly after the stream
    // goes away; poll the health probe until it reflects that.
    let mut cleaned = false;
    for _ in 0..50 {
        let health: Value = client
            .get(app.url("/health"))
            .send()
            .await
            .expect("health")
            .json()
            .await
            .expect("health body");
        if health["transports"]["sse"] == 0 {
            cleaned = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(cleaned, "sse session still registered after disconnect");
}

#[tokio::test]
async fn message_for_unknown_session_is_refused() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = post_message(
        &client,
        &app,
        "not-a-session",
        json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn message_without_session_id_gets_corrective_guidance() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/messages"))
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert!(body["guidance"]["expected"]["sessionId"]
        .as_str()
        .is_some());
}

#[tokio::test]
async fn sse_without_event_stream_accept_gets_corrective_guidance() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client.get(app.url("/sse")).send().await.expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["guidance"]["expected"]["accept"], "text/event-stream");
}

#[tokio::test]
async fn upstream_failure_arrives_as_error_shaped_content_on_the_stream() {
    let app = spawn_app(DEAD_UPSTREAM).await;
    let client = reqwest::Client::new();

    let (mut stream, session_id) = open_sse(&client, &app).await;
    post_message(
        &client,
        &app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": "get_teams", "arguments": {} }
        }),
    )
    .await;

    let call = next_message(&mut stream).await;
    assert!(call.get("error").is_none());
    let payload = tool_payload(&call["result"]);
    assert_eq!(payload["ok"], false);
}
