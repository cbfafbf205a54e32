use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use tests::{spawn_app, spawn_mock_upstream};

#[tokio::test]
async fn post_mcp_with_wrong_content_type_gets_corrective_guidance() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/mcp"))
        .header("content-type", "text/plain")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["guidance"]["expected"]["content-type"], "application/json");
    assert_eq!(body["guidance"]["current"]["content-type"], "text/plain");
    assert!(body["guidance"]["example"]
        .as_str()
        .expect("example")
        .contains("initialize"));
}

#[tokio::test]
async fn get_mcp_without_event_stream_accept_gets_corrective_guidance() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(app.url("/mcp"))
        .header("accept", "application/json")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["guidance"]["expected"]["accept"], "text/event-stream");
    assert_eq!(body["guidance"]["current"]["accept"], "application/json");
}

#[tokio::test]
async fn get_mcp_with_accept_but_no_session_is_a_session_error() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(app.url("/mcp"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn malformed_json_body_is_a_parse_error() {
    let upstream = spawn_mock_upstream().await;
    let app = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/mcp"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], json!(null));
}
