use std::time::Duration;

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use wled::{ApplyOptions, Controller, Ensured, HttpTransport, Transport, TransportError};

const TIMEOUT: Duration = Duration::from_secs(3);

async fn effects() -> Json<Value> {
    Json(json!(["Solid", "Blink", "TwinkleFox"]))
}

async fn palettes() -> Json<Value> {
    Json(json!(["Default", "Random Cycle", "C9"]))
}

async fn state() -> Json<Value> {
    Json(json!({
        "on": true,
        "bri": 90,
        "seg": [{"id": 0, "on": true, "fx": 0, "pal": 0}]
    }))
}

// Echo the body back, tagged with the content type it arrived with.
async fn post_state(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({"content_type": content_type, "body": body}))
}

async fn not_json() -> &'static str {
    "<html>WLED</html>"
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!([]))
}

async fn spawn_device() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new()
        .route("/json/effects", get(effects))
        .route("/json/palettes", get(palettes))
        .route("/json/state", get(state).post(post_state))
        .route("/html", get(not_json))
        .route("/broken", get(broken))
        .route("/slow", get(slow));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn get_json_parses_body() {
    let base = spawn_device().await;
    let transport = HttpTransport::new();

    let effects = transport
        .get_json(&format!("{base}/json/effects"), TIMEOUT)
        .await
        .expect("get effects");

    assert_eq!(effects, json!(["Solid", "Blink", "TwinkleFox"]));
}

#[tokio::test]
async fn post_json_sends_json_body() {
    let base = spawn_device().await;
    let transport = HttpTransport::new();

    let response = transport
        .post_json(&format!("{base}/json/state"), &json!({"on": false}), TIMEOUT)
        .await
        .expect("post state");

    assert_eq!(response["content_type"], "application/json");
    assert_eq!(response["body"], json!({"on": false}));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let base = spawn_device().await;
    let err = HttpTransport::new()
        .get_json(&format!("{base}/broken"), TIMEOUT)
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Status { status: 500, .. }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let base = spawn_device().await;
    let err = HttpTransport::new()
        .get_json(&format!("{base}/html"), TIMEOUT)
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Decode { .. }));
}

#[tokio::test]
async fn slow_device_times_out() {
    let base = spawn_device().await;
    let err = HttpTransport::new()
        .get_json(&format!("{base}/slow"), Duration::from_millis(200))
        .await
        .expect_err("must time out");

    match err {
        TransportError::Request(e) => assert!(e.is_timeout(), "unexpected error: {e}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn controller_drives_device_over_http() {
    let base = spawn_device().await;
    let mut wled = Controller::new(&format!("{base}/"));

    let ensured = wled
        .ensure_effect(&ApplyOptions::palette("c9"))
        .await
        .expect("ensure");

    match ensured {
        Ensured::Updated(applied) => {
            let sent = &applied.response()["body"];
            assert_eq!(sent["seg"][0]["fx"], 2);
            assert_eq!(sent["seg"][0]["pal"], 2);
            assert_eq!(sent["bri"], 200);
        }
        other => panic!("expected an update, got {other:?}"),
    }
    assert_eq!(wled.last_palette_name(), Some("c9"));
}
