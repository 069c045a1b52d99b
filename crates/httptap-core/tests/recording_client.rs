//! End-to-end capture tests against a local mock server.

use std::sync::Arc;

use bytes::Bytes;
use httptap_core::{CaptureEvent, ClientConfig, Outcome, RecordingClient, Store};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn recording_client(dir: &TempDir, namespace: &str, enabled: bool) -> RecordingClient {
    let config = ClientConfig::new(namespace)
        .with_enabled(enabled)
        .with_storage_dir(dir.path());
    RecordingClient::with_transport(config, Arc::new(direct_client())).unwrap()
}

fn store(dir: &TempDir) -> Store {
    Store::open(dir.path()).unwrap()
}

#[tokio::test]
async fn test_request_body_reaches_server_intact() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":1}"#))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "user-service", true);
    let payload = r#"{"name":"Alice","role":"admin"}"#;

    let response = client
        .post(
            &format!("{}/users", server.uri()),
            "application/json",
            payload,
        )
        .await?;
    assert_eq!(response.status().as_u16(), 201);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, payload.as_bytes());

    let records = store(&dir).load_by_namespace("user-service")?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].body.as_deref(), Some(payload));
    assert_eq!(records[0].headers["content-type"], "application/json");
    Ok(())
}

#[tokio::test]
async fn test_streaming_request_body_is_replayed() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "stream", true);

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"part-one,")),
        Ok(Bytes::from_static(b"part-two")),
    ];
    let body = reqwest::Body::wrap_stream(futures::stream::iter(chunks));

    client
        .put(&format!("{}/upload", server.uri()), "text/plain", body)
        .await?;

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, b"part-one,part-two");

    let records = store(&dir).load_by_namespace("stream")?;
    assert_eq!(records[0].body.as_deref(), Some("part-one,part-two"));
    Ok(())
}

#[tokio::test]
async fn test_response_body_matches_unwrapped_call() -> anyhow::Result<()> {
    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(payload.clone())
                .insert_header("x-request-id", "req-456"),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "blobs", true);
    let url = format!("{}/blob", server.uri());

    let unwrapped = direct_client().get(&url).send().await?;
    let unwrapped_headers = unwrapped.headers().clone();
    let unwrapped_body = unwrapped.bytes().await?;

    let recorded = client.get(&url).await?;
    assert_eq!(recorded.status().as_u16(), 200);
    assert_eq!(recorded.headers()["x-request-id"], "req-456");
    assert_eq!(
        recorded.headers().get("content-length"),
        unwrapped_headers.get("content-length")
    );
    let recorded_body = recorded.bytes().await?;

    assert_eq!(recorded_body, unwrapped_body);
    assert_eq!(recorded_body.as_ref(), payload.as_slice());

    let records = store(&dir).load_by_namespace("blobs")?;
    let response = records[0].response.as_ref().unwrap();
    assert_eq!(response.size, payload.len() as u64);
    assert_eq!(response.headers["x-request-id"], "req-456");
    Ok(())
}

#[tokio::test]
async fn test_restored_response_keeps_final_url() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "urls", true);
    let url = format!("{}/where?x=1", server.uri());

    let response = client.get(&url).await?;

    assert_eq!(response.url().as_str(), url);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_a_response() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "svc", true);

    let response = client.delete(&format!("{}/users/1", server.uri())).await?;
    assert_eq!(response.status().as_u16(), 503);
    assert_eq!(response.text().await?, "maintenance");

    let records = store(&dir).load_by_namespace("svc")?;
    assert!(records[0].error.is_none());
    assert_eq!(records[0].status_label(), "503");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_records_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "offline", true);

    let err = client
        .get("http://127.0.0.1:1/health")
        .await
        .expect_err("nothing listens on port 1");
    assert!(err.is_connect() || err.is_request());

    let records = store(&dir).load_by_namespace("offline")?;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.response.is_none());
    match record.outcome() {
        Outcome::Error(message) => assert!(!message.is_empty()),
        other => panic!("expected error outcome, got {other:?}"),
    }
    assert_eq!(record.url, "http://127.0.0.1:1/health");
    Ok(())
}

#[tokio::test]
async fn test_disabled_logging_writes_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("quiet"))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "svc", true);
    let url = format!("{}/get?silent=true", server.uri());

    client.get(&url).await?;
    let before = store(&dir).load_by_namespace("svc")?.len();

    client.set_enabled(false)?;
    let response = client.get(&url).await?;
    assert_eq!(response.text().await?, "quiet");

    let after = store(&dir).load_by_namespace("svc")?.len();
    assert_eq!(before, 1);
    assert_eq!(after, before);

    client.set_enabled(true)?;
    client.get(&url).await?;
    assert_eq!(store(&dir).load_by_namespace("svc")?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_record_visible_when_call_returns() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = recording_client(&dir, "svc", true);
    let mut events = client.subscribe();

    client.get(&format!("{}/ping", server.uri())).await?;

    let event = events.try_recv()?;
    let records = store(&dir).load_all()?;
    assert_eq!(records.len(), 1);
    assert_eq!(
        event,
        CaptureEvent::Recorded {
            id: records[0].id.clone(),
            namespace: "svc".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let client = Arc::new(recording_client(&dir, "burst", true));

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let url = format!("{}/ping/{i}", server.uri());
        handles.push(tokio::spawn(async move {
            client.get(&url).await?.text().await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await??, "pong");
    }

    let records = store(&dir).load_by_namespace("burst")?;
    assert_eq!(records.len(), 8);
    let mut ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    Ok(())
}

#[tokio::test]
async fn test_clear_after_recording() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let dir = TempDir::new()?;
    let gateway = recording_client(&dir, "api-gateway", true);
    let users = recording_client(&dir, "user-service", true);

    gateway.get(&format!("{}/status/200", server.uri())).await?;
    users.get(&format!("{}/users", server.uri())).await?;

    let viewer = store(&dir);
    assert_eq!(
        viewer.list_namespaces()?,
        vec!["api-gateway".to_string(), "user-service".to_string()]
    );

    assert_eq!(viewer.clear_namespace("api-gateway")?, 1);
    assert!(viewer.load_by_namespace("api-gateway")?.is_empty());
    assert_eq!(viewer.list_namespaces()?, vec!["user-service".to_string()]);
    Ok(())
}
