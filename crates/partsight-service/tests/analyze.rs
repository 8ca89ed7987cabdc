//! End-to-end orchestrator scenarios against a stubbed upstream service
//! and a tempdir-backed cache.

use std::path::Path;
use std::sync::{Arc, Mutex};

use partsight_core::{ErrorKind, ScreenerConfig};
use partsight_service::ScreenerService;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ── Minimal HTTP stub standing in for the upstream service ──

#[derive(Debug, Clone)]
struct StubRequest {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn spawn_stub(
    handler: impl Fn(&StubRequest) -> (u16, String) + Send + Sync + 'static,
) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Arc<Mutex<Vec<StubRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let Some(request) = read_request(&mut socket).await else {
                continue;
            };
            let (status, body) = handler(&request);
            log.lock().unwrap().push(request);
            let head = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    StubServer {
        url: format!("http://{addr}"),
        requests,
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<StubRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut start = lines.next()?.split_whitespace();
    let method = start.next()?.to_string();
    let path = start.next()?.to_string();

    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "authorization" => authorization = Some(value.trim().to_string()),
            "content-length" => content_length = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(StubRequest {
        method,
        path,
        authorization,
        body: String::from_utf8_lossy(&buf[body_start..]).to_string(),
    })
}

// ── Fixtures ──

fn results_body() -> String {
    r#"{"results":[{"publication_number":"EP123","title":"T","applicant":"A","publication_date":"2020-01-01","score":0.9}]}"#
        .to_string()
}

fn service_for(stub: &StubServer, cache_dir: &Path) -> ScreenerService {
    let mut config = ScreenerConfig::with_key("secret-key");
    config.data_api_url = format!("{}/api/data/case", stub.url);
    config.cache_dir = cache_dir.to_path_buf();
    config.timeout_seconds = 5;
    ScreenerService::new(config).unwrap()
}

// ── Scenarios ──

#[tokio::test]
async fn first_analysis_hits_upstream_and_normalizes() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let result = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert!(!result.from_cache);
    assert_eq!(result.patent_count, 1);
    let patent = &result.patents[0];
    assert_eq!(patent.patent_number, "EP123");
    assert_eq!(patent.relevance_score, 0.9);
    assert_eq!(stub.request_count(), 1);
}

#[tokio::test]
async fn repeat_analysis_served_from_cache() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let first = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    let second = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;

    assert!(second.success);
    assert!(second.from_cache);
    assert!(!first.from_cache);
    assert_eq!(second.patents, first.patents);
    // No additional upstream traffic for the repeat.
    assert_eq!(stub.request_count(), 1);
}

#[tokio::test]
async fn new_fingerprint_is_not_throttled_by_other_queries() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    // Different component, same throttle window: must go upstream.
    let result = service
        .analyze("Wheel Bearing", "Sealed bearing unit", "REF1")
        .await;

    assert!(result.success);
    assert!(!result.throttled);
    assert_eq!(stub.request_count(), 2);
}

#[tokio::test]
async fn auth_exhaustion_surfaces_and_caches_nothing() {
    let stub = spawn_stub(|_| (401, r#"{"error":"unauthorized"}"#.to_string())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let result = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;

    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::Authentication));
    assert!(!result.throttled);
    assert!(result.patents.is_empty());
    // One probe pass: all four variants.
    assert_eq!(stub.request_count(), 4);

    // Nothing was cached: the retry cannot be a cache hit. The failed
    // attempt armed the throttle, so it is refused locally instead.
    let retry = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    assert!(!retry.success);
    assert_eq!(retry.error_type, Some(ErrorKind::Throttled));
    assert_eq!(retry.retry_after, Some(300));
    assert_eq!(stub.request_count(), 4);
}

#[tokio::test]
async fn expired_cache_within_throttle_window_is_throttled() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();

    let mut config = ScreenerConfig::with_key("secret-key");
    config.data_api_url = format!("{}/api/data/case", stub.url);
    config.cache_dir = tmp.path().to_path_buf();
    config.timeout_seconds = 5;
    // Everything expires immediately; only the throttle marker persists.
    config.cache_ttl_hours = 0;
    let service = ScreenerService::new(config).unwrap();

    let first = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    assert!(first.success);

    let second = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    assert!(!second.success);
    assert!(second.throttled);
    assert_eq!(second.error_type, Some(ErrorKind::Throttled));
    assert_eq!(second.retry_after, Some(300));
    assert_eq!(stub.request_count(), 1);
}

#[tokio::test]
async fn session_token_resolved_with_single_follow_up() {
    let stub = spawn_stub(|req| {
        if req.method == "POST" {
            (200, r#"{"data":{"token":"tok-1"}}"#.to_string())
        } else {
            assert!(req.path.contains("token=tok-1"), "path was: {}", req.path);
            (200, results_body())
        }
    })
    .await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let result = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.patent_count, 1);
    assert_eq!(stub.request_count(), 2);
}

#[tokio::test]
async fn empty_inputs_rejected_without_upstream_calls() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let result = service.analyze("", "description", "REF1").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::Validation));

    let result = service.analyze("name", "   ", "REF1").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::Validation));

    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    service.clear_cache().unwrap();

    let result = service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    assert!(result.success);
    assert!(!result.from_cache);
    assert_eq!(stub.request_count(), 2);
}

#[tokio::test]
async fn status_reports_configuration() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    let status = service.status();
    assert!(status.configured);
    assert_eq!(status.cache_ttl_hours, 24);
    assert_eq!(status.throttle_minutes, 5);
    assert_eq!(status.default_rows, 25);
    assert_eq!(status.max_rows, 100);

    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"configured\":true"));
}

#[tokio::test]
async fn different_reference_is_a_different_fingerprint() {
    let stub = spawn_stub(|_| (200, results_body())).await;
    let tmp = tempfile::TempDir::new().unwrap();
    let service = service_for(&stub, tmp.path());

    service
        .analyze("Brake Caliper", "High-performance caliper", "REF1")
        .await;
    let result = service
        .analyze("Brake Caliper", "High-performance caliper", "REF2")
        .await;

    assert!(result.success);
    assert!(!result.from_cache);
    assert_eq!(stub.request_count(), 2);
}
