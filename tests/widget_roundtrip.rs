//! Widget ↔ endpoint round trips over a real socket.
//!
//! Each test starts the axum router on `127.0.0.1:0` with a fake reasoning
//! service, then drives an [`UploadWidget`] through [`HttpTransport`].

mod common;

use async_trait::async_trait;
use axum::extract::{Multipart, State};
use axum::Json;
use common::{contract_reply, CannedService, FixedExtractor};
use contract_risk::document::PDF_MEDIA_TYPE;
use contract_risk::server::RISK_ASSESSMENT_PATH;
use contract_risk::widget::{
    AnalysisTransport, SelectedFile, TransportError, WidgetObserver, CLIENT_TYPE_MESSAGE,
};
use contract_risk::{
    router, AnalysisResult, Analyzer, AnalyzerConfig, HttpTransport, RemoteServiceError,
    UploadWidget, WidgetState,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct Server {
    base_url: String,
    service: Arc<CannedService>,
    extractor: Arc<FixedExtractor>,
}

async fn spawn_server(service: CannedService) -> Server {
    common::init_tracing();
    let service = Arc::new(service);
    let extractor = Arc::new(FixedExtractor::new("INDEPENDENT CONTRACTOR AGREEMENT"));
    let analyzer = Analyzer::with_service(AnalyzerConfig::default(), service.clone())
        .with_extractor(extractor.clone());
    let app = router(Arc::new(analyzer), 10 * 1024 * 1024);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Server {
        base_url: format!("http://{addr}"),
        service,
        extractor,
    }
}

/// Form fields of each received request; file contents are not kept.
type Recorded = Arc<Mutex<Vec<Vec<(String, Option<String>)>>>>;

/// Endpoint stand-in that records which form fields arrive.
async fn spawn_recorder() -> (String, Recorded) {
    let seen = Recorded::default();
    let app = axum::Router::new()
        .route(RISK_ASSESSMENT_PATH, axum::routing::post(record_fields))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), seen)
}

async fn record_fields(
    State(seen): State<Recorded>,
    mut multipart: Multipart,
) -> Json<AnalysisResult> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        let value = (name != "file").then(|| String::from_utf8_lossy(&bytes).into_owned());
        fields.push((name, value));
    }
    seen.lock().unwrap().push(fields);
    Json(AnalysisResult::scored(2, "Standard terms.", Vec::new()))
}

/// Wraps a transport and counts submissions.
struct Counting<T> {
    inner: T,
    submissions: AtomicUsize,
}

#[async_trait]
impl<T: AnalysisTransport> AnalysisTransport for Counting<T> {
    async fn submit(
        &self,
        file: &SelectedFile,
        skip_gatekeeper: bool,
    ) -> Result<AnalysisResult, TransportError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.inner.submit(file, skip_gatekeeper).await
    }
}

#[derive(Default)]
struct Transitions(AtomicUsize);

impl WidgetObserver for Transitions {
    fn on_transition(&self, _from: &WidgetState, _to: &WidgetState) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loopback requests must not be routed through an ambient HTTP proxy.
fn local_transport(base_url: &str) -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client, base_url)
}

fn pdf() -> SelectedFile {
    SelectedFile::new("contractor.pdf", PDF_MEDIA_TYPE, b"%PDF-1.7 fake".to_vec())
}

#[tokio::test]
async fn contract_round_trip_completes() {
    let risks = ["IP assignment", "Non-compete", "Net-90 payment", "No cap"];
    let server = spawn_server(CannedService::ok(&contract_reply(json!(6), &risks))).await;
    let observer = Arc::new(Transitions::default());
    let widget = UploadWidget::new(Arc::new(local_transport(&server.base_url)))
        .with_observer(observer.clone());

    let state = widget.select_file(pdf()).await;

    let result = match state {
        WidgetState::Complete { result } => result,
        other => panic!("expected Complete, got {other:?}"),
    };
    assert_eq!(result.risk_score, 6);
    assert_eq!(result.risk_summary, "The indemnity clause is one-sided.");
    assert_eq!(result.key_risks.len(), 4);
    assert_eq!(
        result.displayed_risks(),
        &["IP assignment", "Non-compete", "Net-90 payment"]
    );
    assert_eq!(observer.0.load(Ordering::SeqCst), 2);
    assert_eq!(server.service.calls(), 1);
}

#[tokio::test]
async fn transport_returns_envelope() {
    let server = spawn_server(CannedService::ok(&contract_reply(json!("3"), &["A"]))).await;
    let transport = local_transport(&server.base_url);

    let result = tokio_test::assert_ok!(transport.submit(&pdf(), false).await);

    assert_eq!(result.risk_score, 3);
    assert_eq!(result.interpretation, "Very Good. Low risk with minor points to review.");
}

#[tokio::test]
async fn skip_field_sent_only_when_set() {
    let (base_url, seen) = spawn_recorder().await;
    let transport = local_transport(&base_url);

    tokio_test::assert_ok!(transport.submit(&pdf(), false).await);
    tokio_test::assert_ok!(transport.submit(&pdf(), true).await);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], vec![("file".to_string(), None)]);
    assert_eq!(
        seen[1],
        vec![
            ("file".to_string(), None),
            ("skip_gatekeeper".to_string(), Some("true".to_string())),
        ]
    );
}

#[tokio::test]
async fn png_never_reaches_the_network() {
    let server = spawn_server(CannedService::ok("{}")).await;
    let transport = Arc::new(Counting {
        inner: local_transport(&server.base_url),
        submissions: AtomicUsize::new(0),
    });
    let widget = UploadWidget::new(transport.clone());

    let state = widget
        .select_file(SelectedFile::new("scan.png", "image/png", vec![0x89, b'P']))
        .await;

    assert_eq!(
        state,
        WidgetState::Error {
            message: CLIENT_TYPE_MESSAGE.to_string()
        }
    );
    assert_eq!(transport.submissions.load(Ordering::SeqCst), 0);
    assert_eq!(server.extractor.calls(), 0);
    assert_eq!(server.service.calls(), 0);
}

#[tokio::test]
async fn rejection_then_override() {
    let reply = json!({
        "is_legal_contract": false,
        "score": 4,
        "summary": "Scored as requested.",
        "risks": ["Vague scope"]
    });
    let server = spawn_server(CannedService::ok(&reply.to_string())).await;
    let widget = UploadWidget::new(Arc::new(local_transport(&server.base_url)));

    let state = widget.select_file(pdf()).await;
    assert_eq!(state, WidgetState::WaitingUserConfirmation { file: pdf() });

    let state = widget.confirm_anyway().await;
    assert!(
        matches!(state, WidgetState::Complete { ref result } if result.is_contract && result.risk_score == 4),
        "got {state:?}"
    );
    let requests = server.service.requests.lock().unwrap();
    assert_eq!(
        requests.iter().map(|r| r.skip_gatekeeper).collect::<Vec<_>>(),
        vec![false, true]
    );
}

#[tokio::test]
async fn remote_failure_surfaces_in_widget() {
    let server = spawn_server(CannedService::failing(RemoteServiceError::Request(
        "error sending request for url (https://api.openai.com/v1/chat/completions)".into(),
    )))
    .await;
    let widget = UploadWidget::new(Arc::new(local_transport(&server.base_url)));

    let state = widget.select_file(pdf()).await;

    assert_eq!(
        state,
        WidgetState::Error {
            message: "error sending request for url (https://api.openai.com/v1/chat/completions)"
                .into()
        }
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let widget = UploadWidget::new(Arc::new(local_transport(&format!("http://{addr}"))));
    let state = widget.select_file(pdf()).await;

    match state {
        WidgetState::Error { message } => assert!(message.starts_with("Network error"), "{message}"),
        other => panic!("expected Error, got {other:?}"),
    }
}
