//! HTTP surface for the [`Analyzer`].
//!
//! ```text
//! POST /api/risk-assessment   multipart: file, skip_gatekeeper
//!   200 → AnalysisResult
//!   400 / 500 → { "error": "…" }
//! GET  /health
//! ```
//!
//! The handler holds no state of its own. If the client disconnects, axum
//! drops the handler future and with it any in-flight reasoning call.

use crate::analyze::Analyzer;
use crate::document::{RawUpload, UploadRequest};
use crate::error::{AnalysisError, ErrorCategory};
use crate::result::ErrorBody;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Route of the analysis endpoint.
pub const RISK_ASSESSMENT_PATH: &str = "/api/risk-assessment";

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `127.0.0.1`.
    pub host: String,
    /// TCP port. Default: 8080.
    pub port: u16,
    /// Largest accepted request body in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

/// Build the application router.
pub fn router(analyzer: Arc<Analyzer>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(RISK_ASSESSMENT_PATH, post(risk_assessment))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { analyzer })
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(config: ServerConfig, analyzer: Arc<Analyzer>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(analyzer, config.max_upload_bytes);
    let listener = TcpListener::bind(config.addr()).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn risk_assessment(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let redact = state.analyzer.config().redact_upstream_errors;

    // The credential check outranks anything wrong with the form.
    if let Err(e) = state.analyzer.service() {
        return ApiError::new(e, redact).into_response();
    }

    let request = match multipart {
        Ok(form) => read_form(form).await,
        Err(rejection) => {
            debug!("Request is not a multipart form: {}", rejection.body_text());
            Err(AnalysisError::MissingFile)
        }
    };

    let outcome = match request {
        Ok(request) => state.analyzer.analyze(request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => ApiError::new(e, redact).into_response(),
    }
}

/// Collect the `file` and `skip_gatekeeper` fields; anything else is ignored.
async fn read_form(mut form: Multipart) -> Result<UploadRequest, AnalysisError> {
    let mut request = UploadRequest::default();

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| AnalysisError::InvalidUpload(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let media_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AnalysisError::InvalidUpload(e.body_text()))?;
                request.file = Some(RawUpload {
                    bytes: bytes.to_vec(),
                    media_type,
                    file_name,
                });
            }
            Some("skip_gatekeeper") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AnalysisError::InvalidUpload(e.body_text()))?;
                request.skip_gatekeeper = value.trim().eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    Ok(request)
}

/// An [`AnalysisError`] on its way to the client.
pub struct ApiError {
    error: AnalysisError,
    redact_upstream: bool,
}

impl ApiError {
    pub fn new(error: AnalysisError, redact_upstream: bool) -> Self {
        Self {
            error,
            redact_upstream,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let category = self.error.category();
        match (&self.error, category) {
            (AnalysisError::NotConfigured { hint }, _) => error!("Analysis unavailable: {}", hint),
            (e, ErrorCategory::Server) => error!("Analysis failed: {}", e),
            (e, ErrorCategory::Client) => warn!("Analysis rejected: {}", e),
        }
        let status = StatusCode::from_u16(category.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.error.client_message(self.redact_upstream),
        };
        (status, Json(body)).into_response()
    }
}
