//! How the widget reaches the analysis endpoint.

use super::state::SelectedFile;
use crate::result::{AnalysisResult, ErrorBody};
use crate::server::RISK_ASSESSMENT_PATH;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;

/// A submission that did not produce a result.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The endpoint answered with an error body; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),

    /// The request never got an answer (connection refused, reset, …).
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with something that is not a known body.
    #[error("Unexpected response (HTTP {status}): {detail}")]
    UnexpectedResponse { status: u16, detail: String },
}

/// Sends one file to the analysis endpoint.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn submit(
        &self,
        file: &SelectedFile,
        skip_gatekeeper: bool,
    ) -> Result<AnalysisResult, TransportError>;
}

/// [`AnalysisTransport`] over HTTP multipart.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Target the endpoint under `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RISK_ASSESSMENT_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn submit(
        &self,
        file: &SelectedFile,
        skip_gatekeeper: bool,
    ) -> Result<AnalysisResult, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if skip_gatekeeper {
            form = form.text("skip_gatekeeper", "true");
        }

        debug!("POST {} ({} bytes)", self.endpoint, file.bytes.len());
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str::<AnalysisResult>(&body).map_err(|e| {
                TransportError::UnexpectedResponse {
                    status: status.as_u16(),
                    detail: e.to_string(),
                }
            });
        }

        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => Err(TransportError::Rejected(err.error)),
            Err(_) => Err(TransportError::UnexpectedResponse {
                status: status.as_u16(),
                detail: body.chars().take(200).collect(),
            }),
        }
    }
}
