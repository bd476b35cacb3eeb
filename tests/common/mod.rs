//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use contract_risk::pipeline::extract::TextExtractor;
use contract_risk::pipeline::remote::{AnalysisRequest, ReasoningService};
use contract_risk::{ExtractionError, RemoteServiceError, UploadedDocument};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BOUNDARY: &str = "contract-risk-test-boundary";

/// Route library logs to the test harness; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Extractor that returns fixed text and counts calls.
pub struct FixedExtractor {
    pub text: String,
    pub calls: AtomicUsize,
}

impl FixedExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for FixedExtractor {
    fn extract(&self, _document: &UploadedDocument) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Reasoning service with a canned reply; records every request.
pub struct CannedService {
    pub reply: Result<String, RemoteServiceError>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<AnalysisRequest>>,
}

impl CannedService {
    pub fn ok(reply: &str) -> Self {
        Self::with(Ok(reply.to_string()))
    }

    pub fn failing(err: RemoteServiceError) -> Self {
        Self::with(Err(err))
    }

    fn with(reply: Result<String, RemoteServiceError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningService for CannedService {
    async fn assess(&self, request: &AnalysisRequest) -> Result<String, RemoteServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

/// A form file part: (field file name, content type, bytes).
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Encode a `multipart/form-data` body with [`BOUNDARY`].
pub fn multipart_body(file: Option<FilePart<'_>>, skip_gatekeeper: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(f) = file {
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            f.file_name, f.content_type
        )
        .unwrap();
        body.extend_from_slice(f.bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(skip) = skip_gatekeeper {
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"skip_gatekeeper\"\r\n\r\n{skip}\r\n"
        )
        .unwrap();
    }
    write!(body, "--{BOUNDARY}--\r\n").unwrap();
    body
}

/// Minimal DOCX archive around the given `<w:body>` content.
pub fn docx_with_body(body: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default();
    zip.start_file("word/document.xml", opts).unwrap();
    write!(
        zip,
        "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{body}</w:body></w:document>"
    )
    .unwrap();
    zip.finish().unwrap().into_inner()
}

/// Single-page PDF with one Helvetica text run; xref offsets are computed.
pub fn one_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    let size = objects.len() + 1;
    let mut tail = format!("xref\n0 {size}\n0000000000 65535 f \n");
    for offset in offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}

pub fn contract_reply(score: serde_json::Value, risks: &[&str]) -> String {
    serde_json::json!({
        "is_legal_contract": true,
        "score": score,
        "interpretation": "ignored",
        "summary": "The indemnity clause is one-sided.",
        "risks": risks,
    })
    .to_string()
}
