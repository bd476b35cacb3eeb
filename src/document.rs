//! Uploaded documents and the two accepted formats.
//!
//! The media-type allow-list lives here so the client widget and the endpoint
//! reject exactly the same uploads.

use crate::error::AnalysisError;
use std::fmt;

/// Declared media type of a PDF upload.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Declared media type of an OOXML word-processing upload.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two document formats the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Match a declared media type against the allow-list.
    ///
    /// Parameters (`; charset=…`) and letter case are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MEDIA_TYPE => Some(DocumentKind::Pdf),
            DOCX_MEDIA_TYPE => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    /// Guess the kind from a file name's extension. Used by the CLI, which
    /// has no declared media type to go on.
    pub fn from_extension(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    /// Canonical media type for this kind.
    pub fn media_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MEDIA_TYPE,
            DocumentKind::Docx => DOCX_MEDIA_TYPE,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("PDF"),
            DocumentKind::Docx => f.write_str("DOCX"),
        }
    }
}

/// A file as it arrives from the client, before any validation.
#[derive(Debug, Clone, Default)]
pub struct RawUpload {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
    pub file_name: Option<String>,
}

/// One analysis request as received by the endpoint.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// The `file` form field, if present.
    pub file: Option<RawUpload>,
    /// The `skip_gatekeeper` form field.
    pub skip_gatekeeper: bool,
}

/// A validated upload of one of the supported formats.
#[derive(Clone)]
pub struct UploadedDocument {
    kind: DocumentKind,
    bytes: Vec<u8>,
    file_name: Option<String>,
}

impl UploadedDocument {
    /// Validate the declared media type and wrap the payload.
    pub fn from_upload(upload: RawUpload) -> Result<Self, AnalysisError> {
        let kind = upload
            .media_type
            .as_deref()
            .and_then(DocumentKind::from_media_type)
            .ok_or_else(|| AnalysisError::UnsupportedMediaType {
                media_type: upload.media_type.clone(),
            })?;
        Ok(Self {
            kind,
            bytes: upload.bytes,
            file_name: upload.file_name,
        })
    }

    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            bytes,
            file_name: None,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Client-supplied file name, or `"upload"` when the form gave none.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}
