use serde::{Deserialize, Serialize};

use crate::{domain::DownloadReference, error::ErrorDescriptor};

/// Multipart field carrying the report bytes.
pub const REPORT_FIELD: &str = "report";
/// Multipart field carrying the processing-mode wire identifier.
pub const MODEL_FIELD: &str = "model";

/// Success body returned by the extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(rename = "pdfUrl")]
    pub pdf_url: String,
}

/// Terminal result of a workflow run: a download link or a surfaced failure.
/// At most one is ever populated at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutcomeResult {
    Download(DownloadReference),
    Error(ErrorDescriptor),
}

impl OutcomeResult {
    pub fn download_reference(&self) -> Option<&DownloadReference> {
        match self {
            OutcomeResult::Download(reference) => Some(reference),
            OutcomeResult::Error(_) => None,
        }
    }

    pub fn error_descriptor(&self) -> Option<&ErrorDescriptor> {
        match self {
            OutcomeResult::Download(_) => None,
            OutcomeResult::Error(descriptor) => Some(descriptor),
        }
    }
}
