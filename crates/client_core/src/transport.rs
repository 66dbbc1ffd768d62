//! HTTP seam between the controller and the extraction service.

use async_trait::async_trait;
use reqwest::{multipart, Client};
use shared::{
    domain::ProcessingMode,
    error::ExtractionError,
    protocol::{ExtractResponse, MODEL_FIELD, REPORT_FIELD},
};
use url::Url;

/// Everything a single submission carries, captured by value when the
/// submission begins so later selection changes cannot touch it.
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    pub filename: String,
    pub media_type: String,
    pub content: Vec<u8>,
    pub mode: ProcessingMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReceipt {
    pub download_url: String,
}

#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn submit_report(
        &self,
        submission: ReportSubmission,
    ) -> Result<ExtractionReceipt, ExtractionError>;
}

/// Production transport: one multipart POST per submission against the
/// configured endpoint.
pub struct HttpExtractionService {
    http: Client,
    endpoint: Url,
}

impl HttpExtractionService {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionService {
    async fn submit_report(
        &self,
        submission: ReportSubmission,
    ) -> Result<ExtractionReceipt, ExtractionError> {
        let report = multipart::Part::bytes(submission.content)
            .file_name(submission.filename)
            .mime_str(&submission.media_type)
            .map_err(|err| ExtractionError::Transport(err.to_string()))?;
        let form = multipart::Form::new()
            .part(REPORT_FIELD, report)
            .text(MODEL_FIELD, submission.mode.as_model_id());

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| ExtractionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty());
            let message = match body {
                Some(body) => body,
                None => format!("extraction service returned status {}", status.as_u16()),
            };
            return Err(ExtractionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ExtractResponse = response
            .json()
            .await
            .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;

        Ok(ExtractionReceipt {
            download_url: payload.pdf_url,
        })
    }
}
