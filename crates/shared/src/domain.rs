use serde::{Deserialize, Serialize};

/// Only media type the extraction service accepts for report uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Size ceiling advertised to the user. Advisory only; selection does not
/// enforce it.
pub const ADVERTISED_MAX_REPORT_BYTES: u64 = 50 * 1024 * 1024;

/// Remote model tier used by the extraction service. The wire identifiers
/// are the model names the service expects in the `model` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    #[default]
    #[serde(rename = "gemini-2.0-flash")]
    Fast,
    #[serde(rename = "gemini-2.0-pro")]
    Thorough,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 2] = [ProcessingMode::Fast, ProcessingMode::Thorough];

    pub fn as_model_id(&self) -> &'static str {
        match self {
            ProcessingMode::Fast => "gemini-2.0-flash",
            ProcessingMode::Thorough => "gemini-2.0-pro",
        }
    }

    pub fn from_model_id(model_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_model_id() == model_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded | SubmissionState::Failed)
    }
}

/// Opaque URL pointing at the extracted result, usable directly as a
/// download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReference(pub String);
