use std::{sync::Arc, time::Duration};

use shared::{
    domain::{DownloadReference, ProcessingMode, SubmissionState, PDF_MEDIA_TYPE},
    error::{ErrorDescriptor, ErrorKind},
    protocol::OutcomeResult,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use url::Url;

pub mod progress;
pub mod transport;

pub use progress::{FixedStepEstimator, ProgressEstimator, RandomWalkEstimator};
pub use transport::{ExtractionReceipt, ExtractionService, HttpExtractionService, ReportSubmission};

/// Fixed message surfaced whenever selection is rejected.
pub const INVALID_FILE_MESSAGE: &str = "Please select a valid PDF file";

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_PROGRESS_TICK: Duration = Duration::from_millis(500);
const DEFAULT_PROGRESS_CEILING: u8 = 90;
const DEFAULT_PROGRESS_COOLDOWN: Duration = Duration::from_secs(2);

/// File-like handle delivered by a picker or a drop event, before
/// validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

/// The accepted report. Content is shared so submission can capture it by
/// value without copying on every snapshot.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    pub content: Arc<[u8]>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: Url,
    pub default_mode: ProcessingMode,
    pub progress_tick: Duration,
    /// Highest value the synthetic ticker may reach while the response is
    /// outstanding. Clamped below 100 at construction.
    pub progress_ceiling: u8,
    pub progress_cooldown: Duration,
}

impl UploadConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            default_mode: ProcessingMode::default(),
            progress_tick: DEFAULT_PROGRESS_TICK,
            progress_ceiling: DEFAULT_PROGRESS_CEILING,
            progress_cooldown: DEFAULT_PROGRESS_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UploadEvent {
    FileAccepted { name: String, size_bytes: u64 },
    FileRejected { message: String },
    DragStateChanged { drag_over: bool },
    ModeChanged(ProcessingMode),
    SubmissionStateChanged(SubmissionState),
    ProgressUpdated(u8),
    SubmissionSucceeded { download: DownloadReference },
    SubmissionFailed { error: ErrorDescriptor },
}

/// Render-ready view of the controller state.
#[derive(Debug, Clone)]
pub struct UploadSnapshot {
    pub selected: Option<SelectedFile>,
    pub mode: ProcessingMode,
    pub submission: SubmissionState,
    pub progress: u8,
    pub drag_over: bool,
    pub outcome: Option<OutcomeResult>,
}

struct ControllerState {
    selected: Option<SelectedFile>,
    mode: ProcessingMode,
    submission: SubmissionState,
    progress: u8,
    drag_over: bool,
    outcome: Option<OutcomeResult>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

/// Owns the full upload-and-extraction workflow: selection, validation,
/// single-flight submission, synthetic progress, and the terminal outcome.
/// Presentation layers drive it through these operations and render from
/// [`UploadSnapshot`] and the event stream; they never mutate state
/// directly.
pub struct UploadController {
    config: UploadConfig,
    service: Arc<dyn ExtractionService>,
    estimator: Mutex<Box<dyn ProgressEstimator>>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<UploadEvent>,
}

impl UploadController {
    pub fn new(config: UploadConfig) -> Arc<Self> {
        let service = Arc::new(HttpExtractionService::new(config.endpoint.clone()));
        Self::new_with_dependencies(config, service, Box::new(RandomWalkEstimator))
    }

    pub fn new_with_dependencies(
        mut config: UploadConfig,
        service: Arc<dyn ExtractionService>,
        estimator: Box<dyn ProgressEstimator>,
    ) -> Arc<Self> {
        config.progress_ceiling = config.progress_ceiling.min(99);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(ControllerState {
                selected: None,
                mode: config.default_mode,
                submission: SubmissionState::Idle,
                progress: 0,
                drag_over: false,
                outcome: None,
                generation: 0,
                ticker: None,
            }),
            config,
            service,
            estimator: Mutex::new(estimator),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> UploadSnapshot {
        let inner = self.inner.lock().await;
        UploadSnapshot {
            selected: inner.selected.clone(),
            mode: inner.mode,
            submission: inner.submission,
            progress: inner.progress,
            drag_over: inner.drag_over,
            outcome: inner.outcome.clone(),
        }
    }

    /// Single entry point for both the picker and the drop path, so neither
    /// can bypass validation. `None` models a cancelled picker dialog.
    pub async fn select_file(&self, candidate: Option<FileCandidate>) {
        let mut inner = self.inner.lock().await;
        if inner.submission == SubmissionState::Submitting {
            debug!("upload: selection ignored while a submission is in flight");
            return;
        }

        inner.submission = SubmissionState::Validating;
        let _ = self
            .events
            .send(UploadEvent::SubmissionStateChanged(SubmissionState::Validating));

        match candidate {
            Some(candidate) if candidate.media_type == PDF_MEDIA_TYPE => {
                let size_bytes = candidate.content.len() as u64;
                info!(
                    file = %candidate.name,
                    size_bytes,
                    "upload: report selected"
                );
                inner.selected = Some(SelectedFile {
                    name: candidate.name.clone(),
                    size_bytes,
                    media_type: candidate.media_type,
                    content: candidate.content.into(),
                });
                inner.outcome = None;
                let _ = self.events.send(UploadEvent::FileAccepted {
                    name: candidate.name,
                    size_bytes,
                });
            }
            candidate => {
                warn!(
                    media_type = candidate.as_ref().map(|c| c.media_type.as_str()),
                    "upload: rejected selection without a pdf media type"
                );
                inner.selected = None;
                inner.outcome = Some(OutcomeResult::Error(ErrorDescriptor::new(
                    ErrorKind::Validation,
                    INVALID_FILE_MESSAGE,
                )));
                let _ = self.events.send(UploadEvent::FileRejected {
                    message: INVALID_FILE_MESSAGE.to_string(),
                });
            }
        }

        inner.submission = SubmissionState::Idle;
        let _ = self
            .events
            .send(UploadEvent::SubmissionStateChanged(SubmissionState::Idle));
    }

    pub async fn begin_drag(&self) {
        self.set_drag(true).await;
    }

    pub async fn end_drag(&self) {
        self.set_drag(false).await;
    }

    async fn set_drag(&self, drag_over: bool) {
        let mut inner = self.inner.lock().await;
        if inner.drag_over == drag_over {
            return;
        }
        inner.drag_over = drag_over;
        let _ = self.events.send(UploadEvent::DragStateChanged { drag_over });
    }

    pub async fn set_processing_mode(&self, mode: ProcessingMode) {
        let mut inner = self.inner.lock().await;
        if inner.mode == mode {
            return;
        }
        inner.mode = mode;
        debug!(model = mode.as_model_id(), "upload: processing mode changed");
        let _ = self.events.send(UploadEvent::ModeChanged(mode));
    }

    /// Wire-id variant for presentation layers holding raw identifiers.
    /// Identifiers outside the closed set are ignored.
    pub async fn set_processing_mode_id(&self, model_id: &str) {
        match ProcessingMode::from_model_id(model_id) {
            Some(mode) => self.set_processing_mode(mode).await,
            None => debug!(model_id, "upload: ignoring unknown processing mode"),
        }
    }

    /// Submits the selected report once. A no-op without a selection or
    /// while an earlier submission is still in flight, so rapid repeated
    /// invocations issue exactly one request.
    pub async fn submit(self: &Arc<Self>) {
        let (submission, generation) = {
            let mut inner = self.inner.lock().await;
            if inner.submission == SubmissionState::Submitting {
                debug!("upload: duplicate submit ignored while in flight");
                return;
            }
            let Some(file) = inner.selected.clone() else {
                debug!("upload: submit ignored without a selected report");
                return;
            };

            inner.generation += 1;
            let generation = inner.generation;
            inner.outcome = None;
            inner.progress = 0;
            inner.submission = SubmissionState::Submitting;
            let _ = self.events.send(UploadEvent::ProgressUpdated(0));
            let _ = self
                .events
                .send(UploadEvent::SubmissionStateChanged(SubmissionState::Submitting));

            let ticker = self.spawn_progress_ticker(generation);
            if let Some(previous) = inner.ticker.replace(ticker) {
                previous.abort();
            }

            (
                ReportSubmission {
                    filename: file.name.clone(),
                    media_type: file.media_type.clone(),
                    content: file.content.to_vec(),
                    mode: inner.mode,
                },
                generation,
            )
        };

        info!(
            file = %submission.filename,
            model = submission.mode.as_model_id(),
            "upload: submitting report"
        );
        let result = self.service.submit_report(submission).await;
        self.finish_submission(generation, result).await;
    }

    /// Clears the selection and outcome and returns to `Idle`. Invoked
    /// mid-flight it abandons the outstanding submission: the generation
    /// bump makes its eventual response arrive stale.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if inner.submission == SubmissionState::Submitting {
            inner.generation += 1;
            info!("upload: reset abandoned an in-flight submission");
        }
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        inner.selected = None;
        inner.outcome = None;
        inner.progress = 0;
        inner.submission = SubmissionState::Idle;
        let _ = self.events.send(UploadEvent::ProgressUpdated(0));
        let _ = self
            .events
            .send(UploadEvent::SubmissionStateChanged(SubmissionState::Idle));
    }

    async fn finish_submission(
        self: &Arc<Self>,
        generation: u64,
        result: Result<ExtractionReceipt, shared::error::ExtractionError>,
    ) {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("upload: dropping response from an abandoned submission");
            return;
        }
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }

        // Progress must read 100 before the terminal state becomes visible.
        inner.progress = 100;
        let _ = self.events.send(UploadEvent::ProgressUpdated(100));

        match result {
            Ok(receipt) => {
                info!(url = %receipt.download_url, "upload: extraction succeeded");
                let download = DownloadReference(receipt.download_url);
                inner.submission = SubmissionState::Succeeded;
                inner.outcome = Some(OutcomeResult::Download(download.clone()));
                let _ = self
                    .events
                    .send(UploadEvent::SubmissionStateChanged(SubmissionState::Succeeded));
                let _ = self.events.send(UploadEvent::SubmissionSucceeded { download });
            }
            Err(err) => {
                let error = ErrorDescriptor::from(err);
                warn!(
                    kind = ?error.kind,
                    "upload: extraction failed: {}",
                    error.message
                );
                inner.submission = SubmissionState::Failed;
                inner.outcome = Some(OutcomeResult::Error(error.clone()));
                let _ = self
                    .events
                    .send(UploadEvent::SubmissionStateChanged(SubmissionState::Failed));
                let _ = self.events.send(UploadEvent::SubmissionFailed { error });
            }
        }
        drop(inner);

        self.spawn_progress_cooldown(generation);
    }

    fn spawn_progress_ticker(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let tick = self.config.progress_tick;
        let ceiling = self.config.progress_ceiling;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                interval.tick().await;
                let increment = controller.estimator.lock().await.next_increment();
                let mut inner = controller.inner.lock().await;
                if inner.generation != generation
                    || inner.submission != SubmissionState::Submitting
                {
                    break;
                }
                let next = inner.progress.saturating_add(increment).min(ceiling);
                if next != inner.progress {
                    inner.progress = next;
                    let _ = controller.events.send(UploadEvent::ProgressUpdated(next));
                }
            }
        })
    }

    /// Arms the one-shot reset that returns the bar to zero after a terminal
    /// state, leaving the state and outcome untouched.
    fn spawn_progress_cooldown(self: &Arc<Self>, generation: u64) {
        let controller = Arc::clone(self);
        let cooldown = self.config.progress_cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            let mut inner = controller.inner.lock().await;
            if inner.generation != generation
                || inner.submission == SubmissionState::Submitting
            {
                return;
            }
            if inner.progress != 0 {
                inner.progress = 0;
                let _ = controller.events.send(UploadEvent::ProgressUpdated(0));
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
