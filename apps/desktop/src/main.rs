use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{FileCandidate, UploadConfig, UploadController, UploadEvent};
use shared::{
    domain::{ProcessingMode, ADVERTISED_MAX_REPORT_BYTES},
    protocol::OutcomeResult,
};
use tracing::warn;
use url::Url;

mod config;

use config::load_settings;

/// Uploads a report PDF to the extraction service and prints the download
/// link for the generated summary.
#[derive(Parser, Debug)]
struct Args {
    /// Report PDF to upload.
    report: PathBuf,
    /// Extraction service endpoint; overrides extractor.toml and environment.
    #[arg(long)]
    endpoint: Option<String>,
    /// Model wire id: gemini-2.0-flash (fast) or gemini-2.0-pro (thorough).
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();

    let endpoint = args.endpoint.unwrap_or(settings.endpoint);
    let endpoint =
        Url::parse(&endpoint).with_context(|| format!("invalid endpoint url: {endpoint}"))?;
    let model_id = args.model.unwrap_or(settings.model);
    let Some(mode) = ProcessingMode::from_model_id(&model_id) else {
        bail!(
            "unknown model '{model_id}'; expected one of: gemini-2.0-flash, gemini-2.0-pro"
        );
    };

    let content = std::fs::read(&args.report)
        .with_context(|| format!("failed to read report {}", args.report.display()))?;
    if content.len() as u64 > ADVERTISED_MAX_REPORT_BYTES {
        warn!(
            size_bytes = content.len(),
            "report exceeds the advertised 50 MB ceiling; the service may reject it"
        );
    }
    let name = args
        .report
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("report.pdf")
        .to_string();
    let media_type = mime_guess::from_path(&args.report)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    let controller = UploadController::new(UploadConfig::new(endpoint));
    controller.set_processing_mode(mode).await;
    controller
        .select_file(Some(FileCandidate {
            name,
            media_type,
            content,
        }))
        .await;

    let snapshot = controller.snapshot().await;
    if snapshot.selected.is_none() {
        match snapshot
            .outcome
            .as_ref()
            .and_then(OutcomeResult::error_descriptor)
        {
            Some(descriptor) => bail!("{}", descriptor.message),
            None => bail!("selection was rejected"),
        }
    }

    let mut events = controller.subscribe_events();
    let render = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                UploadEvent::ProgressUpdated(progress) => println!("progress: {progress}%"),
                UploadEvent::SubmissionStateChanged(state) => println!("state: {state:?}"),
                _ => {}
            }
        }
    });

    controller.submit().await;
    render.abort();

    let snapshot = controller.snapshot().await;
    match snapshot.outcome {
        Some(OutcomeResult::Download(reference)) => {
            println!("download: {}", reference.0);
            Ok(())
        }
        Some(OutcomeResult::Error(descriptor)) => bail!("extraction failed: {}", descriptor.message),
        None => bail!("submission finished without an outcome"),
    }
}
