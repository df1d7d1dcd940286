//! Drives commands through an [`IntentProcessor`]

use crate::cli::PipelineArgs;
use crate::report::CommandReport;
use intentline_engine::{ExecutionBackend, IntentProcessor, PipelineConfig};
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

/// Build a processor from CLI options
pub fn build_processor(
    args: &PipelineArgs,
    backend: Option<Arc<dyn ExecutionBackend>>,
) -> anyhow::Result<IntentProcessor> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(concurrency) = args.concurrency {
        config.scheduler.concurrency = concurrency;
    }

    let mut builder = IntentProcessor::builder().config(config);
    if let Some(backend) = backend {
        builder = builder.backend(backend);
    }
    Ok(builder.build()?)
}

/// Commands from the argument list, or non-blank lines of `input` when none were given
pub fn read_commands(args: Vec<String>, input: impl BufRead) -> std::io::Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args);
    }

    let mut commands = Vec::new();
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            commands.push(trimmed.to_string());
        }
    }
    Ok(commands)
}

/// Queue every command for classification and dispatch, then collect reports in input order
pub async fn run_commands(
    processor: &IntentProcessor,
    commands: &[String],
    priority: Option<i32>,
    session: Option<&str>,
) -> anyhow::Result<Vec<CommandReport>> {
    let handles = commands
        .iter()
        .map(|text| processor.queue_process_and_dispatch(text.clone(), priority))
        .collect::<Result<Vec<_>, _>>()?;

    info!(queued = handles.len(), "Commands queued");

    let mut reports = Vec::with_capacity(handles.len());
    for (text, handle) in commands.iter().zip(handles) {
        let outcome = handle.await?;

        if !outcome.success() {
            warn!(text = %text, error = ?outcome.dispatch.error, "Command failed");
        }

        if let Some(session) = session {
            let intent_id = outcome.dispatch.intent.id;
            if let Err(e) = processor.store_in_session(&intent_id, session).await {
                warn!(%intent_id, session, error = %e, "Failed to store intent in session");
            }
        }

        reports.push(CommandReport::from_outcome(text.as_str(), &outcome));
    }

    Ok(reports)
}

/// Classify commands without touching the backend
pub fn classify_commands(
    processor: &IntentProcessor,
    commands: &[String],
    priority: Option<i32>,
) -> anyhow::Result<Vec<CommandReport>> {
    commands
        .iter()
        .map(|text| {
            let result = processor.process_text(text, priority)?;
            Ok(CommandReport::from_classification(text.as_str(), &result))
        })
        .collect()
}
