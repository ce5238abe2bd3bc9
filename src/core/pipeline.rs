use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::{LogBatch, ScoreReport};
use crate::detection::ThreatEngine;
use crate::input::{ErrorReport, InputError};

/// One loaded input travelling to the engine.
#[derive(Debug)]
pub struct BatchJob {
    /// Submission position, used to restore input order downstream.
    pub index: usize,
    pub source: String,
    pub batch: Result<Option<LogBatch>, InputError>,
}

/// Messages from pipeline to output.
#[derive(Debug)]
pub enum PipelineOutput {
    Scored {
        index: usize,
        source: String,
        report: ScoreReport,
    },
    Rejected {
        index: usize,
        source: String,
        error: InputError,
    },
}

impl PipelineOutput {
    pub fn index(&self) -> usize {
        match self {
            PipelineOutput::Scored { index, .. } | PipelineOutput::Rejected { index, .. } => *index,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, PipelineOutput::Rejected { .. })
    }

    fn entry(&self) -> OutputEntry<'_> {
        match self {
            PipelineOutput::Scored { source, report, .. } => OutputEntry::Scored {
                input: source,
                report,
            },
            PipelineOutput::Rejected { source, error, .. } => OutputEntry::Rejected {
                input: source,
                error: error.to_report(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutputEntry<'a> {
    Scored {
        input: &'a str,
        #[serde(flatten)]
        report: &'a ScoreReport,
    },
    Rejected {
        input: &'a str,
        #[serde(flatten)]
        error: ErrorReport,
    },
}

/// Run the pipeline: receive loaded batches, score them, forward the results.
pub async fn run_pipeline(
    mut rx: mpsc::UnboundedReceiver<BatchJob>,
    out_tx: mpsc::UnboundedSender<PipelineOutput>,
    engine: ThreatEngine,
) {
    let mut scored: u64 = 0;
    let mut rejected: u64 = 0;

    debug!("Pipeline started, waiting for batches...");

    while let Some(job) = rx.recv().await {
        let BatchJob {
            index,
            source,
            batch,
        } = job;

        let output = match batch {
            Ok(Some(batch)) => {
                debug!(source = %source, records = batch.len(), "Scoring batch");
                scored += 1;
                PipelineOutput::Scored {
                    index,
                    source,
                    report: engine.evaluate(&batch),
                }
            }
            Ok(None) => {
                debug!(source = %source, "No log entries, reporting safe");
                scored += 1;
                PipelineOutput::Scored {
                    index,
                    source,
                    report: ScoreReport::safe(),
                }
            }
            Err(error) => {
                warn!(source = %source, "Rejected input: {error}");
                rejected += 1;
                PipelineOutput::Rejected {
                    index,
                    source,
                    error,
                }
            }
        };

        if out_tx.send(output).is_err() {
            info!("Output channel closed, stopping pipeline");
            break;
        }
    }

    debug!("Pipeline shutting down after {scored} scored, {rejected} rejected");
}

/// Render a single output the way the one-input CLI prints it: the bare
/// report, or the error object. The error object is always one line.
pub fn render_single(output: &PipelineOutput, pretty: bool) -> serde_json::Result<String> {
    match output {
        PipelineOutput::Scored { report, .. } => to_json(report, pretty),
        PipelineOutput::Rejected { error, .. } => to_json(&error.to_report(), false),
    }
}

/// Render many outputs as a JSON array tagged with their input names.
pub fn render_many(outputs: &[PipelineOutput], pretty: bool) -> serde_json::Result<String> {
    let entries: Vec<OutputEntry<'_>> = outputs.iter().map(PipelineOutput::entry).collect();
    to_json(&entries, pretty)
}

/// Output stream a rendered run belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// What the CLI prints once every input has been through the pipeline.
#[derive(Debug)]
pub struct Rendered {
    pub stream: Stream,
    pub text: String,
    /// At least one input was rejected.
    pub failed: bool,
}

/// Restore submission order and decide what is printed where.
///
/// A single input prints its bare report on stdout, or its error object on
/// stderr. Several inputs always print one array on stdout.
pub fn finish(mut outputs: Vec<PipelineOutput>, pretty: bool) -> serde_json::Result<Rendered> {
    outputs.sort_by_key(PipelineOutput::index);
    let failed = outputs.iter().any(PipelineOutput::is_rejected);

    let (stream, text) = match outputs.as_slice() {
        [single] if single.is_rejected() => (Stream::Stderr, render_single(single, pretty)?),
        [single] => (Stream::Stdout, render_single(single, pretty)?),
        _ => (Stream::Stdout, render_many(&outputs, pretty)?),
    };

    Ok(Rendered {
        stream,
        text,
        failed,
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
