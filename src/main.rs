use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use aegiswarm::config::Config;
use aegiswarm::core::pipeline::{self, BatchJob, PipelineOutput, Stream};
use aegiswarm::detection::ThreatEngine;
use aegiswarm::input;

const DEFAULT_CONFIG_PATH: &str = "aegiswarm.toml";

#[derive(Parser, Debug)]
#[command(name = "aegiswarm")]
#[command(version, about = "Score security log batches with six heuristic detectors", long_about = None)]
struct Cli {
    /// Input JSON log file path ("-" reads stdin). Repeat to score several files.
    #[arg(short, long = "input", value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Enable debug logging of individual detector hits
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(msg) = check_inputs(&cli.inputs) {
        Cli::command().error(ErrorKind::ArgumentConflict, msg).exit();
    }

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            let report = serde_json::json!({
                "error": "Analysis failed",
                "message": format!("{e:#}"),
            });
            eprintln!("{report}");
            ExitCode::FAILURE
        }
    }
}

fn check_inputs(inputs: &[PathBuf]) -> Result<(), &'static str> {
    if input::stdin_inputs(inputs) > 1 {
        return Err("stdin (\"-\") can be given to --input only once");
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let directive: Directive = format!("aegiswarm={level}")
        .parse()
        .context("invalid log directive")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&cli.config);
    let pretty = config.output.pretty && !cli.compact;
    let engine = ThreatEngine::new(&config.engine);

    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let pipeline_task = tokio::spawn(pipeline::run_pipeline(job_rx, out_tx, engine));

    let mut loaders = JoinSet::new();
    for (index, path) in cli.inputs.iter().cloned().enumerate() {
        let job_tx = job_tx.clone();
        loaders.spawn(async move {
            let batch = input::load(&path).await;
            let job = BatchJob {
                index,
                source: path.display().to_string(),
                batch,
            };
            if job_tx.send(job).is_err() {
                tracing::warn!("Pipeline closed before {} was submitted", path.display());
            }
        });
    }
    drop(job_tx);

    let mut outputs: Vec<PipelineOutput> = Vec::with_capacity(cli.inputs.len());
    while let Some(output) = out_rx.recv().await {
        outputs.push(output);
    }
    while let Some(joined) = loaders.join_next().await {
        joined.context("input loader panicked")?;
    }
    pipeline_task.await.context("pipeline task panicked")?;

    let rendered = pipeline::finish(outputs, pretty)?;
    match rendered.stream {
        Stream::Stdout => write_stdout(&rendered.text)?,
        Stream::Stderr => eprintln!("{}", rendered.text),
    }

    Ok(if rendered.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("failed to write report")?;
    stdout.flush().context("failed to flush stdout")
}
