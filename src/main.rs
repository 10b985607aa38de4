//! Form guard CLI.
//!
//! Scores recorded form-fill sessions and prints one result per recording.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_form_guard::replay::{replay, SessionRecording};
use zentinel_form_guard::{FormGuardConfig, Scorer};

#[derive(Parser, Debug)]
#[command(name = "zentinel-form-guard")]
#[command(author, version, about = "Behavioral bot scoring for form submissions")]
struct Args {
    /// Recorded sessions to score (JSON or YAML)
    #[arg(required = true)]
    recordings: Vec<PathBuf>,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print results
    #[arg(long)]
    pretty: bool,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    // Results go to stdout; keep logs on stderr.
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, &args.log_level);

    let config = match &args.config {
        Some(path) => FormGuardConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FormGuardConfig::default(),
    };

    let scorer = Arc::new(Scorer::new(&config)?);
    info!(
        threshold = scorer.bot_threshold(),
        max_score = scorer.weights().max_score(),
        "Scorer ready"
    );

    for path in &args.recordings {
        let recording = SessionRecording::from_path(path)?;
        let result = replay(Arc::clone(&scorer), &recording);

        info!(
            recording = %path.display(),
            score = result.score,
            is_bot = result.is_bot,
            "Recording scored"
        );

        let output = if args.pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{output}");
    }

    Ok(())
}
