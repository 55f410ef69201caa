//! Replays recorded fragment-swap response events through the error notifier.
//!
//! Reads JSON lines from stdin (or `--input`), dispatches each one on a
//! document with the notifier listening, and renders notifications on the
//! terminal.

mod replay;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fragment_notify::{Document, ErrorNotifier, NotifierConfig, TerminalPresenter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::replay::{parse_line, CountingPresenter};

#[derive(Parser)]
#[command(name = "fragment-notify")]
#[command(about = "Replay fragment-swap response events through the error notifier")]
struct Cli {
    /// JSON-lines file to replay (defaults to stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Event name to listen on
    #[arg(long)]
    event: Option<String>,

    /// Status code that triggers a notification
    #[arg(long)]
    status: Option<u16>,

    /// Message template (`{status}` and `{path}` are substituted)
    #[arg(long)]
    message: Option<String>,

    /// Show transient toasts instead of modal notifications
    #[arg(long)]
    toast: bool,
}

impl Cli {
    fn apply(&self, mut config: NotifierConfig) -> NotifierConfig {
        if let Some(event) = &self.event {
            config = config.with_event_name(event.clone());
        }
        if let Some(status) = self.status {
            config = config.with_target_status(status);
        }
        if let Some(message) = &self.message {
            config = config.with_message(message.clone());
        }
        if self.toast {
            config = config.with_blocking(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so notifications own stdout)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fragment_notify=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let config = cli.apply(NotifierConfig::from_env()?);
    config.validate().context("invalid notifier configuration")?;
    let event_name = config.event_name.clone();

    let document = Document::new();
    let presenter = Arc::new(CountingPresenter::new(TerminalPresenter::stdout()));
    ErrorNotifier::initialize(&document, config, presenter.clone())
        .context("Failed to initialize error notifier")?;

    let dispatched = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            replay(BufReader::new(file), &document, &event_name).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &document, &event_name).await?,
    };

    println!();
    println!(
        "{} {} events dispatched, {} notifications shown",
        "✓".bright_green(),
        dispatched,
        presenter.shown()
    );

    Ok(())
}

/// Dispatch every parseable line; malformed lines are logged and skipped.
async fn replay<R>(reader: R, document: &Document, default_event: &str) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut dispatched = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        match parse_line(&line, default_event) {
            Ok(Some(event)) => {
                document.dispatch(&event);
                dispatched += 1;
            }
            Ok(None) => {}
            Err(e) => warn!(line = line_no, error = %e, "skipping malformed replay line"),
        }
    }

    Ok(dispatched)
}
