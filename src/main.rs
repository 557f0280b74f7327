//! Library Desk terminal client
//!
//! A chat front-end for the library desk agent: send turns, browse past
//! sessions, and reopen them.

mod backend;
mod config;
mod format;
mod runtime;
mod state_machine;
mod title;
mod tui;
mod view;

use backend::{ChatBackend, HttpBackend, LoggingBackend};
use config::ClientConfig;
use runtime::ConversationController;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env();

    // The terminal belongs to the UI, so logs go to a file
    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "desk_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(&config))
}

async fn run(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = HttpBackend::new(&config.api_url, config.request_timeout)?;
    let mut controller = ConversationController::new(LoggingBackend::new(backend));
    tracing::info!(
        api_url = %controller.backend().base_url(),
        timeout_secs = ?config.request_timeout.map(|t| t.as_secs()),
        "Library desk client starting"
    );

    let mut terminal = tui::setup_terminal()?;
    let result = tui::run(&mut terminal, &mut controller).await;
    tui::restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Terminal UI failed");
    }
    result?;
    Ok(())
}
