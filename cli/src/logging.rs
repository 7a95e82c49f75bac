//! Logging initialization: logs go only to file (or are dropped), never to the console.
//!
//! `RUST_LOG` sets the filter (default `info`). When `LOG_FILE` is set, logs are appended to
//! that file as plain text; otherwise they are dropped so stdout carries only the conversation.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper_util=off"));

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path, "shuttle logging to file");
        }
        _ => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).try_init()?;
        }
    }
    Ok(())
}
