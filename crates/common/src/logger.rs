use crate::error::SearchError;
use std::path::Path;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Transport crates that log every request at debug level
const NOISY_TARGETS: &[&str] = &["hyper", "h2", "reqwest", "rustls", "redis", "actix_server"];

/// Build the filter used by every layer.
///
/// `RUST_LOG` takes precedence. Otherwise `log_level` applies to our crates
/// and the transport crates are capped at `warn`.
pub fn build_env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)))
}

fn default_directives(log_level: &str) -> String {
    let level = normalize_level(log_level);
    let mut directives = vec![level.to_string()];
    directives.extend(NOISY_TARGETS.iter().map(|t| format!("{}=warn", t)));
    directives.join(",")
}

fn normalize_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => {
            eprintln!("Invalid log level '{}', defaulting to info", level);
            "info"
        }
    }
}

/// Initialize logging for the long-running server
///
/// Console plus an append-only file `postsearch.log` in `log_dir`.
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), SearchError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        SearchError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let log_file_path = log_dir.join("postsearch.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            SearchError::config(format!(
                "Failed to open log file {}: {}",
                log_file_path.display(),
                e
            ))
        })?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(build_env_filter(log_level));

    let file_layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(build_env_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SearchError::config(format!("Logging already initialized: {}", e)))?;

    tracing::info!(
        "Logging initialized: level={}, log_file={}",
        log_level,
        log_file_path.display()
    );

    Ok(())
}

/// Console-only logging for one-shot commands (query, load)
///
/// Writes to stderr so stdout carries only command output.
pub fn setup_console_logging(log_level: &str) -> Result<(), SearchError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(build_env_filter(log_level))
        .try_init()
        .map_err(|e| SearchError::config(format!("Logging already initialized: {}", e)))?;

    Ok(())
}
