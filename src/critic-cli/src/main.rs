//! Critic CLI - Main entry point.
//!
//! - Interactive TUI mode (default)
//! - One-shot `review` for scripts
//! - `preview`, `history`, `config` helpers
//! - Shell completions

use anyhow::{Context, Result};
use clap::Parser;
use critic_common::{AppDirs, CRITIC_HOME_ENV};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use critic_cli::cli::{Cli, ColorMode, LogLevel, dispatch_command};
use critic_cli::styled_output::print_error;

const LOG_FILE: &str = "critic.log";

/// Keeps the non-blocking log writer flushing until dropped.
struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Set up debug file logging that writes ALL trace-level logs to ./debug.txt.
fn setup_debug_file_logging() -> Result<LogGuard> {
    let debug_file_path = std::env::current_dir()?.join("debug.txt");

    let file = std::fs::File::create(&debug_file_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create debug.txt: {}. Check write permissions.",
            e
        )
    })?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("trace"))
        .with(file_layer)
        .init();

    eprintln!(
        "Debug mode enabled: logging to {}",
        debug_file_path.display()
    );

    Ok(LogGuard { _guard: guard })
}

/// The TUI owns stdout, so its logs go to `<home>/logs/critic.log`.
fn setup_tui_file_logging(dirs: &AppDirs, filter: &str) -> Result<LogGuard> {
    dirs.ensure_dirs().with_context(|| {
        format!(
            "Cannot create {}. Set {} to a writable directory.",
            dirs.logs_dir.display(),
            CRITIC_HOME_ENV
        )
    })?;

    let appender = tracing_appender::rolling::never(&dirs.logs_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(file_layer)
        .init();

    Ok(LogGuard { _guard: guard })
}

fn filter_for(level: LogLevel) -> String {
    let level = level.as_filter_str();
    if std::env::var("RUST_LOG").is_ok() {
        ["critic_cli", "critic_review", "critic_common", "critic_tui"]
            .iter()
            .fold("error".to_string(), |filter, target| {
                format!("{filter},{target}={level}")
            })
    } else {
        level.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // SAFETY: Environment variable mutations happen early before threads spawn
    match cli.color {
        ColorMode::Never => unsafe { std::env::set_var("NO_COLOR", "1") },
        ColorMode::Always => unsafe { std::env::remove_var("NO_COLOR") },
        ColorMode::Auto => {}
    }

    let dirs = AppDirs::new().with_context(|| {
        format!("Could not determine a home directory. Set {CRITIC_HOME_ENV}.")
    })?;

    let env_level = std::env::var("CRITIC_LOG_LEVEL").ok();
    let filter = filter_for(cli.effective_log_level(env_level.as_deref()));

    let log_guard = if cli.debug {
        Some(setup_debug_file_logging()?)
    } else if cli.is_tui_mode() {
        Some(setup_tui_file_logging(&dirs, &filter)?)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter.as_str())
            .with_writer(std::io::stderr)
            .init();
        None
    };

    if let Err(e) = dispatch_command(cli, dirs).await {
        tracing::error!(error = %e, "Command failed");
        drop(log_guard);
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
