//! CLI argument structures and parsing.

use clap::{Args, Parser, Subcommand};
use critic_common::{CriticConfig, ThemeName};
use std::path::PathBuf;

use super::styles::{AFTER_HELP, get_styles};

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Color output mode for CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if output is a terminal
    #[default]
    Auto,
    /// Always output with colors
    Always,
    /// Never output with colors
    Never,
}

/// Critic - AI code review from the terminal
///
/// If no subcommand is specified, starts the interactive TUI.
#[derive(Parser, Debug)]
#[command(name = "critic")]
#[command(author, version)]
#[command(about = "Critic - AI code review from the terminal", long_about = None)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    #[clap(flatten)]
    pub overrides: ConfigOverrides,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Enable trace-level logging for debugging
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// Log verbosity for subcommands
    #[arg(long = "log-level", global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Write trace-level logs to ./debug.txt
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    /// Control color output: auto (default), always, or never
    #[arg(long = "color", global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether this invocation opens the interactive UI.
    pub fn is_tui_mode(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui(_)))
    }

    /// Resolve the log level: `--trace`, then `--verbose`, then
    /// `CRITIC_LOG_LEVEL` (passed as `env_level`), then `--log-level`.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if let Some(level) = env_level.and_then(LogLevel::from_str_loose) {
            level
        } else {
            self.log_level
        }
    }
}

/// Flags that override the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Review service upload URL
    #[arg(long = "endpoint", global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Starting theme (cyan or purple)
    #[arg(long = "theme", global = true, value_name = "THEME")]
    pub theme: Option<ThemeName>,

    /// Mask API keys and other obvious secrets before uploading
    #[arg(long = "redact-secrets", global = true)]
    pub redact_secrets: bool,

    /// Give up on a review after this many seconds
    #[arg(long = "timeout", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ConfigOverrides {
    /// Apply the flags on top of a loaded configuration.
    pub fn apply(&self, config: &mut CriticConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if self.redact_secrets {
            config.redact_secrets = true;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = Some(timeout);
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive reviewer
    Tui(TuiCommand),

    /// Submit a file for review and print the feedback
    Review(ReviewCommand),

    /// Print the first lines of a file as they would be previewed
    Preview(PreviewCommand),

    /// List recently reviewed files
    History(HistoryCommand),

    /// Show resolved paths and configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),
}

/// TUI command.
#[derive(Args, Debug, Default)]
pub struct TuiCommand {
    /// File to select on startup
    pub file: Option<PathBuf>,
}

/// Review command.
#[derive(Args, Debug)]
pub struct ReviewCommand {
    /// Source file to review
    pub file: PathBuf,

    /// Print the sections as JSON
    #[arg(long = "json", conflicts_with = "raw")]
    pub json: bool,

    /// Print the feedback exactly as returned
    #[arg(long = "raw")]
    pub raw: bool,

    /// Copy the body of section N (1-based) to the clipboard
    #[arg(long = "copy", value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub copy: Option<u64>,
}

/// Preview command.
#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// File to preview
    pub file: PathBuf,
}

/// History command.
#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Show at most this many entries
    #[arg(long = "limit", short = 'n')]
    pub limit: Option<usize>,
}

/// Config command.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
}

/// Completion command.
#[derive(Args, Debug)]
pub struct CompletionCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
