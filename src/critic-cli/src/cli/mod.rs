//! Command-line interface: argument parsing and command dispatch.

pub mod args;
pub mod handlers;
pub mod styles;

pub use args::{
    Cli, ColorMode, Commands, CompletionCommand, ConfigCommand, ConfigOverrides, HistoryCommand,
    LogLevel, PreviewCommand, ReviewCommand, TuiCommand,
};
pub use handlers::{CliContext, dispatch_command};
pub use styles::{AFTER_HELP, get_styles};
