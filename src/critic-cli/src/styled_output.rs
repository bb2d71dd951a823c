//! Styled CLI output.
//!
//! Status messages go to stderr so stdout stays clean for review output.
//! Colors are dropped when `NO_COLOR` is set or the stream is not a terminal.

use std::io::IsTerminal;

const SUCCESS: &str = "\x1b[38;2;0;245;212m"; // #00F5D4
const ERROR: &str = "\x1b[38;2;255;107;107m"; // #FF6B6B
const WARNING: &str = "\x1b[38;2;255;200;87m"; // #FFC857
const INFO: &str = "\x1b[38;2;72;202;228m"; // #48CAE4
const DIM: &str = "\x1b[38;2;130;154;177m"; // #829AB1
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn use_colors(stderr: bool) -> bool {
    let is_terminal = if stderr {
        std::io::stderr().is_terminal()
    } else {
        std::io::stdout().is_terminal()
    };
    !colors_disabled() && is_terminal
}

#[derive(Debug, Clone, Copy)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => SUCCESS,
            MessageType::Error => ERROR,
            MessageType::Warning => WARNING,
            MessageType::Info => INFO,
        }
    }
}

fn print_styled(msg_type: MessageType, message: &str) {
    if use_colors(true) {
        eprintln!(
            "{}{} {}{}",
            msg_type.color(),
            msg_type.icon(),
            message,
            RESET
        );
    } else {
        eprintln!("{} {}", msg_type.icon(), message);
    }
}

pub fn print_success(message: &str) {
    print_styled(MessageType::Success, message);
}

pub fn print_error(message: &str) {
    print_styled(MessageType::Error, message);
}

pub fn print_warning(message: &str) {
    print_styled(MessageType::Warning, message);
}

pub fn print_info(message: &str) {
    print_styled(MessageType::Info, message);
}

/// Bold accent text for stdout headings.
pub fn heading(text: &str) -> String {
    if use_colors(false) {
        format!("{BOLD}{INFO}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Dimmed text for stdout.
pub fn dim(text: &str) -> String {
    if use_colors(false) {
        format!("{DIM}{text}{RESET}")
    } else {
        text.to_string()
    }
}
