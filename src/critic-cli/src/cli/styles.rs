//! CLI styling and formatting.
//!
//! Defines ANSI colors and formatting for the CLI help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme with cyan headers.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section with environment variables documentation.
pub const AFTER_HELP: &str = color_print::cstr!(
    r#"<cyan,bold>QUICK START</>
    <green,bold>critic</>                        Open the interactive reviewer
    <green,bold>critic tui</> <dim>src/main.py</>        Open with a file already selected
    <green,bold>critic review</> <dim>app.js</>          Review a file and print the sections
    <green,bold>critic review</> <dim>app.js --json</>   Sections as JSON
    <green,bold>critic history</>                Recently reviewed files

<cyan,bold>ENVIRONMENT VARIABLES</>
    <yellow>CRITIC_HOME</>          Override the data directory (default: ~/.critic)
    <yellow>CRITIC_CONFIG</>        Override the config file (default: $CRITIC_HOME/config.toml)
    <yellow>CRITIC_ENDPOINT</>      Review service upload URL
    <yellow>CRITIC_LOG_LEVEL</>     Log verbosity (error, warn, info, debug, trace)
    <yellow>NO_COLOR</>             Disable colored output

<cyan,bold>PATHS</>
    <dim>Config</>      ~/.critic/config.toml
    <dim>History</>     ~/.critic/history.json
    <dim>Logs</>        ~/.critic/logs/critic.log"#
);
