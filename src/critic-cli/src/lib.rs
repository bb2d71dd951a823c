//! Critic CLI library.
//!
//! The `critic` binary opens the interactive reviewer by default; the
//! subcommands cover scripted reviews, previews, history and configuration.

pub mod cli;
pub mod styled_output;
