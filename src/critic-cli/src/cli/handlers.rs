//! Command dispatch and execution handlers.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use critic_common::{AppDirs, CriticConfig, get_config_path, load_config};
use critic_review::{
    BoundaryPolicy, HistoryRepository, JsonFileHistory, ReviewClient, Section, SelectedFile,
    SubmissionFlow, UploadRecord, preview,
};
use critic_tui::{AppOptions, TuiOptions};
use serde_json::json;
use tracing::{debug, warn};

use super::args::*;
use crate::styled_output::{dim, heading, print_info, print_success, print_warning};

/// Resolved directories and configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub dirs: AppDirs,
    pub config_path: PathBuf,
    pub config: CriticConfig,
}

impl CliContext {
    /// Load configuration for `dirs` and apply command-line overrides.
    pub fn load(dirs: AppDirs, overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = get_config_path(&dirs.home);
        let mut config = load_config(&config_path)?;
        overrides.apply(&mut config);
        debug!(endpoint = %config.endpoint, theme = %config.theme, "Configuration resolved");
        Ok(Self {
            dirs,
            config_path,
            config,
        })
    }

    pub fn policy(&self) -> BoundaryPolicy {
        BoundaryPolicy::from_fence_aware(self.config.sections.fence_aware)
    }

    pub fn history(&self) -> JsonFileHistory {
        JsonFileHistory::new(self.dirs.history_file())
    }

    pub fn submission_flow(&self) -> Result<SubmissionFlow> {
        let client = ReviewClient::new(&self.config.endpoint, self.config.request_timeout())?;
        Ok(SubmissionFlow::new(client, Arc::new(self.history()))
            .redact_secrets(self.config.redact_secrets))
    }
}

/// Dispatch a CLI command to its handler.
pub async fn dispatch_command(cli: Cli, dirs: AppDirs) -> Result<()> {
    if let Some(Commands::Completion(completion)) = &cli.command {
        generate_completions(completion.shell);
        return Ok(());
    }

    let ctx = CliContext::load(dirs, &cli.overrides)?;
    match cli.command {
        None => run_tui(ctx, TuiCommand::default()).await,
        Some(Commands::Tui(tui)) => run_tui(ctx, tui).await,
        Some(Commands::Review(review)) => run_review(ctx, review).await,
        Some(Commands::Preview(cmd)) => run_preview(cmd).await,
        Some(Commands::History(cmd)) => run_history(&ctx, cmd),
        Some(Commands::Config(cmd)) => show_config(&ctx, cmd),
        Some(Commands::Completion(_)) => Ok(()),
    }
}

/// Run the interactive UI.
async fn run_tui(ctx: CliContext, cmd: TuiCommand) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!(
            "The interactive reviewer requires a terminal.\n\
             For scripts, use 'critic review <FILE>' instead."
        );
    }

    let history = match ctx.history().load() {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Starting with empty upload history");
            Vec::new()
        }
    };

    let options = TuiOptions {
        app: AppOptions {
            flow: ctx.submission_flow()?,
            policy: ctx.policy(),
            theme: ctx.config.theme,
            toast_duration: ctx.config.toast_duration(),
            history,
        },
        initial_file: cmd.file,
    };
    critic_tui::run(options).await
}

async fn run_review(ctx: CliContext, cmd: ReviewCommand) -> Result<()> {
    let file = SelectedFile::open(&cmd.file)
        .await
        .with_context(|| format!("Cannot open {}", cmd.file.display()))?;
    let flow = ctx.submission_flow()?;

    print_info(&format!(
        "Reviewing {} ({}) at {}",
        file.name(),
        file.size_label(),
        flow.client().endpoint()
    ));
    let outcome = flow.submit(Some(&file)).await?;
    if outcome.history.is_none() {
        print_warning("Review succeeded but the upload history could not be saved");
    }

    let sections = outcome.feedback.sections(ctx.policy());
    let mut stdout = io::stdout().lock();
    if cmd.raw {
        writeln!(stdout, "{}", outcome.feedback)?;
    } else if cmd.json {
        let doc = json!({
            "file": file.name(),
            "sections": sections,
        });
        writeln!(stdout, "{}", serde_json::to_string_pretty(&doc)?)?;
    } else {
        write!(stdout, "{}", format_sections(&sections))?;
    }
    drop(stdout);

    if let Some(n) = cmd.copy {
        let section = section_at(&sections, n)?;
        match critic_tui::copy_text(&section.body) {
            Ok(()) => print_success("Copied to clipboard"),
            Err(e) => {
                warn!(error = %e, "Copy failed");
                print_warning(&format!("Copy failed: {e}"));
            }
        }
    }
    Ok(())
}

/// Section `n`, counted from 1.
fn section_at(sections: &[Section], n: u64) -> Result<&Section> {
    usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| sections.get(i))
        .ok_or_else(|| {
            anyhow!(
                "Section {n} does not exist; the review has {} section(s)",
                sections.len()
            )
        })
}

fn format_sections(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&heading(&section.title));
        out.push('\n');
        if !section.body.is_empty() {
            out.push_str(&section.body);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

async fn run_preview(cmd: PreviewCommand) -> Result<()> {
    let file = SelectedFile::open(&cmd.file)
        .await
        .with_context(|| format!("Cannot open {}", cmd.file.display()))?;
    let text = preview(Some(&file))
        .await
        .ok_or_else(|| anyhow!("Cannot read {}", cmd.file.display()))?;
    println!("{text}");
    Ok(())
}

fn run_history(ctx: &CliContext, cmd: HistoryCommand) -> Result<()> {
    let mut records = ctx.history().load()?;
    if let Some(limit) = cmd.limit {
        records.truncate(limit);
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        print_info("No uploads yet");
    } else {
        print!("{}", format_history(&records));
    }
    Ok(())
}

fn format_history(records: &[UploadRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let at = record.at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
            format!("{}  {}\n", dim(&at.to_string()), record.name)
        })
        .collect()
}

fn show_config(ctx: &CliContext, cmd: ConfigCommand) -> Result<()> {
    if cmd.json {
        let doc = json!({
            "paths": {
                "home": ctx.dirs.home,
                "config": ctx.config_path,
                "history": ctx.dirs.history_file(),
                "logs": ctx.dirs.logs_dir,
            },
            "config": ctx.config,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let config_state = if ctx.config_path.exists() {
        ""
    } else {
        " (not found, using defaults)"
    };
    println!("{}", heading("Paths"));
    println!("  home      {}", ctx.dirs.home.display());
    println!("  config    {}{}", ctx.config_path.display(), config_state);
    println!("  history   {}", ctx.dirs.history_file().display());
    println!("  logs      {}", ctx.dirs.logs_dir.display());
    println!();
    println!("{}", heading("Configuration"));
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}

/// Generate shell completions to stdout.
fn generate_completions(shell: Shell) {
    /// Writer that silently ignores BrokenPipe errors.
    struct BrokenPipeIgnorer<W: Write> {
        inner: W,
    }

    impl<W: Write> Write for BrokenPipeIgnorer<W> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match self.inner.write(buf) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(buf.len()),
                other => other,
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            match self.inner.flush() {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        }
    }

    let mut cmd = Cli::command();
    let mut out = BrokenPipeIgnorer {
        inner: io::stdout(),
    };
    generate(shell, &mut cmd, "critic", &mut out);
}
