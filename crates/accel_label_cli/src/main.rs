//! Command-line front-end for accelerometer recording labeling.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment, then start logging.
//! - Offer one-shot listing/rendering commands and an interactive shell.
//!
//! # Invariants
//! - An unusable data root aborts before any command runs.

mod shell;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use accel_label_core::config::{
    ENV_DATA_PATH, ENV_DECIMATION, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_UTC_OFFSET_HOURS,
};
use accel_label_core::{
    init_logging, open_session, render_html, Action, AppConfig, Figure, FsIntervalRepository,
    FsRecordingSource, IntervalRepository, RecordingSource, Session,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Label regions and smoking events in accelerometer recordings", long_about = None)]
struct Cli {
    /// Directory holding `0_raw` and `1_labeled`
    #[arg(long, global = true, env = "ACCEL_LABEL_DATA_PATH", value_hint = ValueHint::DirPath)]
    data_root: Option<PathBuf>,

    /// Plot every Nth sample
    #[arg(long, global = true, env = "ACCEL_LABEL_DECIMATION")]
    decimation: Option<usize>,

    /// Hours subtracted from recording names to reach absolute time
    #[arg(long, global = true, env = "ACCEL_LABEL_UTC_OFFSET_HOURS", allow_negative_numbers = true)]
    utc_offset_hours: Option<i64>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "ACCEL_LABEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log directory (defaults to `<data-root>/logs`)
    #[arg(long, global = true, env = "ACCEL_LABEL_LOG_DIR", value_hint = ValueHint::DirPath)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects under the raw-input directory
    Projects,
    /// List recordings of a project
    Recordings { project: String },
    /// Write the chart of one recording as plotly JSON and/or HTML
    Render(RenderArgs),
    /// Interactive labeling loop on stdin
    Shell,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    project: String,
    recording: String,

    /// Figure JSON path (stdout when omitted)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    out: Option<PathBuf>,

    /// Standalone HTML page path
    #[arg(long, value_hint = ValueHint::FilePath)]
    html: Option<PathBuf>,

    /// Draw intervals of every recording, not only overlapping ones
    #[arg(long, action = ArgAction::SetTrue)]
    all: bool,
}

impl Cli {
    /// Flag values keyed by their environment variable names.
    fn overrides(&self) -> HashMap<&'static str, String> {
        let mut values = HashMap::new();
        if let Some(root) = &self.data_root {
            values.insert(ENV_DATA_PATH, root.display().to_string());
        }
        if let Some(decimation) = self.decimation {
            values.insert(ENV_DECIMATION, decimation.to_string());
        }
        if let Some(offset) = self.utc_offset_hours {
            values.insert(ENV_UTC_OFFSET_HOURS, offset.to_string());
        }
        if let Some(level) = &self.log_level {
            values.insert(ENV_LOG_LEVEL, level.clone());
        }
        if let Some(dir) = &self.log_dir {
            values.insert(ENV_LOG_DIR, dir.display().to_string());
        }
        values
    }

    fn config(&self) -> Result<AppConfig> {
        let values = self.overrides();
        AppConfig::from_lookup(|key| values.get(key).cloned())
            .context("invalid configuration; pass --data-root or set ACCEL_LABEL_DATA_PATH")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let session = start(&config, &cwd)?;
    info!(
        "event=cli_start module=cli status=ok command={:?} data_root={}",
        cli.command,
        config.data_root.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Projects => {
            for project in session.source().list_projects()? {
                writeln!(out, "{project}")?;
            }
            Ok(())
        }
        Command::Recordings { project } => {
            for recording in session.source().list_recordings(&project)? {
                writeln!(out, "{recording}")?;
            }
            Ok(())
        }
        Command::Render(args) => handle_render(session, args, &mut out),
        Command::Shell => {
            let stdin = io::stdin();
            shell::Shell::new(session).run(stdin.lock(), &mut out)
        }
    }
}

/// Validates the data root, then starts logging.
///
/// The default log directory lives under the data root; nothing is created
/// on disk for a root that fails validation.
fn start(config: &AppConfig, cwd: &Path) -> Result<Session<FsIntervalRepository, FsRecordingSource>> {
    let session = open_session(config)
        .with_context(|| format!("cannot use data root {}", config.data_root.display()))?;

    let log_dir = config.resolved_log_dir(cwd);
    init_logging(&config.log_level, &log_dir)
        .with_context(|| format!("failed to start logging in {}", log_dir.display()))?;
    Ok(session)
}

fn handle_render<R, S>(
    mut session: Session<R, S>,
    args: RenderArgs,
    out: &mut impl Write,
) -> Result<()>
where
    R: IntervalRepository,
    S: RecordingSource,
{
    session.dispatch(Action::SelectProject(args.project.clone()))?;
    session
        .dispatch(Action::SelectRecording(args.recording.clone()))
        .with_context(|| format!("failed to load recording {}", args.recording))?;
    if args.all {
        session.dispatch(Action::ToggleView)?;
    }

    let figure = session.figure();
    match &args.out {
        Some(path) => write_figure(&figure, path)?,
        None => writeln!(out, "{}", figure.to_json()?)?,
    }
    if let Some(path) = &args.html {
        write_html(&figure, &args.recording, path)?;
    }
    Ok(())
}

pub(crate) fn write_figure(figure: &Figure, path: &Path) -> Result<()> {
    let json = figure.to_json()?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub(crate) fn write_html(figure: &Figure, title: &str, path: &Path) -> Result<()> {
    let page = render_html(figure, title)?;
    fs::write(path, page).with_context(|| format!("failed to write {}", path.display()))
}
