//! Line-oriented labeling loop.
//!
//! # Responsibility
//! - Parse one command per line and dispatch it to the session.
//! - Keep the current zoom window, which stands in for the chart's
//!   pan/zoom state of a graphical front-end.
//!
//! # Invariants
//! - Action errors are reported and the loop continues.
//! - The zoom window resets whenever the project or recording changes.

use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use accel_label_core::{
    Action, IntervalRepository, RecordingSource, Render, Selection, Session, Timestamp,
};
use anyhow::Result;
use log::warn;

use crate::{write_figure, write_html};

const PROMPT: &str = "> ";

const HELP: &str = "\
commands:
  project NAME          load a project and list its recordings
  recording NAME        show a recording
  region [START END]    mark a region (zoom window or whole recording)
  label [START END]     mark a smoking label
  delete [START END]    delete the single label, else region, inside the window
  toggle                show intervals of all recordings or only this one
  save                  write regions and labels to disk
  zoom [START END]      set or clear the zoom window
  projects              list projects
  recordings            list recordings of the current project
  figure FILE           write the chart as plotly JSON
  html FILE             write the chart as a standalone HTML page
  help                  show this text
  quit                  leave
times: `2023-05-01T10:30:05.250` or `2023-05-01 10:30:05.250`";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Project(String),
    Recording(String),
    Region(Option<Selection>),
    Label(Option<Selection>),
    Delete(Option<Selection>),
    Toggle,
    Save,
    Zoom(Option<Selection>),
    Projects,
    Recordings,
    Figure(PathBuf),
    Html(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingArgument(&'static str),
    BadWindow(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(word) => write!(f, "unknown command `{word}`; try `help`"),
            Self::MissingArgument(what) => write!(f, "missing {what}"),
            Self::BadWindow(message) => write!(f, "bad window: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one input line; blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = tokens.collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "project" => Command::Project(single_arg(&rest, "project name")?),
        "recording" => Command::Recording(single_arg(&rest, "recording name")?),
        "region" => Command::Region(parse_window(&rest)?),
        "label" => Command::Label(parse_window(&rest)?),
        "delete" => Command::Delete(parse_window(&rest)?),
        "toggle" => Command::Toggle,
        "save" => Command::Save,
        "zoom" => Command::Zoom(parse_window(&rest)?),
        "projects" => Command::Projects,
        "recordings" => Command::Recordings,
        "figure" => Command::Figure(PathBuf::from(single_arg(&rest, "output file")?)),
        "html" => Command::Html(PathBuf::from(single_arg(&rest, "output file")?)),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn single_arg(rest: &[&str], what: &'static str) -> Result<String, ParseError> {
    match rest {
        [] => Err(ParseError::MissingArgument(what)),
        tokens => Ok(tokens.join(" ")),
    }
}

/// Accepts no tokens, `START END`, or `DATE TIME DATE TIME`.
fn parse_window(rest: &[&str]) -> Result<Option<Selection>, ParseError> {
    let (start, end) = match rest {
        [] => return Ok(None),
        [start, end] => (start.to_string(), end.to_string()),
        [start_date, start_time, end_date, end_time] => (
            format!("{start_date} {start_time}"),
            format!("{end_date} {end_time}"),
        ),
        _ => {
            return Err(ParseError::BadWindow(
                "expected `START END` timestamps".to_string(),
            ))
        }
    };

    let start = parse_timestamp(&start)?;
    let end = parse_timestamp(&end)?;
    Selection::new(start, end)
        .map(Some)
        .map_err(|err| ParseError::BadWindow(err.to_string()))
}

fn parse_timestamp(text: &str) -> Result<Timestamp, ParseError> {
    text.parse()
        .map_err(|err: accel_label_core::TimestampParseError| ParseError::BadWindow(err.to_string()))
}

/// Interactive front-end around one session.
pub struct Shell<R: IntervalRepository, S: RecordingSource> {
    session: Session<R, S>,
    zoom: Option<Selection>,
    recordings: Vec<String>,
}

impl<R: IntervalRepository, S: RecordingSource> Shell<R, S> {
    pub fn new(session: Session<R, S>) -> Self {
        Self {
            session,
            zoom: None,
            recordings: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session<R, S> {
        &self.session
    }

    #[cfg(test)]
    pub fn zoom(&self) -> Option<Selection> {
        self.zoom
    }

    /// Selects the first project and its first recording, then reads
    /// commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(out, "type `help` for commands")?;
        self.select_defaults(out)?;

        write!(out, "{PROMPT}")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            match parse_command(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => {
                    if let Err(err) = self.execute(command, out) {
                        warn!("event=shell_command module=cli status=error error={}", err);
                        writeln!(out, "error: {err:#}")?;
                    }
                }
                Ok(None) => {}
                Err(err) => writeln!(out, "error: {err}")?,
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn select_defaults(&mut self, out: &mut impl Write) -> Result<()> {
        let projects = match self.session.source().list_projects() {
            Ok(projects) => projects,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(());
            }
        };
        let Some(project) = projects.first() else {
            writeln!(out, "no projects found")?;
            return Ok(());
        };

        if let Err(err) = self.execute(Command::Project(project.clone()), out) {
            writeln!(out, "error: {err:#}")?;
            return Ok(());
        }
        if let Some(recording) = self.recordings.first().cloned() {
            if let Err(err) = self.execute(Command::Recording(recording), out) {
                writeln!(out, "error: {err:#}")?;
            }
        }
        Ok(())
    }

    /// Runs one parsed command other than `quit`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Project(name) => {
                self.zoom = None;
                self.recordings.clear();
                let render = self.session.dispatch(Action::SelectProject(name))?;
                if let Some(recordings) = &render.recordings {
                    self.recordings = recordings.clone();
                }
                print_render(&render, out)
            }
            Command::Recording(name) => {
                self.zoom = None;
                let render = self.session.dispatch(Action::SelectRecording(name))?;
                print_render(&render, out)
            }
            Command::Region(window) => self.dispatch_windowed(Action::WriteRegion, window, out),
            Command::Label(window) => self.dispatch_windowed(Action::AddLabel, window, out),
            Command::Delete(window) => self.dispatch_windowed(Action::Delete, window, out),
            Command::Toggle => {
                let render = self.session.dispatch(Action::ToggleView)?;
                print_render(&render, out)
            }
            Command::Save => {
                let render = self.session.dispatch(Action::Save)?;
                print_render(&render, out)
            }
            Command::Zoom(window) => {
                self.zoom = window;
                let render = self.session.dispatch(Action::DescribeSelection(window))?;
                print_render(&render, out)
            }
            Command::Projects => {
                for project in self.session.source().list_projects()? {
                    writeln!(out, "{project}")?;
                }
                Ok(())
            }
            Command::Recordings => {
                if self.session.project().is_none() {
                    writeln!(out, "no project selected")?;
                }
                for recording in &self.recordings {
                    writeln!(out, "{recording}")?;
                }
                Ok(())
            }
            Command::Figure(path) => {
                write_figure(&self.session.figure(), &path)?;
                writeln!(out, "wrote {}", path.display())?;
                Ok(())
            }
            Command::Html(path) => {
                let title = self
                    .session
                    .recording()
                    .map(|recording| recording.name.clone())
                    .unwrap_or_else(|| "accel-label".to_string());
                write_html(&self.session.figure(), &title, &path)?;
                writeln!(out, "wrote {}", path.display())?;
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Explicit window, else the zoom window, else the session's fallback.
    fn dispatch_windowed(
        &mut self,
        action: fn(Option<Selection>) -> Action,
        window: Option<Selection>,
        out: &mut impl Write,
    ) -> Result<()> {
        let render = self.session.dispatch(action(window.or(self.zoom)))?;
        print_render(&render, out)
    }
}

fn print_render(render: &Render, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", render.status)?;
    if let Some(recordings) = &render.recordings {
        for recording in recordings {
            writeln!(out, "  {recording}")?;
        }
    }
    if let Some(figure) = &render.figure {
        if !figure.is_empty() {
            let points = figure.data.first().map_or(0, |trace| trace.x.len());
            writeln!(
                out,
                "chart: {points} points per axis, {} intervals shown",
                figure.layout.shapes.len()
            )?;
        }
    }
    Ok(())
}
