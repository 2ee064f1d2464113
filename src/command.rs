use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{CalcError, CalcResult};
use crate::metric::MetricId;

lazy_static! {
    static ref EDIT_REGEX: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9]*)\s*=\s*(.*)$").unwrap();
    static ref COMMIT_REGEX: Regex =
        Regex::new(r"^(?i:commit)(?:\s+([A-Za-z][A-Za-z0-9]*))?$").unwrap();
}

/// One line typed into the interactive session.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `<metric>=<text>`; the text is kept as typed.
    Edit { metric: MetricId, text: String },
    /// `commit` or `commit <metric>`.
    Commit(Option<MetricId>),
    Undo,
    Reset,
    Json,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> CalcResult<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CalcError::InvalidCommand(String::new()));
    }

    if let Some(captures) = EDIT_REGEX.captures(line) {
        let metric: MetricId = captures[1].parse()?;
        return Ok(Command::Edit {
            metric,
            text: captures[2].trim().to_string(),
        });
    }

    if let Some(captures) = COMMIT_REGEX.captures(line) {
        let metric = captures
            .get(1)
            .map(|m| m.as_str().parse::<MetricId>())
            .transpose()?;
        return Ok(Command::Commit(metric));
    }

    match line.to_ascii_lowercase().as_str() {
        "undo" => Ok(Command::Undo),
        "reset" => Ok(Command::Reset),
        "json" => Ok(Command::Json),
        "help" => Ok(Command::Help),
        "q" | "quit" => Ok(Command::Quit),
        _ => Err(CalcError::InvalidCommand(line.to_string())),
    }
}

pub const HELP: &str = "\
Commands:
  <metric>=<value>   Edit a metric and recalculate its dependents
  commit [metric]    Normalize typed text (all metrics when none given)
  undo               Revert the last edit
  reset              Restore the seed values
  json               Print the metrics as JSON
  q                  Quit";
