//! CLI output formatting utilities.
//!
//! Command output is written through unchanged: the bytes a wrapped command
//! printed go to our stdout and stderr as-is. Status lines use the symbols from
//! the library console and go to stderr so they never mix with that output.

use std::io::{self, Write};

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use basher_lib::console::symbols;
use basher_lib::{Failure, Invocation, Outcome};

/// Exit code for a failure that has no exit status of its own.
pub const EXIT_FAILED: u8 = 1;

/// Exit code when the operation was not attempted.
pub const EXIT_NOT_ATTEMPTED: u8 = 2;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub fn print_success(message: &str) {
  eprintln!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stderr, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Write raw bytes to stdout.
pub fn write_stdout(bytes: &[u8]) -> anyhow::Result<()> {
  let mut stdout = io::stdout().lock();
  stdout.write_all(bytes).context("Failed to write to stdout")?;
  stdout.flush().context("Failed to flush stdout")?;
  Ok(())
}

/// Write raw bytes to stderr.
pub fn write_stderr(bytes: &[u8]) -> anyhow::Result<()> {
  let mut stderr = io::stderr().lock();
  stderr.write_all(bytes).context("Failed to write to stderr")?;
  stderr.flush().context("Failed to flush stderr")?;
  Ok(())
}

/// Process exit code for an outcome.
///
/// A failed invocation exits with its own status, so `basher exec false`
/// exits like `false` does.
pub fn exit_code<T>(outcome: &Outcome<T>) -> u8 {
  match outcome {
    Outcome::Success(_) => 0,
    Outcome::Failed(Failure::Exit(invocation)) => u8::try_from(invocation.status)
      .ok()
      .filter(|status| *status != 0)
      .unwrap_or(EXIT_FAILED),
    Outcome::Failed(_) => EXIT_FAILED,
    Outcome::NotAttempted(_) => EXIT_NOT_ATTEMPTED,
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum State {
  Success,
  Failed,
  NotAttempted,
}

/// Machine-readable form of an outcome.
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
  state: State,
  #[serde(skip_serializing_if = "Option::is_none")]
  value: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  invocation: Option<InvocationReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvocationReport {
  command: String,
  status: i32,
  stdout: String,
  stderr: String,
  timed_out: bool,
}

impl From<&Invocation> for InvocationReport {
  fn from(invocation: &Invocation) -> Self {
    Self {
      command: invocation.command.clone(),
      status: invocation.status,
      stdout: invocation.stdout_lossy(),
      stderr: invocation.stderr_lossy(),
      timed_out: invocation.timed_out,
    }
  }
}

fn describe<T>(outcome: &Outcome<T>) -> (State, Option<String>) {
  match outcome {
    Outcome::Success(_) => (State::Success, None),
    Outcome::Failed(failure) => (State::Failed, Some(failure.to_string())),
    Outcome::NotAttempted(skip) => (State::NotAttempted, Some(skip.to_string())),
  }
}

impl<T: Serialize> Report<T> {
  pub fn new(outcome: Outcome<T>) -> Self {
    let (state, reason) = describe(&outcome);
    let invocation = outcome.failure().and_then(Failure::invocation).map(InvocationReport::from);
    Self {
      state,
      value: outcome.ok(),
      invocation,
      reason,
    }
  }
}

impl Report<()> {
  pub fn from_invocation(outcome: &Outcome<Invocation>) -> Self {
    let (state, reason) = describe(outcome);
    Self {
      state,
      value: None,
      invocation: outcome.invocation().map(InvocationReport::from),
      reason,
    }
  }
}

/// Print an invocation outcome and return its exit code.
///
/// Text mode passes the captured output through untouched and reports
/// anything that is not a plain exit status on stderr.
pub fn emit_invocation(outcome: Outcome<Invocation>, format: OutputFormat) -> anyhow::Result<u8> {
  let code = exit_code(&outcome);

  if format.is_json() {
    print_json(&Report::from_invocation(&outcome))?;
    return Ok(code);
  }

  if let Some(invocation) = outcome.invocation() {
    write_stdout(&invocation.stdout)?;
    write_stderr(&invocation.stderr)?;
    if invocation.timed_out {
      print_error(&format!("`{}` timed out", invocation.command));
    }
  }
  match &outcome {
    Outcome::Failed(Failure::Exit(_)) | Outcome::Success(_) => {}
    Outcome::Failed(failure) => print_error(&failure.to_string()),
    Outcome::NotAttempted(skip) => print_warning(&format!("not attempted: {}", skip)),
  }
  Ok(code)
}

/// Print any other outcome, rendering the success value with `render`.
pub fn emit<T: Serialize>(
  outcome: Outcome<T>,
  format: OutputFormat,
  render: impl FnOnce(&T) -> anyhow::Result<()>,
) -> anyhow::Result<u8> {
  let code = exit_code(&outcome);

  if format.is_json() {
    print_json(&Report::new(outcome))?;
    return Ok(code);
  }

  match &outcome {
    Outcome::Success(value) => render(value)?,
    Outcome::Failed(failure) => {
      if let Some(invocation) = failure.invocation() {
        write_stdout(&invocation.stdout)?;
        write_stderr(&invocation.stderr)?;
      } else {
        print_error(&failure.to_string());
      }
    }
    Outcome::NotAttempted(skip) => print_warning(&format!("not attempted: {}", skip)),
  }
  Ok(code)
}
