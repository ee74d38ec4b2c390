//! Result types shared by every operation.
//!
//! An operation either ran and succeeded, ran (or was rejected) and failed, or
//! was never attempted because its target was missing. The three cases are kept
//! apart so callers can script provisioning steps the way a shell script checks
//! `$?` while still telling "failed" from "nothing to do".

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Exit status a POSIX shell reports when a command cannot be found.
pub const STATUS_NOT_FOUND: i32 = 127;

/// Exit status a POSIX shell reports when a command is found but not executable.
pub const STATUS_NOT_EXECUTABLE: i32 = 126;

/// Captured result of one process run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  /// Human readable command line, for logs and error messages only.
  pub command: String,
  /// Standard output, byte for byte.
  pub stdout: Vec<u8>,
  /// Standard error, byte for byte.
  pub stderr: Vec<u8>,
  /// Exit status as a shell would store it in `$?`.
  pub status: i32,
  /// The child was killed because its timeout elapsed.
  pub timed_out: bool,
}

impl Invocation {
  /// A successful run that produced no output.
  ///
  /// Used for dry runs and for operations that had nothing to do.
  pub fn noop(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      stdout: Vec::new(),
      stderr: Vec::new(),
      status: 0,
      timed_out: false,
    }
  }

  pub fn success(&self) -> bool {
    self.status == 0
  }

  pub fn stdout_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stdout).into_owned()
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.timed_out {
      write!(f, "`{}` timed out (status {})", self.command, self.status)
    } else {
      write!(f, "`{}` exited with status {}", self.command, self.status)
    }
  }
}

/// Why an operation failed.
#[derive(Debug, Error)]
pub enum Failure {
  /// The process ran and exited non-zero, or was killed.
  #[error("{0}")]
  Exit(Invocation),

  /// Direct file I/O failed.
  #[error("io error on {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },

  /// The process could not be started for a reason other than a missing program.
  #[error("failed to start `{command}`: {source}")]
  Spawn { command: String, source: io::Error },

  #[error("unsupported archive format: {0}")]
  UnsupportedFormat(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("no supported package manager detected")]
  NoPackageManager,

  #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
  ChecksumMismatch {
    url: String,
    expected: String,
    actual: String,
  },
}

impl Failure {
  pub(crate) fn io(path: &Path, source: io::Error) -> Self {
    Failure::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  /// The invocation behind an exit failure, if there was one.
  pub fn invocation(&self) -> Option<&Invocation> {
    match self {
      Failure::Exit(invocation) => Some(invocation),
      _ => None,
    }
  }
}

/// Why an operation was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Skip {
  #[error("path does not exist: {}", .0.display())]
  Missing(PathBuf),

  #[error("not a regular file: {}", .0.display())]
  NotAFile(PathBuf),

  #[error("not a directory: {}", .0.display())]
  NotADirectory(PathBuf),

  #[error("path already exists: {}", .0.display())]
  AlreadyExists(PathBuf),
}

/// Tri-state result of an operation.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T = Invocation> {
  Success(T),
  Failed(Failure),
  NotAttempted(Skip),
}

impl<T> Outcome<T> {
  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Success(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, Outcome::Failed(_))
  }

  pub fn is_not_attempted(&self) -> bool {
    matches!(self, Outcome::NotAttempted(_))
  }

  /// `Some(true)` on success, `Some(false)` on failure, `None` when not attempted.
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Outcome::Success(_) => Some(true),
      Outcome::Failed(_) => Some(false),
      Outcome::NotAttempted(_) => None,
    }
  }

  pub fn ok(self) -> Option<T> {
    match self {
      Outcome::Success(value) => Some(value),
      _ => None,
    }
  }

  pub fn failure(&self) -> Option<&Failure> {
    match self {
      Outcome::Failed(failure) => Some(failure),
      _ => None,
    }
  }

  pub fn skip(&self) -> Option<&Skip> {
    match self {
      Outcome::NotAttempted(skip) => Some(skip),
      _ => None,
    }
  }

  pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Success(value) => Outcome::Success(f(value)),
      Outcome::Failed(failure) => Outcome::Failed(failure),
      Outcome::NotAttempted(skip) => Outcome::NotAttempted(skip),
    }
  }

  /// Chain a dependent step onto a successful outcome.
  pub fn and_then<U, F: FnOnce(T) -> Outcome<U>>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Success(value) => f(value),
      Outcome::Failed(failure) => Outcome::Failed(failure),
      Outcome::NotAttempted(skip) => Outcome::NotAttempted(skip),
    }
  }
}

impl Outcome<Invocation> {
  /// Classify a finished invocation by its exit status.
  pub fn from_invocation(invocation: Invocation) -> Self {
    if invocation.success() {
      Outcome::Success(invocation)
    } else {
      Outcome::Failed(Failure::Exit(invocation))
    }
  }

  /// The invocation, whether it succeeded or exited non-zero.
  pub fn invocation(&self) -> Option<&Invocation> {
    match self {
      Outcome::Success(invocation) => Some(invocation),
      Outcome::Failed(failure) => failure.invocation(),
      Outcome::NotAttempted(_) => None,
    }
  }

  /// Discard the invocation, keeping only the tri-state.
  pub fn discard(self) -> Outcome<()> {
    self.map(|_| ())
  }
}
