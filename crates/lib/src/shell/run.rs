//! Builder for a single command invocation.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::quote::render;

use super::Shell;
use super::process::{self, Spawn};

/// A command ready to run through a [`Shell`].
///
/// Created by [`Shell::command`] (argument list, no shell involved) or
/// [`Shell::sh`] (a script for the configured shell).
#[must_use = "a Run does nothing until .run() is called"]
pub struct Run<'a> {
  shell: &'a Shell,
  program: OsString,
  args: Vec<OsString>,
  cwd: Option<PathBuf>,
  timeout: Option<Duration>,
  env: Vec<(OsString, OsString)>,
  stdin: Option<Vec<u8>>,
  show_output: bool,
  privileged: bool,
}

impl<'a> Run<'a> {
  pub(crate) fn new(shell: &'a Shell, program: impl AsRef<OsStr>) -> Self {
    Self {
      shell,
      program: program.as_ref().to_os_string(),
      args: Vec::new(),
      cwd: None,
      timeout: None,
      env: Vec::new(),
      stdin: None,
      show_output: false,
      privileged: false,
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  /// Run in `dir` instead of the shell's working directory.
  ///
  /// Relative paths are resolved against the shell's working directory.
  pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Kill the child (and its process group) after `timeout`.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
    self.env.push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
    self
  }

  /// Feed `bytes` to the child's standard input.
  pub fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
    self.stdin = Some(bytes.into());
    self
  }

  /// Echo output to the terminal while capturing it.
  pub fn show_output(mut self, show: bool) -> Self {
    self.show_output = show;
    self
  }

  /// Prefix with `sudo` when the shell's sudo policy asks for it.
  pub fn privileged(mut self) -> Self {
    self.privileged = true;
    self
  }

  /// The command line this run would execute, quoted for a POSIX shell.
  pub fn command_line(&self) -> String {
    let (program, args) = self.argv();
    render(&program, &args)
  }

  fn argv(&self) -> (OsString, Vec<OsString>) {
    if self.privileged && self.shell.needs_sudo() {
      // sudo resets the environment, so per-call variables go in as `KEY=value` operands.
      let mut args = Vec::with_capacity(self.env.len() + self.args.len() + 1);
      for (key, value) in &self.env {
        let mut assignment = key.clone();
        assignment.push("=");
        assignment.push(value);
        args.push(assignment);
      }
      args.push(self.program.clone());
      args.extend(self.args.iter().cloned());
      (OsString::from("sudo"), args)
    } else {
      (self.program.clone(), self.args.clone())
    }
  }

  /// Execute and classify the result by exit status.
  ///
  /// A missing working directory means nothing was attempted.
  pub fn run(self) -> Outcome<Invocation> {
    let cwd = match &self.cwd {
      Some(dir) => self.shell.resolve(dir),
      None => self.shell.working_dir().to_path_buf(),
    };
    if !cwd.is_dir() {
      return Outcome::NotAttempted(Skip::NotADirectory(cwd));
    }

    let (program, args) = self.argv();
    let line = render(&program, &args);
    self.shell.console().command(&line);

    if self.shell.config().dry_run {
      info!(cmd = %line, "dry run, not executing");
      return Outcome::Success(Invocation::noop(line));
    }

    let mut env: Vec<(OsString, OsString)> = self
      .shell
      .env()
      .iter()
      .map(|(k, v)| (OsString::from(k), OsString::from(v)))
      .collect();
    env.extend(self.env);

    let spec = Spawn {
      program,
      args,
      cwd,
      env,
      stdin: self.stdin,
      timeout: self.timeout.or(self.shell.config().timeout),
      tee: self.show_output,
      line: line.clone(),
    };

    info!(cmd = %line, "executing command");
    match self.shell.block_on(process::capture(spec)) {
      Ok(invocation) => {
        debug!(
          cmd = %line,
          status = invocation.status,
          stdout_bytes = invocation.stdout.len(),
          stderr_bytes = invocation.stderr.len(),
          "command finished"
        );
        if !invocation.stderr.is_empty() {
          debug!(stderr = %invocation.stderr_lossy(), "command stderr");
        }
        Outcome::from_invocation(invocation)
      }
      Err(source) => Outcome::Failed(Failure::Spawn { command: line, source }),
    }
  }

  /// Execute and report only whether the command exited 0.
  pub fn ok(self) -> bool {
    self.run().is_success()
  }
}
