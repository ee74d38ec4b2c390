//! The execution-layer instance.
//!
//! A [`Shell`] owns everything that persists between calls: its working
//! directory, extra environment for children, the console, the cached package
//! manager and a current-thread runtime that drives child processes. Every
//! public operation blocks until it completes.

mod process;
mod run;

use std::collections::BTreeMap;
use std::env;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::{ShellConfig, SudoMode};
use crate::console::{Color, Console};
use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::package::PackageManager;

pub use run::Run;

/// Errors constructing a [`Shell`].
#[derive(Debug, Error)]
pub enum ShellError {
  #[error("working directory '{}' does not exist", .0.display())]
  WorkingDirMissing(PathBuf),

  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] io::Error),

  #[error("failed to create runtime: {0}")]
  Runtime(#[source] io::Error),
}

pub struct Shell {
  config: ShellConfig,
  working_dir: PathBuf,
  env: BTreeMap<String, String>,
  console: Console,
  pub(crate) package_manager: OnceLock<PackageManager>,
  runtime: Runtime,
}

impl Shell {
  pub fn new(config: ShellConfig) -> Result<Self, ShellError> {
    let cwd = env::current_dir().map_err(ShellError::CurrentDir)?;
    let working_dir = match &config.working_dir {
      Some(dir) => cwd.join(dir),
      None => cwd,
    };
    if !working_dir.is_dir() {
      return Err(ShellError::WorkingDirMissing(working_dir));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(ShellError::Runtime)?;

    debug!(working_dir = %working_dir.display(), dry_run = config.dry_run, "shell created");

    Ok(Self {
      console: Console::new(config.verbosity),
      config,
      working_dir,
      env: BTreeMap::new(),
      package_manager: OnceLock::new(),
      runtime,
    })
  }

  /// A shell configured from `BASHER_*` environment variables.
  pub fn from_env() -> Result<Self, ShellError> {
    Self::new(ShellConfig::from_env())
  }

  pub fn config(&self) -> &ShellConfig {
    &self.config
  }

  pub fn console(&self) -> &Console {
    &self.console
  }

  pub fn working_dir(&self) -> &Path {
    &self.working_dir
  }

  /// Resolve `path` against the working directory.
  pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
    self.working_dir.join(path)
  }

  pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
    self.runtime.block_on(future)
  }

  /// Run `program` with an explicit argument list. No shell is involved.
  pub fn command(&self, program: impl AsRef<std::ffi::OsStr>) -> Run<'_> {
    Run::new(self, program)
  }

  /// Run `script` through the configured shell (`/bin/sh -c` by default).
  ///
  /// Values interpolated into `script` must go through [`crate::quote`].
  pub fn sh(&self, script: &str) -> Run<'_> {
    Run::new(self, &self.config.shell).arg("-c").arg(script)
  }

  /// Run a shell script with default options.
  pub fn run(&self, script: &str) -> Outcome<Invocation> {
    self.sh(script).run()
  }

  /// Whether `script` exits 0.
  pub fn run_ok(&self, script: &str) -> bool {
    self.sh(script).ok()
  }

  /// Run `script` with `dir` as its working directory.
  ///
  /// Not attempted when `dir` is not a directory.
  pub fn execute_in_directory(&self, script: &str, dir: impl AsRef<Path>) -> Outcome<Invocation> {
    self.sh(script).cwd(dir.as_ref()).show_output(true).run()
  }

  pub fn set_dry_run(&mut self, dry_run: bool) {
    self.config.dry_run = dry_run;
  }

  pub fn verbosity(&self) -> u8 {
    self.config.verbosity
  }

  pub fn set_verbosity(&mut self, verbosity: u8) {
    self.config.verbosity = verbosity;
    self.console.set_verbosity(verbosity);
  }

  /// Environment passed to every child on top of the process environment.
  pub fn env(&self) -> &BTreeMap<String, String> {
    &self.env
  }

  /// Set a variable for every subsequent child. The process environment is untouched.
  pub fn set_env(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
    self.env.insert(key.into(), value.as_ref().trim().to_string());
  }

  pub fn remove_env(&mut self, key: &str) -> Option<String> {
    self.env.remove(key)
  }

  /// Value a child would see for `key`.
  pub fn env_var(&self, key: &str) -> Option<String> {
    self.env.get(key).cloned().or_else(|| env::var(key).ok())
  }

  /// Change the working directory used for commands and relative paths.
  pub fn cd(&mut self, dir: impl AsRef<Path>) -> Outcome<()> {
    let target = self.resolve(dir);
    if !target.is_dir() {
      return Outcome::NotAttempted(Skip::NotADirectory(target));
    }
    match target.canonicalize() {
      Ok(canonical) => {
        debug!(from = %self.working_dir.display(), to = %canonical.display(), "changing directory");
        self.working_dir = canonical;
        Outcome::Success(())
      }
      Err(e) => Outcome::Failed(Failure::io(&target, e)),
    }
  }

  pub fn pwd(&self) -> &Path {
    &self.working_dir
  }

  pub(crate) fn needs_sudo(&self) -> bool {
    match self.config.sudo {
      SudoMode::Always => true,
      SudoMode::Never => false,
      SudoMode::Auto => !is_root() && self.command_exists("sudo"),
    }
  }

  pub fn echo(&self, message: &str, color: Option<Color>, end: &str) {
    self.console.echo(message, color, end);
  }

  pub fn info(&self, message: &str) {
    self.console.info(message);
  }

  pub fn success(&self, message: &str) {
    self.console.success(message);
  }

  pub fn warning(&self, message: &str) {
    self.console.warning(message);
  }

  pub fn error(&self, message: &str) {
    self.console.error(message);
  }
}

#[cfg(unix)]
pub(crate) fn is_root() -> bool {
  nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub(crate) fn is_root() -> bool {
  false
}
