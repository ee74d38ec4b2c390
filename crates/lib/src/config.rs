//! Instance configuration.
//!
//! Defaults come from [`ShellConfig::default`]; [`ShellConfig::from_env`]
//! layers the `BASHER_*` environment variables on top. Front ends override
//! individual fields after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::consts::{DEFAULT_SHELL, ENV_DRY_RUN, ENV_SHELL, ENV_SUDO, ENV_TIMEOUT, ENV_VERBOSITY};

/// Whether privileged commands get a `sudo` prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SudoMode {
  /// Prefix with `sudo` unless already running as root.
  #[default]
  Auto,
  Always,
  Never,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
  /// Working directory for commands and relative paths. `None` means the process cwd.
  pub working_dir: Option<PathBuf>,
  /// 0 is quiet; 1 echoes every command line.
  pub verbosity: u8,
  /// Log commands instead of running them.
  pub dry_run: bool,
  /// Default timeout applied to every command without its own.
  pub timeout: Option<Duration>,
  /// Shell used for shell-string commands.
  pub shell: String,
  pub sudo: SudoMode,
}

impl Default for ShellConfig {
  fn default() -> Self {
    Self {
      working_dir: None,
      verbosity: 0,
      dry_run: false,
      timeout: None,
      shell: DEFAULT_SHELL.to_string(),
      sudo: SudoMode::Auto,
    }
  }
}

impl ShellConfig {
  /// Defaults overridden by `BASHER_*` environment variables.
  ///
  /// Unparseable values are logged and ignored.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(raw) = env::var(ENV_VERBOSITY) {
      match raw.trim().parse() {
        Ok(level) => config.verbosity = level,
        Err(_) => warn!(var = ENV_VERBOSITY, value = %raw, "ignoring invalid verbosity"),
      }
    }

    if let Ok(raw) = env::var(ENV_DRY_RUN) {
      config.dry_run = is_truthy(&raw);
    }

    if let Ok(raw) = env::var(ENV_TIMEOUT) {
      match humantime::parse_duration(raw.trim()) {
        Ok(timeout) => config.timeout = Some(timeout),
        Err(e) => warn!(var = ENV_TIMEOUT, value = %raw, error = %e, "ignoring invalid timeout"),
      }
    }

    if let Ok(raw) = env::var(ENV_SHELL)
      && !raw.trim().is_empty()
    {
      config.shell = raw.trim().to_string();
    }

    if let Ok(raw) = env::var(ENV_SUDO) {
      config.sudo = if is_truthy(&raw) { SudoMode::Always } else { SudoMode::Never };
    }

    config
  }

  pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_verbosity(mut self, verbosity: u8) -> Self {
    self.verbosity = verbosity;
    self
  }

  pub fn with_sudo(mut self, sudo: SudoMode) -> Self {
    self.sudo = sudo;
    self
  }
}

fn is_truthy(raw: &str) -> bool {
  matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
