//! `supervisord` / `supervisorctl` control.

use std::path::Path;

use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::shell::Shell;

/// Default `supervisord` configuration file.
pub const DEFAULT_CONFIG: &str = "/etc/supervisord.conf";

/// Privileged `supervisorctl` commands run through a [`Shell`].
pub struct Supervisor<'a> {
  shell: &'a Shell,
}

impl<'a> Supervisor<'a> {
  pub fn new(shell: &'a Shell) -> Self {
    Self { shell }
  }

  /// Start the daemon with `config` (`supervisord -c config`).
  pub fn init(&self, config: impl AsRef<Path>) -> Outcome<Invocation> {
    let config = self.shell.resolve(config);
    if !config.is_file() {
      return Outcome::NotAttempted(Skip::Missing(config));
    }
    self.shell.command("supervisord").arg("-c").arg(&config).privileged().run()
  }

  fn ctl(&self, args: &[&str]) -> Outcome<Invocation> {
    self.shell.command("supervisorctl").args(args).privileged().run()
  }

  fn program(&self, action: &str, name: &str) -> Outcome<Invocation> {
    if name.trim().is_empty() || name.starts_with('-') {
      return Outcome::Failed(Failure::InvalidArgument(format!("'{}' is not a program name", name)));
    }
    self.ctl(&[action, name])
  }

  pub fn start_all(&self) -> Outcome<Invocation> {
    self.ctl(&["start", "all"])
  }

  pub fn stop_all(&self) -> Outcome<Invocation> {
    self.ctl(&["stop", "all"])
  }

  pub fn restart_all(&self) -> Outcome<Invocation> {
    self.ctl(&["restart", "all"])
  }

  /// Status of every program. `supervisorctl` exits non-zero when any is not running.
  pub fn status(&self) -> Outcome<Invocation> {
    self.ctl(&["status"])
  }

  pub fn start_program(&self, name: &str) -> Outcome<Invocation> {
    self.program("start", name)
  }

  pub fn stop_program(&self, name: &str) -> Outcome<Invocation> {
    self.program("stop", name)
  }

  pub fn restart_program(&self, name: &str) -> Outcome<Invocation> {
    self.program("restart", name)
  }

  /// Reload configuration files without applying them.
  pub fn reread(&self) -> Outcome<Invocation> {
    self.ctl(&["reread"])
  }

  /// Apply configuration changes, restarting affected programs.
  pub fn update(&self) -> Outcome<Invocation> {
    self.ctl(&["update"])
  }
}

impl Shell {
  pub fn supervisor(&self) -> Supervisor<'_> {
    Supervisor::new(self)
  }
}
