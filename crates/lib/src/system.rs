//! Host queries and one-shot service helpers.

use std::ffi::OsString;
use std::path::Path;

use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::shell::Shell;

impl Shell {
  /// Whether `name` resolves to an executable on the instance `PATH`.
  ///
  /// A name containing `/` is checked as a path relative to the working directory.
  pub fn command_exists(&self, name: &str) -> bool {
    if name.is_empty() {
      return false;
    }
    let path = self.env_var("PATH").map(OsString::from);
    which::which_in(name, path.as_ref(), self.working_dir()).is_ok()
  }

  /// Whether `getent passwd name` finds the user.
  pub fn user_exists(&self, name: &str) -> bool {
    if name.is_empty() || name.starts_with('-') {
      return false;
    }
    self.command("getent").arg("passwd").arg(name).ok()
  }

  /// `add-apt-repository -y ppa`.
  pub fn add_apt_repository(&self, ppa: &str) -> Outcome<Invocation> {
    if ppa.trim().is_empty() {
      return Outcome::Failed(Failure::InvalidArgument("empty repository".to_string()));
    }
    self
      .command("add-apt-repository")
      .arg("-y")
      .arg(ppa)
      .privileged()
      .run()
  }

  /// `service name start`.
  pub fn service_start(&self, name: &str) -> Outcome<Invocation> {
    if name.trim().is_empty() {
      return Outcome::Failed(Failure::InvalidArgument("empty service name".to_string()));
    }
    self.command("service").arg(name).arg("start").privileged().run()
  }

  /// `composer install [--no-scripts]` in `dir` (the working directory when unset).
  pub fn composer_install(&self, no_scripts: bool, dir: Option<&Path>) -> Outcome<Invocation> {
    let mut run = self.command("composer").arg("install");
    if no_scripts {
      run = run.arg("--no-scripts");
    }
    if let Some(dir) = dir {
      let dir = self.resolve(dir);
      if !dir.is_dir() {
        return Outcome::NotAttempted(Skip::NotADirectory(dir));
      }
      run = run.cwd(dir);
    }
    run.show_output(true).run()
  }

  /// `npm install [--prefix prefix]`.
  pub fn npm_install(&self, prefix: Option<&Path>) -> Outcome<Invocation> {
    let mut run = self.command("npm").arg("install");
    if let Some(prefix) = prefix {
      run = run.arg("--prefix").arg(self.resolve(prefix));
    }
    run.show_output(true).run()
  }
}
