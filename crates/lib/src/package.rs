//! Package manager detection and install dispatch.
//!
//! The manager is found by probing a fixed ordered list of executables on the
//! instance `PATH` and cached for the lifetime of the [`Shell`]. Installs run
//! the manager's non-interactive subcommand with one argument per package.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::outcome::{Failure, Invocation, Outcome};
use crate::shell::{Run, Shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
  Apt,
  Yum,
  Dnf,
  Pacman,
  Apk,
  Unknown,
}

/// Probe order. The first executable found wins.
const PROBES: [(PackageManager, &str); 5] = [
  (PackageManager::Apt, "apt-get"),
  (PackageManager::Yum, "yum"),
  (PackageManager::Dnf, "dnf"),
  (PackageManager::Pacman, "pacman"),
  (PackageManager::Apk, "apk"),
];

impl PackageManager {
  pub fn as_str(self) -> &'static str {
    match self {
      PackageManager::Apt => "apt",
      PackageManager::Yum => "yum",
      PackageManager::Dnf => "dnf",
      PackageManager::Pacman => "pacman",
      PackageManager::Apk => "apk",
      PackageManager::Unknown => "unknown",
    }
  }

  /// First manager whose executable is on `path` (a `PATH`-style list).
  pub fn detect_in(path: Option<OsString>, cwd: &Path) -> Self {
    for (manager, binary) in PROBES {
      if which::which_in(binary, path.as_ref(), cwd).is_ok() {
        return manager;
      }
    }
    PackageManager::Unknown
  }

  /// Non-interactive install command, without package names.
  pub fn install_command(self) -> Option<&'static [&'static str]> {
    match self {
      PackageManager::Apt => Some(&["apt-get", "install", "-y"]),
      PackageManager::Yum => Some(&["yum", "install", "-y"]),
      PackageManager::Dnf => Some(&["dnf", "install", "-y"]),
      PackageManager::Pacman => Some(&["pacman", "-Sy", "--noconfirm"]),
      PackageManager::Apk => Some(&["apk", "add"]),
      PackageManager::Unknown => None,
    }
  }

  /// Non-interactive removal command, including configuration where supported.
  pub fn purge_command(self) -> Option<&'static [&'static str]> {
    match self {
      PackageManager::Apt => Some(&["apt-get", "purge", "-y"]),
      PackageManager::Yum => Some(&["yum", "remove", "-y"]),
      PackageManager::Dnf => Some(&["dnf", "remove", "-y"]),
      PackageManager::Pacman => Some(&["pacman", "-Rns", "--noconfirm"]),
      PackageManager::Apk => Some(&["apk", "del"]),
      PackageManager::Unknown => None,
    }
  }

  /// Command exiting 0 iff a single package is installed.
  pub fn query_command(self) -> Option<&'static [&'static str]> {
    match self {
      PackageManager::Apt => Some(&["dpkg", "-s"]),
      PackageManager::Yum | PackageManager::Dnf => Some(&["rpm", "-q"]),
      PackageManager::Pacman => Some(&["pacman", "-Q"]),
      PackageManager::Apk => Some(&["apk", "info", "-e"]),
      PackageManager::Unknown => None,
    }
  }

  /// Index refresh that must precede an install.
  fn refresh_command(self) -> Option<&'static [&'static str]> {
    match self {
      PackageManager::Apt => Some(&["apt-get", "update"]),
      _ => None,
    }
  }
}

impl fmt::Display for PackageManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn validate(packages: &[&str]) -> Result<(), Failure> {
  for package in packages {
    if package.trim().is_empty() {
      return Err(Failure::InvalidArgument("empty package name".to_string()));
    }
    if package.starts_with('-') {
      return Err(Failure::InvalidArgument(format!("'{}' is not a package name", package)));
    }
  }
  Ok(())
}

impl Shell {
  /// The system package manager, probed once and cached.
  pub fn detect_package_manager(&self) -> PackageManager {
    if let Some(manager) = self.package_manager.get() {
      debug!(manager = %manager, "package manager cached");
      return *manager;
    }
    let manager = *self.package_manager.get_or_init(|| {
      let path = self.env_var("PATH").map(OsString::from);
      PackageManager::detect_in(path, self.working_dir())
    });
    if manager == PackageManager::Unknown {
      warn!("no supported package manager found");
    } else {
      info!(manager = %manager, "detected package manager");
    }
    manager
  }

  fn manager_command(&self, manager: PackageManager, argv: &[&str]) -> Run<'_> {
    let run = self.command(argv[0]).args(&argv[1..]);
    if manager == PackageManager::Apt {
      run.env("DEBIAN_FRONTEND", "noninteractive")
    } else {
      run
    }
  }

  /// Whether the package manager reports `package` as installed.
  pub fn is_installed(&self, package: &str) -> bool {
    let manager = self.detect_package_manager();
    match manager.query_command() {
      Some(query) => self
        .command(query[0])
        .args(&query[1..])
        .arg(package)
        .ok(),
      None => false,
    }
  }

  /// Install `packages` with the detected manager.
  ///
  /// Packages already installed are skipped; when nothing is left to install
  /// no process is started. An empty list succeeds immediately.
  pub fn install(&self, packages: &[&str]) -> Outcome<Invocation> {
    if packages.is_empty() {
      return Outcome::Success(Invocation::noop(String::new()));
    }
    if let Err(failure) = validate(packages) {
      return Outcome::Failed(failure);
    }

    let manager = self.detect_package_manager();
    let Some(install) = manager.install_command() else {
      return Outcome::Failed(Failure::NoPackageManager);
    };

    let missing: Vec<&str> = packages
      .iter()
      .copied()
      .filter(|package| {
        let installed = self.is_installed(package);
        if installed {
          info!(package = %package, "already installed");
        }
        !installed
      })
      .collect();
    if missing.is_empty() {
      return Outcome::Success(Invocation::noop(String::new()));
    }

    if let Some(refresh) = manager.refresh_command() {
      let refreshed = self.manager_command(manager, refresh).privileged().run();
      if !refreshed.is_success() {
        return refreshed;
      }
    }

    self
      .manager_command(manager, install)
      .args(&missing)
      .privileged()
      .run()
  }

  /// Remove `package` and its configuration.
  pub fn purge(&self, package: &str) -> Outcome<Invocation> {
    if let Err(failure) = validate(&[package]) {
      return Outcome::Failed(failure);
    }
    let manager = self.detect_package_manager();
    let Some(purge) = manager.purge_command() else {
      return Outcome::Failed(Failure::NoPackageManager);
    };
    self.manager_command(manager, purge).arg(package).privileged().run()
  }

  /// Make sure `sudo` is available, installing it when missing.
  ///
  /// The install itself runs without `sudo`, so this only succeeds as root.
  pub fn ensure_sudo(&self) -> Outcome<Invocation> {
    if self.command_exists("sudo") {
      debug!("sudo already installed");
      return Outcome::Success(Invocation::noop(String::new()));
    }

    warn!("sudo is not installed, attempting to install it");
    let manager = self.detect_package_manager();
    let Some(install) = manager.install_command() else {
      return Outcome::Failed(Failure::NoPackageManager);
    };
    if let Some(refresh) = manager.refresh_command() {
      let refreshed = self.manager_command(manager, refresh).run();
      if !refreshed.is_success() {
        return refreshed;
      }
    }
    self.manager_command(manager, install).arg("sudo").run()
  }
}
