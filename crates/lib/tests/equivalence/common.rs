//! Shared helpers for equivalence tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use basher_lib::{Shell, ShellConfig};
use tempfile::TempDir;

/// A shell rooted in its own temporary directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub shell: Shell,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let shell = Shell::new(ShellConfig::default().with_working_dir(temp.path())).unwrap();
    Self { temp, shell }
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the temp directory, creating parents.
  pub fn write_file(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Run a native tool directly in the temp directory.
  pub fn native(&self, program: &str, args: &[&str]) -> Output {
    native_in(self.temp.path(), program, args)
  }
}

pub fn native_in(dir: &Path, program: &str, args: &[&str]) -> Output {
  Command::new(program).args(args).current_dir(dir).output().unwrap()
}

pub fn have(tool: &str) -> bool {
  which::which(tool).is_ok()
}
