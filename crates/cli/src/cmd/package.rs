//! Package manager subcommands.

use anyhow::Result;

use basher_lib::{Failure, Outcome, PackageManager, Shell};

use crate::output::{OutputFormat, emit, emit_invocation};

/// Print the detected package manager. Exits 1 when none was found.
pub fn cmd_detect(shell: &Shell, output: OutputFormat) -> Result<u8> {
  let outcome = match shell.detect_package_manager() {
    PackageManager::Unknown => Outcome::Failed(Failure::NoPackageManager),
    manager => Outcome::Success(manager),
  };
  emit(outcome, output, |manager| {
    println!("{}", manager);
    Ok(())
  })
}

pub fn cmd_install(shell: &Shell, packages: &[String], output: OutputFormat) -> Result<u8> {
  let packages: Vec<&str> = packages.iter().map(String::as_str).collect();
  emit_invocation(shell.install(&packages), output)
}

pub fn cmd_purge(shell: &Shell, package: &str, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.purge(package), output)
}
