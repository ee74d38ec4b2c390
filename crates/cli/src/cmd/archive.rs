//! Archive, compression and download subcommands.

use std::path::Path;

use anyhow::Result;

use basher_lib::{ArchiveFormat, Failure, Outcome, Shell};

use crate::output::{OutputFormat, emit, emit_invocation, print_success};

pub fn cmd_archive(
  shell: &Shell,
  source: &Path,
  archive: &Path,
  format: Option<&str>,
  output: OutputFormat,
) -> Result<u8> {
  let format = match format {
    Some(name) => name.parse::<ArchiveFormat>(),
    None => ArchiveFormat::from_path(archive)
      .ok_or_else(|| Failure::UnsupportedFormat(archive.display().to_string())),
  };
  let outcome = match format {
    Ok(format) => shell.archive(source, archive, format),
    Err(failure) => Outcome::Failed(failure),
  };
  emit_invocation(outcome, output)
}

pub fn cmd_extract(shell: &Shell, archive: &Path, dest: &Path, format: Option<&str>, output: OutputFormat) -> Result<u8> {
  let outcome = match format.map(str::parse::<ArchiveFormat>).transpose() {
    Ok(format) => shell.extract(archive, dest, format),
    Err(failure) => Outcome::Failed(failure),
  };
  emit_invocation(outcome, output)
}

pub fn cmd_gzip(shell: &Shell, path: &Path, keep: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.gzip(path, keep), output)
}

pub fn cmd_gunzip(shell: &Shell, path: &Path, keep: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.gunzip(path, keep), output)
}

pub fn cmd_download(
  shell: &Shell,
  url: &str,
  dest: Option<&Path>,
  sha256: Option<&str>,
  output: OutputFormat,
) -> Result<u8> {
  match (dest, sha256) {
    (Some(dest), Some(sha256)) => emit(shell.download_verified(url, dest, sha256), output, |path| {
      print_success(&format!("verified {}", path.display()));
      Ok(())
    }),
    (None, Some(_)) => anyhow::bail!("--sha256 requires --dest"),
    (dest, None) => emit_invocation(shell.download(url, dest), output),
  }
}
