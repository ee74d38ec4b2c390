//! File subcommands.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use basher_lib::file::split_paths;
use basher_lib::{Failure, Outcome, Shell, Skip, WriteMode};

use crate::output::{OutputFormat, emit, emit_invocation, print_json, write_stdout};

pub fn cmd_read(shell: &Shell, path: &Path, output: OutputFormat) -> Result<u8> {
  if output.is_json() {
    return emit(shell.read_to_string(path), output, |_| Ok(()));
  }
  emit(shell.read_file(path).map(Bytes), output, |bytes| write_stdout(&bytes.0))
}

/// Raw bytes for text output. JSON output uses the UTF-8 view instead.
#[derive(serde::Serialize)]
struct Bytes(Vec<u8>);

/// Write `content`, or everything on stdin when no content is given.
pub fn cmd_write(shell: &Shell, path: &Path, content: Option<String>, append: bool, output: OutputFormat) -> Result<u8> {
  let content = match content {
    Some(content) => content.into_bytes(),
    None => {
      let mut buf = Vec::new();
      std::io::stdin().read_to_end(&mut buf).context("Failed to read stdin")?;
      buf
    }
  };
  let mode = if append { WriteMode::Append } else { WriteMode::Overwrite };
  emit(shell.write_to_file(path, content, mode), output, |_| Ok(()))
}

/// `find` prints one path per line, including for a partial failure.
pub fn cmd_find(shell: &Shell, dir: &Path, pattern: &str, output: OutputFormat) -> Result<u8> {
  let outcome = match shell.find(dir, pattern) {
    Outcome::Failed(Failure::Exit(mut invocation)) => {
      invocation.stdout = path_lines(&split_paths(&invocation.stdout));
      Outcome::Failed(Failure::Exit(invocation))
    }
    other => other,
  };
  emit(outcome, output, |paths: &Vec<PathBuf>| write_stdout(&path_lines(paths)))
}

fn path_lines(paths: &[PathBuf]) -> Vec<u8> {
  let mut out = Vec::new();
  for path in paths {
    out.extend_from_slice(path.as_os_str().as_encoded_bytes());
    out.push(b'\n');
  }
  out
}

pub fn cmd_tail(shell: &Shell, path: &Path, lines: usize, output: OutputFormat) -> Result<u8> {
  if output.is_json() {
    let text = shell.tail(path, lines).map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    return emit(text, output, |_| Ok(()));
  }
  emit(shell.tail(path, lines).map(Bytes), output, |bytes| write_stdout(&bytes.0))
}

/// Exit 0 when `pattern` matches, 1 when it does not and 2 when the file
/// cannot be searched, like `grep -q`.
pub fn cmd_grep(shell: &Shell, pattern: &str, path: &Path, ignore_case: bool, output: OutputFormat) -> Result<u8> {
  let resolved = shell.resolve(path);
  if !resolved.exists() {
    return emit::<bool>(Outcome::NotAttempted(Skip::Missing(resolved)), output, |_| Ok(()));
  }
  if !resolved.is_file() {
    return emit::<bool>(Outcome::NotAttempted(Skip::NotAFile(resolved)), output, |_| Ok(()));
  }
  let found = if ignore_case {
    shell.string_exists_in_file(path, pattern)
  } else {
    shell.string_in_file(path, pattern)
  };
  if output.is_json() {
    print_json(&serde_json::json!({ "found": found }))?;
  }
  Ok(if found { 0 } else { 1 })
}

pub fn cmd_replace(shell: &Shell, path: &Path, prefix: &str, replacement: &str, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.replace_in_file(path, prefix, replacement), output)
}

pub fn cmd_chmod(shell: &Shell, mode: &str, path: &Path, recursive: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.chmod(path, mode, recursive), output)
}

/// `owner` is `user` or `user:group`.
pub fn cmd_chown(shell: &Shell, owner: &str, path: &Path, recursive: bool, output: OutputFormat) -> Result<u8> {
  let (user, group) = match owner.split_once(':') {
    Some((user, group)) => (user, Some(group)),
    None => (owner, None),
  };
  emit_invocation(shell.chown(path, user, group, recursive), output)
}

pub fn cmd_cp(shell: &Shell, src: &Path, dst: &Path, recursive: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.copy(src, dst, recursive), output)
}

pub fn cmd_mv(shell: &Shell, src: &Path, dst: &Path, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.mv(src, dst), output)
}

pub fn cmd_rm(shell: &Shell, path: &Path, recursive: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.remove(path, recursive), output)
}

pub fn cmd_mkdir(shell: &Shell, path: &Path, exist_ok: bool, output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.mkdir(path, exist_ok), output)
}
