//! File operations.
//!
//! Reads and writes use direct I/O (`cat`, `>` and `>>` have no observable
//! behaviour beyond the bytes moved). Everything whose output format or
//! side effects belong to a specific tool (`find`, `tail`, `grep`, `sed`,
//! `cp`, `mv`, `rm`, `chmod`, `chown`, `mkdir`) runs that tool with an
//! argument list. Paths are passed after `--` wherever the tool accepts it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::DEFAULT_TAIL_LINES;
use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::shell::Shell;

/// How [`Shell::write_to_file`] treats existing content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
  /// Truncate first, like `>`.
  #[default]
  Overwrite,
  /// Add to the end, like `>>`.
  Append,
}

impl std::str::FromStr for WriteMode {
  type Err = Failure;

  /// Accepts the `open(2)`-style mode letters `w` and `a`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "w" => Ok(WriteMode::Overwrite),
      "a" => Ok(WriteMode::Append),
      other => Err(Failure::InvalidArgument(format!("write mode must be 'w' or 'a', got '{}'", other))),
    }
  }
}

impl Shell {
  /// Whether `path` exists, following symlinks (`[ -e path ]`).
  pub fn exists(&self, path: impl AsRef<Path>) -> bool {
    self.resolve(path).exists()
  }

  /// Whether `path` is a directory, following symlinks (`[ -d path ]`).
  pub fn folder_exists(&self, path: impl AsRef<Path>) -> bool {
    self.resolve(path).is_dir()
  }

  /// Contents of `path`, like `cat path`.
  pub fn read_file(&self, path: impl AsRef<Path>) -> Outcome<Vec<u8>> {
    let path = self.resolve(path);
    if !path.exists() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    match fs::read(&path) {
      Ok(bytes) => Outcome::Success(bytes),
      Err(e) => Outcome::Failed(Failure::io(&path, e)),
    }
  }

  /// Contents of `path` as UTF-8.
  pub fn read_to_string(&self, path: impl AsRef<Path>) -> Outcome<String> {
    let path = self.resolve(path);
    self.read_file(&path).and_then(|bytes| match String::from_utf8(bytes) {
      Ok(text) => Outcome::Success(text),
      Err(e) => Outcome::Failed(Failure::io(
        &path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, e),
      )),
    })
  }

  /// Write `content` exactly, like `printf %s content > path` (or `>>`).
  ///
  /// Creates the file when missing. Nothing is added to the content.
  pub fn write_to_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>, mode: WriteMode) -> Outcome<()> {
    let path = self.resolve(path);
    let content = content.as_ref();
    self.console().command(&format!(
      "<write {} bytes> {} {}",
      content.len(),
      if mode == WriteMode::Append { ">>" } else { ">" },
      crate::quote(&path.to_string_lossy())
    ));
    if self.config().dry_run {
      return Outcome::Success(());
    }

    let mut options = OpenOptions::new();
    match mode {
      WriteMode::Overwrite => options.write(true).create(true).truncate(true),
      WriteMode::Append => options.append(true).create(true),
    };

    let result = options.open(&path).and_then(|mut file| {
      file.write_all(content)?;
      file.flush()
    });
    match result {
      Ok(()) => {
        debug!(path = %path.display(), bytes = content.len(), ?mode, "wrote file");
        Outcome::Success(())
      }
      Err(e) => Outcome::Failed(Failure::io(&path, e)),
    }
  }

  /// Copy like `cp` (`cp -r` for a directory when `recursive`).
  ///
  /// A directory copied without `recursive` only creates the destination
  /// directory (`mkdir -p dst`).
  pub fn copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, recursive: bool) -> Outcome<Invocation> {
    let src = self.resolve(src);
    let dst = self.resolve(dst);
    if !src.exists() {
      return Outcome::NotAttempted(Skip::Missing(src));
    }

    if src.is_file() {
      self.command("cp").arg("--").arg(&src).arg(&dst).run()
    } else if src.is_dir() && recursive {
      self.command("cp").arg("-r").arg("--").arg(&src).arg(&dst).run()
    } else if src.is_dir() {
      self.command("mkdir").arg("-p").arg("--").arg(&dst).run()
    } else {
      Outcome::Failed(Failure::InvalidArgument(format!(
        "'{}' is neither a file nor a directory",
        src.display()
      )))
    }
  }

  /// Move or rename like `mv`.
  pub fn mv(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Outcome<Invocation> {
    let src = self.resolve(src);
    let dst = self.resolve(dst);
    if fs::symlink_metadata(&src).is_err() {
      return Outcome::NotAttempted(Skip::Missing(src));
    }
    self.command("mv").arg("--").arg(&src).arg(&dst).run()
  }

  /// Remove like `rm` (files and symlinks), `rm -rf` or `rmdir` (directories).
  pub fn remove(&self, path: impl AsRef<Path>, recursive: bool) -> Outcome<Invocation> {
    let path = self.resolve(path);
    let metadata = match fs::symlink_metadata(&path) {
      Ok(metadata) => metadata,
      Err(_) => return Outcome::NotAttempted(Skip::Missing(path)),
    };

    if metadata.is_dir() {
      if recursive {
        self.command("rm").arg("-rf").arg("--").arg(&path).run()
      } else {
        self.command("rmdir").arg("--").arg(&path).run()
      }
    } else {
      self.command("rm").arg("--").arg(&path).run()
    }
  }

  /// Create a directory and its parents (`mkdir -p`).
  ///
  /// With `exist_ok` false an existing path is not touched.
  pub fn mkdir(&self, path: impl AsRef<Path>, exist_ok: bool) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if !exist_ok && path.exists() {
      return Outcome::NotAttempted(Skip::AlreadyExists(path));
    }
    self.command("mkdir").arg("-p").arg("--").arg(&path).run()
  }

  /// Paths under `dir` whose name matches the glob `pattern`, in the order
  /// `find dir -name pattern` prints them.
  ///
  /// `dir` is passed on as given and `find` runs in the working directory, so
  /// a relative `dir` yields relative paths exactly like the native command.
  /// Results are read NUL-separated, so names containing newlines stay whole.
  pub fn find(&self, dir: impl AsRef<Path>, pattern: &str) -> Outcome<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let resolved = self.resolve(dir);
    if !resolved.is_dir() {
      return Outcome::NotAttempted(Skip::NotADirectory(resolved));
    }
    self
      .command("find")
      .arg(find_start(dir))
      .arg("-name")
      .arg(pattern)
      .arg("-print0")
      .run()
      .map(|invocation| split_paths(&invocation.stdout))
  }

  /// Change permissions like `chmod [-R] mode path`.
  ///
  /// `mode` is anything `chmod` accepts: `755`, `u+x`, `g-w,o=r`...
  pub fn chmod(&self, path: impl AsRef<Path>, mode: &str, recursive: bool) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if !path.exists() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    if mode.trim().is_empty() {
      return Outcome::Failed(Failure::InvalidArgument("empty mode".to_string()));
    }
    let mut run = self.command("chmod");
    if recursive {
      run = run.arg("-R");
    }
    run.arg("--").arg(mode).arg(&path).run()
  }

  /// Change ownership like `chown [-R] user[:group] path`.
  pub fn chown(
    &self,
    path: impl AsRef<Path>,
    user: &str,
    group: Option<&str>,
    recursive: bool,
  ) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if !path.exists() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    if user.trim().is_empty() {
      return Outcome::Failed(Failure::InvalidArgument("empty user".to_string()));
    }
    let owner = match group {
      Some(group) => format!("{}:{}", user, group),
      None => user.to_string(),
    };
    let mut run = self.command("chown");
    if recursive {
      run = run.arg("-R");
    }
    run.arg("--").arg(owner).arg(&path).run()
  }

  /// Whether `grep -q -e pattern -- path` would exit 0.
  ///
  /// `pattern` is a basic regular expression. A missing file, a directory or
  /// an absent pattern are all simply `false`.
  pub fn string_in_file(&self, path: impl AsRef<Path>, pattern: &str) -> bool {
    let path = self.resolve(path);
    if !path.is_file() {
      return false;
    }
    self
      .command("grep")
      .arg("-q")
      .arg("-e")
      .arg(pattern)
      .arg("--")
      .arg(&path)
      .ok()
  }

  /// Case-insensitive literal substring search. An empty needle always matches.
  pub fn string_exists_in_file(&self, path: impl AsRef<Path>, needle: &str) -> bool {
    match self.read_file(path) {
      Outcome::Success(bytes) => {
        let haystack = String::from_utf8_lossy(&bytes).to_lowercase();
        haystack.contains(&needle.to_lowercase())
      }
      _ => false,
    }
  }

  /// Replace every line starting with the literal `prefix` by `replacement`.
  ///
  /// Runs `sed -i 's/^<prefix>.*/<replacement>/'` with both sides escaped,
  /// so neither is interpreted as a regex or back-reference.
  pub fn replace_in_file(&self, path: impl AsRef<Path>, prefix: &str, replacement: &str) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if !path.exists() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    if !path.is_file() {
      return Outcome::NotAttempted(Skip::NotAFile(path));
    }
    if prefix.contains('\n') || replacement.contains('\n') {
      return Outcome::Failed(Failure::InvalidArgument(
        "sed substitutions cannot span lines".to_string(),
      ));
    }
    let script = format!(
      "s/^{}.*/{}/",
      escape_sed_pattern(prefix),
      escape_sed_replacement(replacement)
    );
    self.command("sed").arg("-i").arg("-e").arg(script).arg("--").arg(&path).run()
  }

  /// Last `lines` lines of `path`, byte-identical to `tail -n lines path`.
  pub fn tail(&self, path: impl AsRef<Path>, lines: usize) -> Outcome<Vec<u8>> {
    let path = self.resolve(path);
    if !path.exists() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    self
      .command("tail")
      .arg("-n")
      .arg(lines.to_string())
      .arg("--")
      .arg(&path)
      .run()
      .map(|invocation| invocation.stdout)
  }

  /// [`Shell::tail`] with the default line count.
  pub fn tail_default(&self, path: impl AsRef<Path>) -> Outcome<Vec<u8>> {
    self.tail(path, DEFAULT_TAIL_LINES)
  }
}

/// Split `-print0` output into paths, without decoding.
pub fn split_paths(stdout: &[u8]) -> Vec<PathBuf> {
  stdout
    .split(|b| *b == 0)
    .filter(|entry| !entry.is_empty())
    .map(bytes_to_path)
    .collect()
}

/// `find` has no `--`; a start point that looks like an option gets a `./` prefix.
fn find_start(dir: &Path) -> PathBuf {
  if dir.as_os_str().as_encoded_bytes().starts_with(b"-") {
    Path::new(".").join(dir)
  } else {
    dir.to_path_buf()
  }
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
  use std::os::unix::ffi::OsStrExt;
  PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
  PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Escape a literal for the pattern side of a sed `s///` (BRE).
fn escape_sed_pattern(literal: &str) -> String {
  let mut escaped = String::with_capacity(literal.len());
  for c in literal.chars() {
    if matches!(c, '\\' | '/' | '.' | '*' | '[' | ']' | '^' | '$') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

/// Escape a literal for the replacement side of a sed `s///`.
fn escape_sed_replacement(literal: &str) -> String {
  let mut escaped = String::with_capacity(literal.len());
  for c in literal.chars() {
    if matches!(c, '\\' | '/' | '&') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
