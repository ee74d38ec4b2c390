//! Archives, compression and downloads.
//!
//! Thin wrappers over `tar`, `zip`/`unzip`, `gzip`/`gunzip` and `curl`. The
//! format is declared (or inferred from the file name for extraction) and an
//! unsupported one fails before any process starts.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::outcome::{Failure, Invocation, Outcome, Skip};
use crate::shell::Shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
  TarGz,
  TarBz2,
  Zip,
}

impl ArchiveFormat {
  pub fn as_str(self) -> &'static str {
    match self {
      ArchiveFormat::TarGz => "tar.gz",
      ArchiveFormat::TarBz2 => "tar.bz2",
      ArchiveFormat::Zip => "zip",
    }
  }

  /// Infer the format from a file name (`.tar.gz`, `.tgz`, `.tar.bz2`, `.tbz2`, `.zip`).
  pub fn from_path(path: &Path) -> Option<Self> {
    let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
      Some(ArchiveFormat::TarGz)
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
      Some(ArchiveFormat::TarBz2)
    } else if name.ends_with(".zip") {
      Some(ArchiveFormat::Zip)
    } else {
      None
    }
  }

  fn tar_flag(self) -> Option<char> {
    match self {
      ArchiveFormat::TarGz => Some('z'),
      ArchiveFormat::TarBz2 => Some('j'),
      ArchiveFormat::Zip => None,
    }
  }
}

impl fmt::Display for ArchiveFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ArchiveFormat {
  type Err = Failure;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
      "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
      "tar.bz2" | "tbz2" => Ok(ArchiveFormat::TarBz2),
      "zip" => Ok(ArchiveFormat::Zip),
      other => Err(Failure::UnsupportedFormat(other.to_string())),
    }
  }
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
  let bytes = fs::read(path)?;
  let mut hasher = Sha256::new();
  hasher.update(&bytes);
  Ok(hex::encode(hasher.finalize()))
}

impl Shell {
  /// Pack `source` (a file or directory) into `archive`.
  ///
  /// The archive stores `source` under its own name, as
  /// `tar -czf archive -C parent name` does. The archive's parent directory
  /// is created first.
  pub fn archive(&self, source: impl AsRef<Path>, archive: impl AsRef<Path>, format: ArchiveFormat) -> Outcome<Invocation> {
    let source = self.resolve(source);
    let archive = self.resolve(archive);
    if !source.exists() {
      return Outcome::NotAttempted(Skip::Missing(source));
    }
    let (Some(parent), Some(name)) = (source.parent(), source.file_name()) else {
      return Outcome::Failed(Failure::InvalidArgument(format!(
        "cannot archive '{}'",
        source.display()
      )));
    };

    if let Some(dir) = archive.parent()
      && !dir.as_os_str().is_empty()
      && !dir.exists()
    {
      let created = self.mkdir(dir, true);
      if !created.is_success() {
        return created;
      }
    }

    match format.tar_flag() {
      Some(flag) => self
        .command("tar")
        .arg(format!("-c{}f", flag))
        .arg(&archive)
        .arg("-C")
        .arg(parent)
        .arg("--")
        .arg(name)
        .run(),
      None => {
        let mut run = self.command("zip").arg("-q");
        if source.is_dir() {
          run = run.arg("-r");
        }
        run.arg(&archive).arg(name).cwd(parent).run()
      }
    }
  }

  /// Unpack `archive` into `dest`, creating `dest` if needed.
  ///
  /// With `format` unset the format is inferred from the archive name.
  pub fn extract(
    &self,
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    format: Option<ArchiveFormat>,
  ) -> Outcome<Invocation> {
    let archive = self.resolve(archive);
    let dest = self.resolve(dest);
    let Some(format) = format.or_else(|| ArchiveFormat::from_path(&archive)) else {
      return Outcome::Failed(Failure::UnsupportedFormat(
        archive.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
      ));
    };
    if !archive.is_file() {
      return Outcome::NotAttempted(Skip::Missing(archive));
    }

    if !dest.exists() {
      let created = self.mkdir(&dest, true);
      if !created.is_success() {
        return created;
      }
    }

    match format.tar_flag() {
      Some(flag) => self
        .command("tar")
        .arg(format!("-x{}f", flag))
        .arg(&archive)
        .arg("-C")
        .arg(&dest)
        .run(),
      None => self.command("unzip").arg("-q").arg("-o").arg(&archive).arg("-d").arg(&dest).run(),
    }
  }

  /// Compress `path` to `path.gz` like `gzip [-k]`.
  pub fn gzip(&self, path: impl AsRef<Path>, keep_original: bool) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if !path.is_file() {
      return Outcome::NotAttempted(Skip::NotAFile(path));
    }
    let mut run = self.command("gzip");
    if keep_original {
      run = run.arg("-k");
    }
    run.arg("--").arg(&path).run()
  }

  /// Decompress `path` (which must end in `.gz`) like `gunzip [-k]`.
  pub fn gunzip(&self, path: impl AsRef<Path>, keep_original: bool) -> Outcome<Invocation> {
    let path = self.resolve(path);
    if path.extension().is_none_or(|ext| ext != "gz") {
      return Outcome::Failed(Failure::InvalidArgument(format!(
        "'{}' does not end in .gz",
        path.display()
      )));
    }
    if !path.is_file() {
      return Outcome::NotAttempted(Skip::Missing(path));
    }
    let mut run = self.command("gunzip");
    if keep_original {
      run = run.arg("-k");
    }
    run.arg("--").arg(&path).run()
  }

  /// Fetch `url` with `curl -fsSL`.
  ///
  /// With a destination the body goes to that file (parents created) and
  /// stdout is empty. Without one the body is the captured stdout.
  pub fn download(&self, url: &str, dest: Option<&Path>) -> Outcome<Invocation> {
    if url.trim().is_empty() {
      return Outcome::Failed(Failure::InvalidArgument("empty url".to_string()));
    }
    let mut run = self.command("curl").arg("-fsSL");
    if let Some(dest) = dest {
      run = run.arg("--create-dirs").arg("-o").arg(self.resolve(dest));
    }
    info!(url = %url, "downloading");
    run.arg("--").arg(url).run()
  }

  /// Download `url` to `dest` and check its SHA-256.
  ///
  /// A `dest` that already has the expected hash is kept and nothing is
  /// fetched. On mismatch the downloaded file is removed.
  pub fn download_verified(&self, url: &str, dest: impl AsRef<Path>, sha256: &str) -> Outcome<PathBuf> {
    let dest = self.resolve(dest);
    let expected = sha256.trim().to_ascii_lowercase();
    if expected.len() != 64 || !expected.bytes().all(|b| b.is_ascii_hexdigit()) {
      return Outcome::Failed(Failure::InvalidArgument(format!("'{}' is not a sha256 digest", sha256)));
    }

    if dest.is_file()
      && let Ok(actual) = sha256_file(&dest)
    {
      if actual == expected {
        debug!(path = %dest.display(), "existing file matches digest, skipping download");
        return Outcome::Success(dest);
      }
      debug!(expected = %expected, actual = %actual, "existing file digest differs, re-downloading");
    }

    let fetched = self.download(url, Some(dest.as_path()));
    if !fetched.is_success() || self.config().dry_run {
      return fetched.map(|_| dest);
    }

    let actual = match sha256_file(&dest) {
      Ok(actual) => actual,
      Err(e) => return Outcome::Failed(Failure::io(&dest, e)),
    };
    if actual != expected {
      warn!(url = %url, expected = %expected, actual = %actual, "checksum mismatch, removing download");
      if let Err(e) = fs::remove_file(&dest) {
        warn!(path = %dest.display(), error = %e, "failed to remove mismatched download");
      }
      return Outcome::Failed(Failure::ChecksumMismatch {
        url: url.to_string(),
        expected,
        actual,
      });
    }

    info!(path = %dest.display(), "download verified");
    Outcome::Success(dest)
  }
}
