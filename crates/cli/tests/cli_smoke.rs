//! CLI smoke tests for basher.
//!
//! These tests verify that subcommands pass command output through unchanged
//! and map outcomes to the documented exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the basher binary, isolated from BASHER_* settings.
fn basher_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("basher");
  for var in ["BASHER_VERBOSITY", "BASHER_DRY_RUN", "BASHER_TIMEOUT", "BASHER_SHELL", "BASHER_SUDO"] {
    cmd.env_remove(var);
  }
  cmd
}

/// A basher command running in `dir`.
fn basher_in(dir: &TempDir) -> Command {
  let mut cmd = basher_cmd();
  cmd.arg("-C").arg(dir.path());
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  basher_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  basher_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("basher"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["run", "exec", "read", "write", "find", "tail", "archive", "install", "supervisor"] {
    basher_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn unknown_subcommand_fails() {
  basher_cmd().arg("frobnicate").assert().failure();
}

// =============================================================================
// Running commands
// =============================================================================

#[test]
fn run_passes_output_through() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["run", "printf 'out'; printf 'err' >&2"])
    .assert()
    .success()
    .stdout("out")
    .stderr(predicate::str::contains("err"));
}

#[test]
fn run_exits_with_command_status() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp).args(["run", "exit 7"]).assert().code(7);
}

#[test]
fn exec_missing_program_exits_127() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["exec", "definitely-not-a-command-xyz"])
    .assert()
    .code(127)
    .stderr(predicate::str::contains("command not found"));
}

#[test]
fn exec_does_not_use_a_shell() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["exec", "printf", "%s", "$HOME;"])
    .assert()
    .success()
    .stdout("$HOME;");
}

#[test]
fn run_in_missing_directory_is_not_attempted() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["run", "--cwd", "missing", "true"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("not attempted"));
}

#[test]
fn verbose_echoes_command_lines() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["-v", "exec", "echo", "hi there"])
    .assert()
    .success()
    .stdout("hi there\n")
    .stderr(predicate::str::contains("CMD# echo 'hi there'"));
}

#[test]
fn dry_run_executes_nothing() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["--dry-run", "exec", "touch", "created"])
    .assert()
    .success();
  assert!(!temp.path().join("created").exists());
}

#[test]
#[serial]
fn dry_run_from_environment() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .env("BASHER_DRY_RUN", "1")
    .args(["exec", "touch", "created"])
    .assert()
    .success();
  assert!(!temp.path().join("created").exists());
}

#[test]
fn timeout_flag_kills_long_commands() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["--timeout", "200ms", "run", "sleep 30"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("timed out"));
}

#[test]
fn missing_directory_flag_fails() {
  basher_cmd()
    .args(["-C", "/nonexistent/path_xyz_123", "run", "true"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn echo_prints_messages() {
  basher_cmd()
    .args(["echo", "hello", "--color", "red"])
    .assert()
    .success()
    .stdout("hello\n");
  basher_cmd()
    .args(["echo", "careful", "--level", "warning"])
    .assert()
    .success()
    .stderr(predicate::str::contains("⚠ careful"));
  basher_cmd()
    .args(["echo", "done", "--level", "success"])
    .assert()
    .success()
    .stdout("✓ done\n");
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn write_then_read_round_trips() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp).args(["write", "notes.txt", "first"]).assert().success();
  basher_in(&temp).args(["write", "--append", "notes.txt", "second"]).assert().success();
  basher_in(&temp)
    .args(["read", "notes.txt"])
    .assert()
    .success()
    .stdout("firstsecond");
}

#[test]
fn write_reads_stdin() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["write", "piped.txt"])
    .write_stdin("from stdin\n")
    .assert()
    .success();
  assert_eq!(std::fs::read(temp.path().join("piped.txt")).unwrap(), b"from stdin\n");
}

#[test]
fn read_missing_file_is_not_attempted() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp).args(["read", "missing.txt"]).assert().code(2);
}

#[test]
fn tail_prints_last_lines() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("log"), "1\n2\n3\n4\n").unwrap();
  basher_in(&temp)
    .args(["tail", "-n", "2", "log"])
    .assert()
    .success()
    .stdout("3\n4\n");
}

#[test]
fn find_prints_one_path_per_line() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("a.txt"), "").unwrap();
  std::fs::write(temp.path().join("b.md"), "").unwrap();
  basher_in(&temp)
    .args(["find", ".", "*.txt"])
    .assert()
    .success()
    .stdout(predicate::str::ends_with("a.txt\n"))
    .stdout(predicate::str::contains("b.md").not());
}

#[test]
fn find_output_matches_native_find() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("sub/deeper")).unwrap();
  for name in ["a.txt", "b.md", "sub/c.txt", "sub/deeper/d.txt"] {
    std::fs::write(temp.path().join(name), "").unwrap();
  }
  let native = std::process::Command::new("find")
    .args([".", "-name", "*.txt"])
    .current_dir(temp.path())
    .output()
    .unwrap();
  basher_in(&temp)
    .args(["find", ".", "*.txt"])
    .assert()
    .success()
    .stdout(native.stdout);
}

#[cfg(unix)]
#[test]
fn failed_find_keeps_partial_stdout() {
  use std::os::unix::fs::PermissionsExt;

  let temp = TempDir::new().unwrap();
  let bin = temp.path().join("bin");
  std::fs::create_dir(&bin).unwrap();
  let find = bin.join("find");
  std::fs::write(
    &find,
    "#!/bin/sh\nprintf '%s/a.txt\\0' \"$1\"\necho \"find: '$1/locked': Permission denied\" >&2\nexit 1\n",
  )
  .unwrap();
  std::fs::set_permissions(&find, std::fs::Permissions::from_mode(0o755)).unwrap();

  basher_in(&temp)
    .env("PATH", &bin)
    .args(["find", ".", "*.txt"])
    .assert()
    .code(1)
    .stdout("./a.txt\n")
    .stderr(predicate::str::contains("Permission denied"));
}

#[test]
fn grep_exit_code_reflects_match() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("conf"), "Listen 80\n").unwrap();
  basher_in(&temp).args(["grep", "Listen", "conf"]).assert().code(0);
  basher_in(&temp).args(["grep", "listen", "conf"]).assert().code(1);
  basher_in(&temp).args(["grep", "-i", "listen", "conf"]).assert().code(0);
}

#[test]
fn grep_on_unreadable_target_exits_two() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir(temp.path().join("dir")).unwrap();
  basher_in(&temp).args(["grep", "x", "missing.conf"]).assert().code(2);
  basher_in(&temp).args(["grep", "-i", "x", "dir"]).assert().code(2);
}

#[test]
fn sha256_without_dest_names_the_dest_flag() {
  basher_cmd()
    .args(["download", "file:///dev/null", "--sha256", &"0".repeat(64)])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("--sha256 requires --dest"));
}

#[test]
fn replace_rewrites_prefixed_lines() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join(".env"), "MODE=dev\nOTHER=1\n").unwrap();
  basher_in(&temp)
    .args(["replace", ".env", "MODE=", "MODE=prod"])
    .assert()
    .success();
  assert_eq!(
    std::fs::read_to_string(temp.path().join(".env")).unwrap(),
    "MODE=prod\nOTHER=1\n"
  );
}

#[test]
fn json_output_reports_state() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .args(["--output", "json", "run", "printf hi; exit 3"])
    .assert()
    .code(3)
    .stdout(predicate::str::contains("\"state\": \"failed\""))
    .stdout(predicate::str::contains("\"stdout\": \"hi\""));
}

// =============================================================================
// Archives & packages
// =============================================================================

#[test]
fn archive_and_extract_round_trip() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir(temp.path().join("site")).unwrap();
  std::fs::write(temp.path().join("site/index.html"), "<p>hi</p>").unwrap();

  basher_in(&temp)
    .args(["archive", "site", "out/site.tar.gz"])
    .assert()
    .success();
  basher_in(&temp)
    .args(["extract", "out/site.tar.gz", "restored"])
    .assert()
    .success();
  assert_eq!(
    std::fs::read(temp.path().join("restored/site/index.html")).unwrap(),
    b"<p>hi</p>"
  );
}

#[test]
fn unsupported_archive_format_fails() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("file"), "x").unwrap();
  basher_in(&temp)
    .args(["archive", "--format", "rar", "file", "file.rar"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("unsupported archive format"));
}

#[test]
fn install_without_package_manager_fails() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .env("PATH", temp.path())
    .args(["install", "curl"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no supported package manager"));
}

#[test]
fn supervisor_dry_run_prints_commands() {
  let temp = TempDir::new().unwrap();
  basher_in(&temp)
    .env("BASHER_SUDO", "0")
    .args(["-v", "--dry-run", "supervisor", "restart", "worker"])
    .assert()
    .success()
    .stderr(predicate::str::contains("CMD# supervisorctl restart worker"));
}
