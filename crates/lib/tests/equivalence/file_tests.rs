//! File operations match their native commands byte for byte.

use basher_lib::{Outcome, WriteMode};

use super::common::TestEnv;

#[test]
fn write_then_read_is_lossless() {
  let env = TestEnv::new();
  let content: Vec<u8> = (0u8..=255).chain(b"\r\n\n".iter().copied()).collect();
  env.shell.write_to_file("all-bytes", &content, WriteMode::Overwrite).ok().unwrap();
  assert_eq!(env.shell.read_file("all-bytes").ok().unwrap(), content);

  let cat = env.native("cat", &["all-bytes"]);
  assert_eq!(cat.stdout, content);
}

#[test]
fn append_matches_shell_redirection() {
  let env = TestEnv::new();
  env.shell.write_to_file("ours", "", WriteMode::Overwrite).ok().unwrap();
  env.shell.write_to_file("ours", "a", WriteMode::Append).ok().unwrap();
  env.shell.write_to_file("ours", "b", WriteMode::Append).ok().unwrap();

  env.native("/bin/sh", &["-c", ": > native; printf a >> native; printf b >> native"]);
  assert_eq!(std::fs::read(env.path("ours")).unwrap(), b"ab");
  assert_eq!(std::fs::read(env.path("ours")).unwrap(), std::fs::read(env.path("native")).unwrap());
}

#[test]
fn find_order_matches_native() {
  let env = TestEnv::new();
  for name in ["a.txt", "b.txt", "c.md", "sub/d.txt", "sub/deeper/e.txt", "sub/f.log"] {
    env.write_file(name, "x");
  }
  let dir = env.temp.path().to_string_lossy().into_owned();
  let found = env.shell.find(env.temp.path(), "*.txt").ok().unwrap();
  let native = env.native("find", &[&dir, "-name", "*.txt"]);

  let expected: Vec<String> = String::from_utf8(native.stdout).unwrap().lines().map(str::to_string).collect();
  let ours: Vec<String> = found.iter().map(|p| p.to_string_lossy().into_owned()).collect();
  assert_eq!(ours, expected);
  assert_eq!(ours.len(), 4);
  assert!(!ours.iter().any(|p| p.ends_with("c.md")));
}

/// One path per line, the way `find` itself prints them.
fn render(paths: &[std::path::PathBuf]) -> Vec<u8> {
  let mut out = Vec::new();
  for path in paths {
    out.extend_from_slice(path.as_os_str().as_encoded_bytes());
    out.push(b'\n');
  }
  out
}

#[test]
fn find_relative_dir_is_byte_identical() {
  let env = TestEnv::new();
  for name in ["a.txt", "c.md", "sub/b.txt", "sub/deeper/e.txt"] {
    env.write_file(name, "x");
  }
  for dir in [".", "sub", "./sub/deeper"] {
    let found = env.shell.find(dir, "*.txt").ok().unwrap();
    let native = env.native("find", &[dir, "-name", "*.txt"]);
    assert_eq!(render(&found), native.stdout, "find {} -name '*.txt'", dir);
  }
}

#[test]
fn tail_is_byte_identical() {
  let env = TestEnv::new();
  let content: String = (1..=10).map(|i| format!("line {}\n", i)).collect();
  env.write_file("ten.log", content);
  for n in [0usize, 1, 3, 10, 50] {
    let ours = env.shell.tail("ten.log", n).ok().unwrap();
    let native = env.native("tail", &["-n", &n.to_string(), "ten.log"]);
    assert_eq!(ours, native.stdout, "tail -n {}", n);
  }
}

#[test]
fn string_in_file_agrees_with_grep() {
  let env = TestEnv::new();
  env.write_file("conf", "listen 80;\nserver_name example.com;\n");
  for pattern in ["listen", "needle", "example\\.com", "^server", "80;$", "[0-9]\\{3\\}"] {
    let native = env.native("grep", &["-q", "-e", pattern, "--", "conf"]);
    assert_eq!(env.shell.string_in_file("conf", pattern), native.status.success(), "{}", pattern);
  }
  assert!(!env.shell.string_in_file("missing", "listen"));
}

#[test]
fn replace_in_file_matches_native_sed() {
  let env = TestEnv::new();
  let original = "DB_HOST=old\nDB_HOST_RO=old\nDB_PORT=5432\n";
  env.write_file("ours.env", original);
  env.write_file("native.env", original);

  env.shell.replace_in_file("ours.env", "DB_HOST=", "DB_HOST=db.internal").ok().unwrap();
  env.native("sed", &["-i", "s/^DB_HOST=.*/DB_HOST=db.internal/", "native.env"]);
  assert_eq!(
    std::fs::read(env.path("ours.env")).unwrap(),
    std::fs::read(env.path("native.env")).unwrap()
  );
}

#[test]
fn copy_move_remove_mirror_native_side_effects() {
  let env = TestEnv::new();
  env.write_file("tree/a/one.txt", "1");
  env.write_file("tree/b/two.txt", "2");

  env.shell.copy("tree", "copied", true).ok().unwrap();
  env.native("cp", &["-r", "tree", "native-copied"]);
  let listing = |dir: &str| {
    let text = String::from_utf8(env.native("find", &[dir]).stdout).unwrap();
    let mut lines: Vec<String> = text.lines().map(|l| l.trim_start_matches(dir).to_string()).collect();
    lines.sort();
    lines
  };
  assert_eq!(listing("copied"), listing("native-copied"));

  env.shell.mv("copied", "moved").ok().unwrap();
  assert!(!env.path("copied").exists());
  assert!(env.path("moved/a/one.txt").is_file());

  env.shell.remove("moved", true).ok().unwrap();
  assert!(!env.path("moved").exists());
}

#[test]
fn missing_targets_are_not_attempted() {
  let env = TestEnv::new();
  assert!(matches!(env.shell.read_file("nope"), Outcome::NotAttempted(_)));
  assert!(env.shell.tail("nope", 3).is_not_attempted());
  assert!(env.shell.chmod("nope", "644", false).is_not_attempted());
  assert!(env.shell.remove("nope", true).is_not_attempted());
  assert!(env.shell.mv("nope", "elsewhere").is_not_attempted());
}

#[test]
fn leading_dash_paths_are_not_options() {
  let env = TestEnv::new();
  env.write_file("-rf", "careful");
  assert!(env.shell.copy("-rf", "-copy", false).is_success());
  assert_eq!(std::fs::read(env.path("-copy")).unwrap(), b"careful");
  assert!(env.shell.tail("-rf", 1).is_success());
  assert!(env.shell.remove("-rf", false).is_success());
  assert!(!env.path("-rf").exists());
}

#[cfg(unix)]
#[test]
fn chmod_matches_native_modes() {
  use std::os::unix::fs::PermissionsExt;
  let env = TestEnv::new();
  env.write_file("ours", "x");
  env.write_file("native", "x");
  for mode in ["600", "u+x,g=r", "a-w", "755"] {
    env.shell.chmod("ours", mode, false).ok().unwrap();
    env.native("chmod", &[mode, "native"]);
    let ours = std::fs::metadata(env.path("ours")).unwrap().permissions().mode();
    let native = std::fs::metadata(env.path("native")).unwrap().permissions().mode();
    assert_eq!(ours, native, "mode {}", mode);
  }
}
