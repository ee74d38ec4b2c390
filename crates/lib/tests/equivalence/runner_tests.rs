//! Runner output and status match `/bin/sh -c`.

use basher_lib::quote;

use super::common::{TestEnv, native_in};

const SCRIPTS: &[&str] = &[
  "printf 'a\\nb\\n'",
  "printf 'no newline'",
  "printf '\\303\\251\\377'",
  "echo out; echo err >&2; exit 3",
  "exit 0",
  "false",
  "seq 1 5000",
  "definitely-not-a-command-xyz",
];

#[test]
fn shell_strings_match_native_sh() {
  let env = TestEnv::new();
  for script in SCRIPTS {
    let ours = env.shell.run(script);
    let native = native_in(env.temp.path(), "/bin/sh", &["-c", script]);

    let invocation = ours.invocation().unwrap();
    assert_eq!(invocation.stdout, native.stdout, "stdout of {}", script);
    assert_eq!(invocation.stderr, native.stderr, "stderr of {}", script);
    assert_eq!(Some(invocation.status), native.status.code(), "status of {}", script);
  }
}

#[test]
fn success_is_exactly_status_zero() {
  let env = TestEnv::new();
  for (script, expected) in [("exit 0", Some(true)), ("exit 1", Some(false)), ("exit 255", Some(false))] {
    assert_eq!(env.shell.run(script).as_bool(), expected, "{}", script);
  }
}

#[test]
fn quoted_values_are_single_tokens() {
  let env = TestEnv::new();
  for value in ["plain", "with space", "it's", "$HOME", "`id`", "a;b|c&d", "", "new\nline", "*"] {
    let script = format!("printf %s {}", quote(value));
    let invocation = env.shell.run(&script).ok().unwrap();
    assert_eq!(invocation.stdout, value.as_bytes(), "value {:?}", value);
  }
}

#[test]
fn argument_list_matches_native_exec() {
  let env = TestEnv::new();
  env.write_file("data.txt", "zeta\nalpha\nmid\n");
  let ours = env.shell.command("sort").arg("data.txt").run().ok().unwrap();
  let native = env.native("sort", &["data.txt"]);
  assert_eq!(ours.stdout, native.stdout);
}
