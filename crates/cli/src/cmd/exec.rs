//! Run commands and shell scripts.

use std::path::Path;

use anyhow::Result;

use basher_lib::Shell;

use crate::output::{OutputFormat, emit_invocation};

pub fn cmd_run(shell: &Shell, script: &str, dir: Option<&Path>, output: OutputFormat) -> Result<u8> {
  let outcome = match dir {
    Some(dir) => shell.execute_in_directory(script, dir),
    None => shell.run(script),
  };
  emit_invocation(outcome, output)
}

pub fn cmd_exec(shell: &Shell, program: &str, args: &[String], output: OutputFormat) -> Result<u8> {
  emit_invocation(shell.command(program).args(args).run(), output)
}
