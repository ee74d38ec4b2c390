//! Child process execution and capture.
//!
//! One task multiplexes the child's stdout, stderr, exit and the optional
//! timeout so that whatever was written before a kill is still returned.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::outcome::{Invocation, STATUS_NOT_EXECUTABLE, STATUS_NOT_FOUND};

/// How long to keep draining pipes after a timeout kill.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Status reported when a killed child could not be reaped (128 + SIGKILL).
const STATUS_KILLED: i32 = 137;

const CHUNK: usize = 8192;

/// Everything needed to start one child process.
#[derive(Debug)]
pub(crate) struct Spawn {
  pub program: OsString,
  pub args: Vec<OsString>,
  pub cwd: PathBuf,
  pub env: Vec<(OsString, OsString)>,
  pub stdin: Option<Vec<u8>>,
  pub timeout: Option<Duration>,
  /// Echo captured bytes to the terminal as they arrive.
  pub tee: bool,
  /// Rendered command line, for the invocation record and logs.
  pub line: String,
}

/// Run the child to completion (or timeout) and capture its output.
///
/// A missing or non-executable program is reported the way a shell reports it
/// (status 127 / 126), not as an error. Other spawn failures are errors.
pub(crate) async fn capture(spec: Spawn) -> io::Result<Invocation> {
  let mut command = Command::new(&spec.program);
  command
    .args(&spec.args)
    .current_dir(&spec.cwd)
    .envs(spec.env.iter().map(|(k, v)| (k, v)))
    .stdin(if spec.stdin.is_some() {
      Stdio::piped()
    } else {
      Stdio::inherit()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

  // A separate process group lets a timeout kill the whole tree. It also takes
  // the child out of the terminal's foreground group, so only do it when a
  // timeout can actually fire.
  #[cfg(unix)]
  if spec.timeout.is_some() {
    command.process_group(0);
  }

  let program = spec.program.to_string_lossy().into_owned();
  let mut child = match command.spawn() {
    Ok(child) => child,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(program = %program, "program not found");
      return Ok(unlaunched(
        spec.line,
        STATUS_NOT_FOUND,
        format!("{}: command not found\n", program),
      ));
    }
    Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
      debug!(program = %program, "program not executable");
      return Ok(unlaunched(
        spec.line,
        STATUS_NOT_EXECUTABLE,
        format!("{}: Permission denied\n", program),
      ));
    }
    Err(e) => return Err(e),
  };

  if let (Some(bytes), Some(mut stdin)) = (spec.stdin, child.stdin.take()) {
    tokio::spawn(async move {
      // EPIPE when the child exits without reading everything is not an error.
      let _ = stdin.write_all(&bytes).await;
    });
  }

  let mut stdout = child
    .stdout
    .take()
    .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
  let mut stderr = child
    .stderr
    .take()
    .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

  let mut out = Vec::new();
  let mut err = Vec::new();
  let mut out_buf = [0u8; CHUNK];
  let mut err_buf = [0u8; CHUNK];
  let mut out_open = true;
  let mut err_open = true;
  let mut status: Option<ExitStatus> = None;

  let deadline = spec.timeout.map(|timeout| Instant::now() + timeout);
  let mut grace: Option<Instant> = None;
  let mut timed_out = false;

  while out_open || err_open || status.is_none() {
    tokio::select! {
      read = stdout.read(&mut out_buf), if out_open => match read? {
        0 => out_open = false,
        n => {
          if spec.tee {
            echo(&mut io::stdout(), &out_buf[..n]);
          }
          out.extend_from_slice(&out_buf[..n]);
        }
      },
      read = stderr.read(&mut err_buf), if err_open => match read? {
        0 => err_open = false,
        n => {
          if spec.tee {
            echo(&mut io::stderr(), &err_buf[..n]);
          }
          err.extend_from_slice(&err_buf[..n]);
        }
      },
      exited = child.wait(), if status.is_none() => {
        status = Some(exited?);
      },
      _ = sleep_until(deadline.unwrap_or_else(far_future)), if deadline.is_some() && !timed_out => {
        warn!(cmd = %spec.line, timeout = ?spec.timeout, "timeout elapsed, killing process group");
        timed_out = true;
        kill_tree(&mut child);
        grace = Some(Instant::now() + KILL_GRACE);
      },
      _ = sleep_until(grace.unwrap_or_else(far_future)), if grace.is_some() => {
        debug!(cmd = %spec.line, "pipes still open after kill, giving up on remaining output");
        break;
      },
    }
  }

  let status = match status {
    Some(status) => shell_status(status),
    None => match child.try_wait()? {
      Some(status) => shell_status(status),
      None => STATUS_KILLED,
    },
  };

  Ok(Invocation {
    command: spec.line,
    stdout: out,
    stderr: err,
    status,
    timed_out,
  })
}

fn unlaunched(line: String, status: i32, message: String) -> Invocation {
  Invocation {
    command: line,
    stdout: Vec::new(),
    stderr: message.into_bytes(),
    status,
    timed_out: false,
  }
}

/// Terminal echo is best effort; a closed terminal must not fail the command.
fn echo(stream: &mut impl Write, bytes: &[u8]) {
  let _ = stream.write_all(bytes);
  let _ = stream.flush();
}

fn far_future() -> Instant {
  Instant::now() + Duration::from_secs(60 * 60 * 24 * 365)
}

/// Map an exit status to the value a POSIX shell stores in `$?`.
pub(crate) fn shell_status(status: ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
      return 128 + signal;
    }
  }

  1
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
  use nix::sys::signal::{Signal, killpg};
  use nix::unistd::Pid;

  if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok())
    && killpg(Pid::from_raw(pid), Signal::SIGKILL).is_ok()
  {
    return;
  }
  let _ = child.start_kill();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
  let _ = child.start_kill();
}
