//! Names and defaults shared across the crate.

pub const APP_NAME: &str = "basher";

/// Environment variable holding the console verbosity (0, 1, 2...).
pub const ENV_VERBOSITY: &str = "BASHER_VERBOSITY";

/// Environment variable enabling dry-run mode when set to a truthy value.
pub const ENV_DRY_RUN: &str = "BASHER_DRY_RUN";

/// Environment variable holding a default per-command timeout, e.g. `30s`.
pub const ENV_TIMEOUT: &str = "BASHER_TIMEOUT";

/// Environment variable overriding the shell used for shell-string commands.
pub const ENV_SHELL: &str = "BASHER_SHELL";

/// Environment variable forcing (`1`) or disabling (`0`) the `sudo` prefix.
pub const ENV_SUDO: &str = "BASHER_SUDO";

/// Shell used for shell-string commands unless overridden.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Line count `tail` uses when the caller has no preference.
pub const DEFAULT_TAIL_LINES: usize = 20;

/// Prefix echoed before each command line at verbosity 1 and above.
pub const COMMAND_ECHO_PREFIX: &str = "CMD#";
