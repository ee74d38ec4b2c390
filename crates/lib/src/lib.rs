//! basher-lib: shell command wrappers with command-equivalent results
//!
//! Every operation mirrors a native Unix command: the bytes it returns as
//! output are the bytes that command writes to stdout, and it succeeds exactly
//! when that command exits 0.
//! - `Shell`: the instance that runs commands, owns the working directory and
//!   caches the package manager
//! - `Outcome`: `Success`, `Failed` or `NotAttempted` result of every operation
//! - `Invocation`: captured stdout, stderr and exit status of one process

pub mod archive;
pub mod config;
pub mod console;
pub mod consts;
pub mod file;
pub mod outcome;
pub mod package;
pub mod quote;
pub mod shell;
pub mod supervisor;
pub mod system;

pub use archive::ArchiveFormat;
pub use config::{ShellConfig, SudoMode};
pub use console::{Color, Console, Level};
pub use file::WriteMode;
pub use outcome::{Failure, Invocation, Outcome, Skip};
pub use package::PackageManager;
pub use quote::quote;
pub use shell::{Run, Shell, ShellError};
pub use supervisor::Supervisor;
