mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use basher_lib::consts::{APP_NAME, DEFAULT_TAIL_LINES};
use basher_lib::{Shell, ShellConfig};

use cmd::*;
use output::{OutputFormat, print_error};

/// basher - shell commands with command-equivalent results
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Echo each command line before running it (-vv for debug logs)
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  /// Print commands instead of running them
  #[arg(long, global = true)]
  dry_run: bool,

  /// Run as if started in this directory
  #[arg(short = 'C', long = "directory", global = true)]
  directory: Option<PathBuf>,

  /// Kill commands that run longer than this (e.g. 30s, 5m)
  #[arg(long, global = true, value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a script through the configured shell
  Run {
    script: String,

    /// Directory to run in
    #[arg(long)]
    cwd: Option<PathBuf>,
  },

  /// Run a program with arguments, without a shell
  Exec {
    program: String,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
  },

  /// Print a file (cat)
  Read { path: PathBuf },

  /// Write text to a file, or stdin when no text is given
  Write {
    path: PathBuf,

    content: Option<String>,

    /// Append instead of truncating
    #[arg(short, long)]
    append: bool,
  },

  /// List paths matching a name pattern (find DIR -name PATTERN)
  Find { dir: PathBuf, pattern: String },

  /// Print the last lines of a file
  Tail {
    path: PathBuf,

    #[arg(short = 'n', long, default_value_t = DEFAULT_TAIL_LINES)]
    lines: usize,
  },

  /// Exit 0 if a file contains a pattern (grep -q)
  Grep {
    pattern: String,

    path: PathBuf,

    /// Case-insensitive literal match instead of a regular expression
    #[arg(short, long)]
    ignore_case: bool,
  },

  /// Replace every line starting with PREFIX
  Replace {
    path: PathBuf,
    prefix: String,
    replacement: String,
  },

  /// Change file permissions
  Chmod {
    mode: String,

    path: PathBuf,

    #[arg(short = 'R', long)]
    recursive: bool,
  },

  /// Change file owner (USER or USER:GROUP)
  Chown {
    owner: String,

    path: PathBuf,

    #[arg(short = 'R', long)]
    recursive: bool,
  },

  /// Copy a file or directory
  Cp {
    src: PathBuf,

    dst: PathBuf,

    #[arg(short, long)]
    recursive: bool,
  },

  /// Move or rename
  Mv { src: PathBuf, dst: PathBuf },

  /// Remove a file or directory
  Rm {
    path: PathBuf,

    #[arg(short, long)]
    recursive: bool,
  },

  /// Create a directory and its parents
  Mkdir {
    path: PathBuf,

    /// Do nothing when the path already exists
    #[arg(long)]
    exist_ok: bool,
  },

  /// Create an archive (tar.gz, tar.bz2, zip)
  Archive {
    source: PathBuf,

    archive: PathBuf,

    /// Archive format, inferred from the archive name when omitted
    #[arg(short, long)]
    format: Option<String>,
  },

  /// Extract an archive
  Extract {
    archive: PathBuf,

    #[arg(default_value = ".")]
    dest: PathBuf,

    #[arg(short, long)]
    format: Option<String>,
  },

  /// Compress a file to FILE.gz
  Gzip {
    path: PathBuf,

    /// Keep the original file
    #[arg(short, long)]
    keep: bool,
  },

  /// Decompress a .gz file
  Gunzip {
    path: PathBuf,

    #[arg(short, long)]
    keep: bool,
  },

  /// Fetch a URL to stdout or a file
  Download {
    url: String,

    /// Destination file
    #[arg(short = 'O', long = "dest")]
    dest: Option<PathBuf>,

    /// Expected SHA-256 of the downloaded file
    #[arg(long)]
    sha256: Option<String>,
  },

  /// Print the detected package manager
  Detect,

  /// Install packages with the system package manager
  Install {
    #[arg(required = true)]
    packages: Vec<String>,
  },

  /// Remove a package and its configuration
  Purge { package: String },

  /// Print a message, optionally coloured or with a level symbol
  Echo {
    message: String,

    /// Colour name (red, green, yellow, blue, purple, cyan, white, black)
    #[arg(long)]
    color: Option<String>,

    /// Print as a levelled message instead
    #[arg(long, value_enum, conflicts_with = "color")]
    level: Option<LevelArg>,
  },

  /// Control supervisord programs
  Supervisor {
    #[command(subcommand)]
    action: SupervisorAction,
  },
}

fn init_tracing(verbose: u8) {
  let default = if verbose > 1 { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn build_shell(cli: &Cli) -> Result<Shell> {
  let mut config = ShellConfig::from_env();
  if cli.verbose > 0 {
    config = config.with_verbosity(cli.verbose);
  }
  if cli.dry_run {
    config = config.with_dry_run(true);
  }
  if let Some(dir) = &cli.directory {
    config = config.with_working_dir(dir);
  }
  if cli.timeout.is_some() {
    config = config.with_timeout(cli.timeout);
  }
  debug!(?config, "shell configuration");
  Shell::new(config).context("Failed to initialize shell")
}

fn run(cli: Cli) -> Result<u8> {
  let shell = build_shell(&cli)?;
  let output = cli.output;

  match cli.command {
    Commands::Run { script, cwd } => cmd_run(&shell, &script, cwd.as_deref(), output),
    Commands::Exec { program, args } => cmd_exec(&shell, &program, &args, output),
    Commands::Read { path } => cmd_read(&shell, &path, output),
    Commands::Write { path, content, append } => cmd_write(&shell, &path, content, append, output),
    Commands::Find { dir, pattern } => cmd_find(&shell, &dir, &pattern, output),
    Commands::Tail { path, lines } => cmd_tail(&shell, &path, lines, output),
    Commands::Grep {
      pattern,
      path,
      ignore_case,
    } => cmd_grep(&shell, &pattern, &path, ignore_case, output),
    Commands::Replace {
      path,
      prefix,
      replacement,
    } => cmd_replace(&shell, &path, &prefix, &replacement, output),
    Commands::Chmod { mode, path, recursive } => cmd_chmod(&shell, &mode, &path, recursive, output),
    Commands::Chown { owner, path, recursive } => cmd_chown(&shell, &owner, &path, recursive, output),
    Commands::Cp { src, dst, recursive } => cmd_cp(&shell, &src, &dst, recursive, output),
    Commands::Mv { src, dst } => cmd_mv(&shell, &src, &dst, output),
    Commands::Rm { path, recursive } => cmd_rm(&shell, &path, recursive, output),
    Commands::Mkdir { path, exist_ok } => cmd_mkdir(&shell, &path, exist_ok, output),
    Commands::Archive {
      source,
      archive,
      format,
    } => cmd_archive(&shell, &source, &archive, format.as_deref(), output),
    Commands::Extract { archive, dest, format } => cmd_extract(&shell, &archive, &dest, format.as_deref(), output),
    Commands::Gzip { path, keep } => cmd_gzip(&shell, &path, keep, output),
    Commands::Gunzip { path, keep } => cmd_gunzip(&shell, &path, keep, output),
    Commands::Download { url, dest, sha256 } => {
      cmd_download(&shell, &url, dest.as_deref(), sha256.as_deref(), output)
    }
    Commands::Detect => cmd_detect(&shell, output),
    Commands::Install { packages } => cmd_install(&shell, &packages, output),
    Commands::Purge { package } => cmd_purge(&shell, &package, output),
    Commands::Echo { message, color, level } => cmd_echo(shell.console(), &message, color.as_deref(), level),
    Commands::Supervisor { action } => cmd_supervisor(&shell, action, output),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(code) => ExitCode::from(code),
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::from(output::EXIT_FAILED)
    }
  }
}
