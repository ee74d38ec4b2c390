//! `supervisorctl` control.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use basher_lib::Shell;
use basher_lib::supervisor::DEFAULT_CONFIG;

use crate::output::{OutputFormat, emit_invocation};

#[derive(Debug, Subcommand)]
pub enum SupervisorAction {
  /// Start supervisord with a configuration file
  Init {
    #[arg(default_value = DEFAULT_CONFIG)]
    config: PathBuf,
  },
  /// Start one program, or all when none is given
  Start { program: Option<String> },
  /// Stop one program, or all when none is given
  Stop { program: Option<String> },
  /// Restart one program, or all when none is given
  Restart { program: Option<String> },
  /// Show program status
  Status,
  /// Reload configuration files
  Reread,
  /// Apply configuration changes
  Update,
}

pub fn cmd_supervisor(shell: &Shell, action: SupervisorAction, output: OutputFormat) -> Result<u8> {
  let supervisor = shell.supervisor();
  let outcome = match action {
    SupervisorAction::Init { config } => supervisor.init(config),
    SupervisorAction::Start { program: Some(name) } => supervisor.start_program(&name),
    SupervisorAction::Start { program: None } => supervisor.start_all(),
    SupervisorAction::Stop { program: Some(name) } => supervisor.stop_program(&name),
    SupervisorAction::Stop { program: None } => supervisor.stop_all(),
    SupervisorAction::Restart { program: Some(name) } => supervisor.restart_program(&name),
    SupervisorAction::Restart { program: None } => supervisor.restart_all(),
    SupervisorAction::Status => supervisor.status(),
    SupervisorAction::Reread => supervisor.reread(),
    SupervisorAction::Update => supervisor.update(),
  };
  emit_invocation(outcome, output)
}
