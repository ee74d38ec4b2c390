//! Levelled and coloured messages.

use anyhow::Result;
use clap::ValueEnum;

use basher_lib::{Color, Console, Level};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
  Info,
  Success,
  Warning,
  Error,
}

impl From<LevelArg> for Level {
  fn from(level: LevelArg) -> Self {
    match level {
      LevelArg::Info => Level::Info,
      LevelArg::Success => Level::Success,
      LevelArg::Warning => Level::Warning,
      LevelArg::Error => Level::Error,
    }
  }
}

/// Print `message` with a level symbol, or plain with an optional colour.
///
/// Unknown colour names print uncoloured.
pub fn cmd_echo(console: &Console, message: &str, color: Option<&str>, level: Option<LevelArg>) -> Result<u8> {
  match level {
    Some(level) => console.message(level.into(), message),
    None => console.echo(message, color.and_then(|name| name.parse::<Color>().ok()), "\n"),
  }
  Ok(0)
}
