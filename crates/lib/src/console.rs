//! Coloured, levelled terminal messages.
//!
//! Presentation only: nothing here has a native command it must reproduce.
//! Errors and warnings go to stderr, everything else to stdout. Colour is
//! emitted only when the target stream supports it.

use std::str::FromStr;

use owo_colors::{AnsiColors, OwoColorize, Stream};
use thiserror::Error;

use crate::consts::COMMAND_ECHO_PREFIX;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

/// Colours accepted by [`Console::echo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
  Black,
  Red,
  Green,
  Yellow,
  Blue,
  Magenta,
  Cyan,
  White,
}

impl Color {
  fn ansi(self) -> AnsiColors {
    match self {
      Color::Black => AnsiColors::Black,
      Color::Red => AnsiColors::Red,
      Color::Green => AnsiColors::Green,
      Color::Yellow => AnsiColors::Yellow,
      Color::Blue => AnsiColors::Blue,
      Color::Magenta => AnsiColors::Magenta,
      Color::Cyan => AnsiColors::Cyan,
      Color::White => AnsiColors::White,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown colour '{0}'")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
  type Err = UnknownColor;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "black" => Ok(Color::Black),
      "red" => Ok(Color::Red),
      "green" => Ok(Color::Green),
      "yellow" => Ok(Color::Yellow),
      "blue" => Ok(Color::Blue),
      "magenta" | "purple" => Ok(Color::Magenta),
      "cyan" => Ok(Color::Cyan),
      "white" => Ok(Color::White),
      other => Err(UnknownColor(other.to_string())),
    }
  }
}

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Success,
  Warning,
  Error,
}

impl Level {
  pub fn symbol(self) -> &'static str {
    match self {
      Level::Info => symbols::INFO,
      Level::Success => symbols::SUCCESS,
      Level::Warning => symbols::WARNING,
      Level::Error => symbols::ERROR,
    }
  }

  fn color(self) -> Color {
    match self {
      Level::Info => Color::Blue,
      Level::Success => Color::Green,
      Level::Warning => Color::Yellow,
      Level::Error => Color::Red,
    }
  }

  fn stream(self) -> Stream {
    match self {
      Level::Warning | Level::Error => Stream::Stderr,
      Level::Info | Level::Success => Stream::Stdout,
    }
  }
}

/// Uncoloured form of a levelled message, e.g. `✓ done`.
pub fn plain_line(level: Level, message: &str) -> String {
  format!("{} {}", level.symbol(), message)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
  verbosity: u8,
}

impl Console {
  pub fn new(verbosity: u8) -> Self {
    Self { verbosity }
  }

  pub fn verbosity(&self) -> u8 {
    self.verbosity
  }

  pub fn set_verbosity(&mut self, verbosity: u8) {
    self.verbosity = verbosity;
  }

  /// Print `message` followed by `end`, optionally coloured.
  pub fn echo(&self, message: &str, color: Option<Color>, end: &str) {
    match color {
      Some(color) => print!(
        "{}{}",
        message.if_supports_color(Stream::Stdout, |s| s.color(color.ansi())),
        end
      ),
      None => print!("{}{}", message, end),
    }
  }

  /// Like [`Console::echo`] but takes a colour name; unknown names print uncoloured.
  pub fn echo_named(&self, message: &str, color: &str, end: &str) {
    self.echo(message, color.parse().ok(), end);
  }

  pub fn message(&self, level: Level, message: &str) {
    let sym = level.symbol();
    let symbol = sym.if_supports_color(level.stream(), |s| s.color(level.color().ansi()));
    match level {
      Level::Warning | Level::Error => eprintln!(
        "{} {}",
        symbol,
        message.if_supports_color(Stream::Stderr, |s| s.color(level.color().ansi()))
      ),
      Level::Info | Level::Success => println!("{} {}", symbol, message),
    }
  }

  pub fn info(&self, message: &str) {
    self.message(Level::Info, message);
  }

  pub fn success(&self, message: &str) {
    self.message(Level::Success, message);
  }

  pub fn warning(&self, message: &str) {
    self.message(Level::Warning, message);
  }

  pub fn error(&self, message: &str) {
    self.message(Level::Error, message);
  }

  /// Echo a command line before it runs, at verbosity 1 and above.
  pub fn command(&self, line: &str) {
    if self.verbosity > 0 {
      eprintln!(
        "{} {}",
        COMMAND_ECHO_PREFIX.if_supports_color(Stream::Stderr, |s| s.yellow()),
        line
      );
    }
  }
}
