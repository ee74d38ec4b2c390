//! POSIX shell quoting.
//!
//! Anything interpolated into a shell string must come out as exactly one
//! literal token. Values made only of characters the shell never treats
//! specially are left alone so rendered command lines stay readable.

use std::borrow::Cow;
use std::ffi::OsStr;

fn is_safe(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-' | '_')
}

/// Quote `value` so `sh` reads it back as a single word with the same bytes.
pub fn quote(value: &str) -> Cow<'_, str> {
  if value.is_empty() {
    return Cow::Borrowed("''");
  }
  if value.chars().all(is_safe) {
    return Cow::Borrowed(value);
  }
  // Close the quote, emit the apostrophe inside double quotes, reopen.
  Cow::Owned(format!("'{}'", value.replace('\'', r#"'"'"'"#)))
}

/// Render a program and its arguments as a copy-pasteable shell line.
pub fn render<I, S>(program: &OsStr, args: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  let mut line = quote(&program.to_string_lossy()).into_owned();
  for arg in args {
    line.push(' ');
    line.push_str(&quote(&arg.as_ref().to_string_lossy()));
  }
  line
}
