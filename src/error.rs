//! Shared error utilities used across the compilation pipeline.
//!
//! Every failure is fatal: the first error aborts compilation and bubbles up
//! to the driver. Located diagnostics point at the offending byte with a
//! caret under the source line.

use std::fmt;
use std::io;
use std::path::PathBuf;

use snafu::Snafu;

use crate::config::SOURCE_EXTENSION;
use crate::source::Source;

pub type CompileResult<T> = Result<T, CompileError>;

/// Coarse error taxonomy, one entry per compilation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Lexical,
  Syntax,
  Semantic,
  Io,
}

/// Where in the program a diagnostic applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
  pub file: String,
  pub line: usize,
  pub column: usize,
  pub line_text: String,
}

impl Position {
  pub fn locate(source: &Source, loc: usize) -> Self {
    let (line, column, line_text) = source.line_at(loc);
    Self {
      file: source.name().to_string(),
      line,
      column,
      line_text: line_text.to_string(),
    }
  }

  /// The offending line followed by a caret under the reported column.
  pub fn snippet(&self) -> String {
    let marker = format!("{}^", " ".repeat(self.column - 1));
    format!("    {}\n    {marker}", self.line_text)
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.file, self.line, self.column)
  }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("{pos}: lexing error: {message}\n{}", pos.snippet()))]
  Lexical { pos: Position, message: String },

  #[snafu(display("{pos}: parsing error: {message}\n{}", pos.snippet()))]
  Syntax { pos: Position, message: String },

  #[snafu(display("{pos}: semantic error: {message}\n{}", pos.snippet()))]
  Semantic { pos: Position, message: String },

  #[snafu(display(
    "invalid source file {}: expected a `.{}` extension",
    path.display(),
    SOURCE_EXTENSION
  ))]
  InvalidExtension { path: PathBuf },

  #[snafu(display("error reading {}: {source}", path.display()))]
  ReadSource { path: PathBuf, source: io::Error },

  #[snafu(display("error writing {}: {source}", path.display()))]
  WriteOutput { path: PathBuf, source: io::Error },
}

impl CompileError {
  /// Construct a lexing error anchored at a byte offset in the source.
  pub fn lexical(source: &Source, loc: usize, message: impl Into<String>) -> Self {
    Self::Lexical {
      pos: Position::locate(source, loc),
      message: message.into(),
    }
  }

  pub fn syntax(source: &Source, loc: usize, message: impl Into<String>) -> Self {
    Self::Syntax {
      pos: Position::locate(source, loc),
      message: message.into(),
    }
  }

  pub fn semantic(source: &Source, loc: usize, message: impl Into<String>) -> Self {
    Self::Semantic {
      pos: Position::locate(source, loc),
      message: message.into(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Lexical { .. } => ErrorKind::Lexical,
      Self::Syntax { .. } => ErrorKind::Syntax,
      Self::Semantic { .. } => ErrorKind::Semantic,
      Self::InvalidExtension { .. } | Self::ReadSource { .. } | Self::WriteOutput { .. } => {
        ErrorKind::Io
      }
    }
  }

  /// Bare message without location, for located errors.
  pub fn message(&self) -> Option<&str> {
    match self {
      Self::Lexical { message, .. }
      | Self::Syntax { message, .. }
      | Self::Semantic { message, .. } => Some(message),
      _ => None,
    }
  }

  pub fn position(&self) -> Option<&Position> {
    match self {
      Self::Lexical { pos, .. } | Self::Syntax { pos, .. } | Self::Semantic { pos, .. } => {
        Some(pos)
      }
      _ => None,
    }
  }
}
