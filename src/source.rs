//! Program text as seen by the lexer.
//!
//! The text always ends with a newline so the last statement is terminated
//! even when the file itself is not.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
  name: String,
  text: String,
}

impl Source {
  pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
    let mut text = text.into();
    text.push('\n');
    Self {
      name: name.into(),
      text,
    }
  }

  /// Display name used in diagnostics, usually the input path.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Resolve a byte offset into a 1-based line/column pair plus the text of
  /// that line (without its newline).
  pub fn line_at(&self, loc: usize) -> (usize, usize, &str) {
    let loc = loc.min(self.text.len());
    let head = &self.text[..loc];
    let line_start = head.rfind('\n').map_or(0, |idx| idx + 1);
    let line = head.matches('\n').count() + 1;
    let column = self.text[line_start..loc].chars().count() + 1;
    let line_text = self.text[line_start..]
      .split('\n')
      .next()
      .unwrap_or_default();
    (line, column, line_text)
  }
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}
