//! Output assembly for the generated C translation unit.
//!
//! Declarations must precede any statement that uses them, but the parser
//! discovers variables while it is already emitting statements. Text is
//! therefore split across two buffers and only joined once the whole program
//! has been accepted.

use std::fs;
use std::path::Path;

use snafu::ResultExt;
use tracing::debug;

use crate::error::{CompileResult, WriteOutputSnafu};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Emitter {
  header: String,
  code: String,
}

impl Emitter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append to the body without a line break.
  pub fn emit(&mut self, code: &str) {
    self.code.push_str(code);
  }

  pub fn emit_line(&mut self, code: &str) {
    self.code.push_str(code);
    self.code.push('\n');
  }

  /// Append a line to the header (preamble and declarations).
  pub fn header_line(&mut self, code: &str) {
    self.header.push_str(code);
    self.header.push('\n');
  }

  pub fn header(&self) -> &str {
    &self.header
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  /// Join header and body into the final translation unit.
  pub fn finish(self) -> String {
    let mut out = self.header;
    out.push_str(&self.code);
    out
  }

  /// Persist the translation unit with a single write.
  pub fn write_file(self, path: &Path) -> CompileResult<()> {
    let out = self.finish();
    debug!(path = %path.display(), bytes = out.len(), "writing output");
    fs::write(path, out).context(WriteOutputSnafu { path })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn header_precedes_body() {
    let mut emitter = Emitter::new();
    emitter.emit("x = ");
    emitter.header_line("#include <stdio.h>");
    emitter.emit_line("1;");
    emitter.header_line("float x;");
    assert_eq!(emitter.header(), "#include <stdio.h>\nfloat x;\n");
    assert_eq!(emitter.code(), "x = 1;\n");
    assert_eq!(emitter.finish(), "#include <stdio.h>\nfloat x;\nx = 1;\n");
  }

  #[test]
  fn write_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.c");
    let err = Emitter::new().write_file(&path).unwrap_err();
    assert!(err.to_string().contains("out.c"));
  }
}
