//! Crate root: wires together the compilation pipeline.
//!
//! Teeny Tiny programs are translated to C in a single pass:
//! - `tokenizer` hands out classified tokens on demand.
//! - `parser` validates the grammar and the few semantic rules, emitting C
//!   fragments as each rule is recognised.
//! - `emitter` keeps declarations apart from statements and joins them once
//!   the program is accepted.
//! - `error` centralises the diagnostics shared by the other modules.
//! - `config` and `source` cover the command line and program loading.

pub mod config;
pub mod emitter;
pub mod error;
pub mod parser;
pub mod source;
pub mod tokenizer;

use std::fs;
use std::io::{self, Write};

use snafu::ResultExt;
use tracing::info;

pub use config::{Cli, Config};
pub use emitter::Emitter;
pub use error::{CompileError, CompileResult, ErrorKind};
pub use source::Source;
pub use tokenizer::{Token, TokenKind};

/// Compile a program into an emitter holding the generated C.
pub fn compile(source: &Source) -> CompileResult<Emitter> {
  parser::parse(source)
}

/// Compile program text straight into a C translation unit.
pub fn generate_c(name: &str, text: &str) -> CompileResult<String> {
  let source = Source::new(name, text);
  compile(&source).map(Emitter::finish)
}

/// Read the configured input and either compile it to the output file or
/// dump its tokens to `out`. Nothing is written on failure.
pub fn run(config: &Config, out: &mut impl Write) -> CompileResult<()> {
  config.validate()?;

  let text = fs::read_to_string(&config.input).context(error::ReadSourceSnafu {
    path: &config.input,
  })?;
  let source = Source::new(config.input.display().to_string(), text);
  info!(input = %source, "compiling");

  if config.dump_tokens {
    let tokens = tokenizer::tokenize(&source)?;
    return write_tokens(&tokens, out).context(error::WriteOutputSnafu { path: "<stdout>" });
  }

  let emitter = compile(&source)?;
  emitter.write_file(&config.output)?;
  info!(output = %config.output.display(), "wrote output");
  Ok(())
}

/// One line per token: the kind, then the text for tokens that have one.
fn write_tokens(tokens: &[Token<'_>], out: &mut impl Write) -> io::Result<()> {
  for token in tokens {
    match token.kind {
      TokenKind::Newline | TokenKind::Eof => writeln!(out, "{}", token.kind)?,
      _ => writeln!(out, "{} {}", token.kind, token.text)?,
    }
  }
  Ok(())
}
