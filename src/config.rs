//! Command-line surface and the validated settings derived from it.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{CompileError, CompileResult};

/// Extension every input program must carry.
pub const SOURCE_EXTENSION: &str = "tt";

/// Where the generated C lands unless `--output` says otherwise.
pub const DEFAULT_OUTPUT: &str = "out.c";

#[derive(Debug, Parser)]
#[command(name = "teenyc", version, about = "Compile Teeny Tiny programs to C")]
pub struct Cli {
  /// Program to compile (must end in `.tt`)
  #[arg(short, long, value_name = "FILE")]
  pub file: PathBuf,

  /// Path of the generated C file
  #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
  pub output: PathBuf,

  /// Print the token stream instead of compiling
  #[arg(long)]
  pub dump_tokens: bool,

  /// Raise log verbosity (repeat for more)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,
}

impl Cli {
  pub fn into_config(self) -> Config {
    Config {
      input: self.file,
      output: self.output,
      dump_tokens: self.dump_tokens,
      verbosity: self.verbose,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub input: PathBuf,
  pub output: PathBuf,
  pub dump_tokens: bool,
  pub verbosity: u8,
}

impl Config {
  pub fn new(input: impl Into<PathBuf>) -> Self {
    Self {
      input: input.into(),
      output: PathBuf::from(DEFAULT_OUTPUT),
      dump_tokens: false,
      verbosity: 0,
    }
  }

  pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
    self.output = output.into();
    self
  }

  /// Reject inputs that are not `.tt` files before any work happens.
  pub fn validate(&self) -> CompileResult<()> {
    let has_extension = self
      .input
      .extension()
      .is_some_and(|ext| ext == SOURCE_EXTENSION);
    if !has_extension {
      return Err(CompileError::InvalidExtension {
        path: self.input.clone(),
      });
    }
    Ok(())
  }

  /// Default log filter for the chosen verbosity; `RUST_LOG` wins when set.
  pub fn log_filter(&self) -> &'static str {
    match self.verbosity {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    }
  }
}
