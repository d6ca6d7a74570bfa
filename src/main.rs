use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use teenyc::{Cli, run};

fn init_logging(default_filter: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let config = Cli::parse().into_config();
  init_logging(config.log_filter());

  let stdout = io::stdout();
  match run(&config, &mut stdout.lock()) {
    Ok(()) if config.dump_tokens => {}
    Ok(()) => println!("Compiling complete!"),
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
