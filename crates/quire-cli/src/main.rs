//! quire binary.
//!
//! Reads `quire.toml` (or the path specified with `--config`), opens the
//! SQLite database the configured schema is bound to, runs one command and
//! prints its result as JSON on stdout. Logs go to stderr.

use anyhow::Context as _;
use clap::Parser;
use quire_cli::{Cli, execute, load_config};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let storage_cfg = load_config(&cli)?;

  let mut store = storage_cfg.open().context("failed to open store")?;

  let output = execute(&mut store, cli.command)?;
  println!("{}", serde_json::to_string_pretty(&output)?);

  store.close().context("failed to close store")?;
  Ok(())
}
