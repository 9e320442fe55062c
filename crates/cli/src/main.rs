mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{ConfigCommand, LedgerCommand, RunArgs};
use output::OutputFormat;

/// deployver - content-addressed versioning for multi-service deployments
#[derive(Parser)]
#[command(name = "deployver")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Directory holding the version ledger
  #[arg(long, global = true, env = "DEPLOYVER_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Hash, assign versions, record the ledger and write packages
  Run {
    #[command(flatten)]
    args: RunArgs,

    /// Record versions without writing packages
    #[arg(long)]
    no_package: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show which components changed and the versions they would get
  Plan {
    #[command(flatten)]
    args: RunArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Print content hashes of every application and service
  Hash {
    /// Tree descriptor listing applications and services
    #[arg(long)]
    tree: PathBuf,

    /// Package config document
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum services hashed in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Inspect recorded version maps
  #[command(subcommand)]
  Ledger(LedgerCommand),

  /// Inspect the package config document
  #[command(subcommand)]
  Config(ConfigCommand),
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let store = cli.store.unwrap_or_else(deployver_lib::platform::paths::ledger_dir);

  match cli.command {
    Commands::Run {
      args,
      no_package,
      output,
    } => cmd::cmd_run(&args, &store, !no_package, output),
    Commands::Plan { args, output } => cmd::cmd_plan(&args, &store, output),
    Commands::Hash {
      tree,
      config,
      jobs,
      output,
    } => cmd::cmd_hash(&tree, config.as_deref(), jobs, cli.verbose, output),
    Commands::Ledger(command) => cmd::cmd_ledger(command, &store),
    Commands::Config(command) => cmd::cmd_config(command),
  }
}
