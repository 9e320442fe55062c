//! Implementation of the `deployver ledger` subcommands.
//!
//! `list` shows every recorded run, `show` prints one recorded version map.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use owo_colors::{OwoColorize, Stream};

use deployver_lib::ledger::{Ledger, LocalFileStore};
use deployver_lib::version::Version;

use crate::output::{OutputFormat, print_info, print_json, print_stat, symbols, truncate_hash};

#[derive(Subcommand)]
pub enum LedgerCommand {
  /// List recorded version maps, oldest first
  List {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Print the version map recorded for a Global version
  Show {
    /// Global version, e.g. v3-abc123
    version: Version,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

pub fn cmd_ledger(command: LedgerCommand, store: &Path) -> Result<()> {
  let ledger = Ledger::new(LocalFileStore::new(store));
  match command {
    LedgerCommand::List { output } => cmd_list(&ledger, output),
    LedgerCommand::Show { version, output } => cmd_show(&ledger, &version, output),
  }
}

fn cmd_list(ledger: &Ledger<LocalFileStore>, output: OutputFormat) -> Result<()> {
  let index = ledger.load_index().context("Failed to load ledger index")?;

  if output.is_json() {
    return print_json(&index);
  }

  if index.entries.is_empty() {
    print_info("No version maps recorded. Run 'deployver run' to record one.");
    return Ok(());
  }

  for entry in &index.entries {
    let name = entry.file_name();
    let is_current = index.current.as_deref() == Some(name.as_str());
    let marker = if is_current { " (current)" } else { "" };
    println!(
      "  {} {}{}  {} components, recorded at {}",
      symbols::INFO,
      name.if_supports_color(Stream::Stdout, |s| s.bold()),
      marker.if_supports_color(Stream::Stdout, |s| s.green()),
      entry.components,
      entry.recorded_at
    );
  }
  Ok(())
}

fn cmd_show(ledger: &Ledger<LocalFileStore>, version: &Version, output: OutputFormat) -> Result<()> {
  let Some(map) = ledger
    .load_map(version)
    .with_context(|| format!("Failed to load version map {}", version))?
  else {
    bail!("No version map recorded for {}", version);
  };

  if output.is_json() {
    return print_json(&map);
  }

  for (id, entry) in map.iter() {
    let hash = entry.hash.as_ref().map(|h| truncate_hash(h.as_str())).unwrap_or("-");
    println!("  {:<12} {:<32} {:<24} {}", entry.version_type, id, entry.version, hash);
  }
  println!();
  print_stat("Components", &map.len().to_string());
  Ok(())
}
