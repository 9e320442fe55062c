//! Implementation of the `deployver run` command.
//!
//! Hashes the tree, assigns versions against the deployed map, records the
//! new map in the ledger and writes the selected packages.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use deployver_lib::pipeline::run;

use super::inputs::{RunArgs, print_report, report_failure};
use crate::output::OutputFormat;

pub fn cmd_run(args: &RunArgs, store: &Path, package: bool, output: OutputFormat) -> Result<()> {
  let started = Instant::now();
  let inputs = args.load(store, package)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(run(&inputs.tree, &inputs.config, &inputs.ledger, &inputs.options))
    .map_err(report_failure)?;

  let packaged: Vec<&Path> = report.packaged.iter().map(|p| p.as_path()).collect();
  print_report(&report, &packaged, started, output.is_json())
}
