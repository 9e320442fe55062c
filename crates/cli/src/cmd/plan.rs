//! Implementation of the `deployver plan` command.
//!
//! Runs hashing and assignment without recording anything or writing packages.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use deployver_lib::pipeline::plan;

use super::inputs::{RunArgs, print_report, report_failure};
use crate::output::{OutputFormat, print_info};

pub fn cmd_plan(args: &RunArgs, store: &Path, output: OutputFormat) -> Result<()> {
  let started = Instant::now();
  let inputs = args.load(store, false)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(plan(&inputs.tree, &inputs.config, &inputs.ledger, &inputs.options))
    .map_err(report_failure)?;

  let destinations: Vec<&Path> = report.tasks.iter().map(|t| t.destination.as_path()).collect();
  print_report(&report, &destinations, started, output.is_json())?;

  if !output.is_json() && report.assignment.is_unchanged() && !report.first_deployment {
    print_info("No application or service changed since the deployed version.");
  }
  Ok(())
}
