//! Implementation of the `deployver hash` command.
//!
//! Prints the content hash of every service and application in a tree, plus
//! the Global hash derived from them. Nothing is recorded.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use deployver_lib::hasher::{global_hash, hash_applications};
use deployver_lib::version::VersionKind;

use super::inputs::{hash_config, load_package_config, load_tree};
use crate::output::{OutputFormat, print_error, print_json, print_stat, symbols, truncate_hash};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashLine<'a> {
  id: &'a str,
  kind: VersionKind,
  application: &'a str,
  hash: &'a str,
}

pub fn cmd_hash(
  tree: &Path,
  config: Option<&Path>,
  jobs: Option<usize>,
  verbose: bool,
  output: OutputFormat,
) -> Result<()> {
  let config = load_package_config(config)?;
  let tree = load_tree(tree, &config)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt.block_on(hash_applications(&tree, &hash_config(jobs)));
  let global = global_hash(&outcome.entries);

  if output.is_json() {
    let lines: Vec<HashLine<'_>> = outcome
      .entries
      .iter()
      .map(|e| HashLine {
        id: e.component_id.as_str(),
        kind: e.kind,
        application: &e.application,
        hash: e.content_hash.as_str(),
      })
      .collect();
    let failures: Vec<_> = outcome
      .failures
      .iter()
      .map(|f| serde_json::json!({ "application": f.application, "error": f.error.to_string() }))
      .collect();
    print_json(&serde_json::json!({ "global": global.as_str(), "components": lines, "failures": failures }))?;
  } else {
    for entry in &outcome.entries {
      let hash = if verbose {
        entry.content_hash.as_str()
      } else {
        truncate_hash(entry.content_hash.as_str())
      };
      println!("  {} {:<12} {:<32} {}", symbols::INFO, entry.kind, entry.component_id, hash);
    }
    println!();
    print_stat("Global", global.as_str());
    print_stat("Applications", &(tree.iter().count() - outcome.failures.len()).to_string());
    print_stat("Services", &tree.service_count().to_string());

    for failure in &outcome.failures {
      print_error(&format!("{}: {}", failure.application, failure.error));
    }
  }

  if !outcome.is_complete() {
    bail!("{} application(s) failed to hash", outcome.failures.len());
  }
  Ok(())
}
