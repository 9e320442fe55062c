//! Arguments and input loading shared by `run` and `plan`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;

use deployver_lib::assign::ComponentStatus;
use deployver_lib::config::PackageConfig;
use deployver_lib::hasher::HashConfig;
use deployver_lib::ledger::{Ledger, LocalFileStore};
use deployver_lib::package::SelectOptions;
use deployver_lib::pipeline::{ErrorCategory, PipelineError, RunOptions, RunReport};
use deployver_lib::platform::paths;
use deployver_lib::project::ApplicationTree;
use deployver_lib::util::hash::ContentHash;
use deployver_lib::version::{ComponentId, Version, VersionKind};

use crate::output::{
  format_duration, print_error, print_json, print_stat, print_success, print_warning, status_marker,
};

#[derive(Debug, Args)]
pub struct RunArgs {
  /// Tree descriptor listing applications and services
  #[arg(long)]
  pub tree: PathBuf,

  /// Package config document (Https, ExternalIncludes, GuestExecutables)
  #[arg(long)]
  pub config: Option<PathBuf>,

  /// Commit id the new Global version is tagged with
  #[arg(long, env = "DEPLOYVER_COMMIT")]
  pub commit: String,

  /// Currently deployed Global version, e.g. v7-abc123 (defaults to the ledger's current version)
  #[arg(long)]
  pub deployed_version: Option<Version>,

  /// Maximum services hashed in parallel
  #[arg(short, long)]
  pub jobs: Option<usize>,

  /// Drop applications that fail to hash instead of aborting
  #[arg(long)]
  pub keep_going: bool,

  /// Root directory for packages
  #[arg(long)]
  pub output_dir: Option<PathBuf>,

  /// Base directory for relative ExternalIncludes sources
  #[arg(long)]
  pub include_root: Option<PathBuf>,

  /// Skip packages whose destination already exists
  #[arg(long)]
  pub skip_existing: bool,
}

/// Everything a pipeline invocation needs, loaded from disk.
pub struct Inputs {
  pub tree: ApplicationTree,
  pub config: PackageConfig,
  pub ledger: Ledger<LocalFileStore>,
  pub options: RunOptions,
}

pub fn load_package_config(path: Option<&Path>) -> Result<PackageConfig> {
  match path {
    Some(path) => {
      PackageConfig::from_file(path).with_context(|| format!("Failed to load package config: {}", path.display()))
    }
    None => Ok(PackageConfig::default()),
  }
}

pub fn load_tree(path: &Path, config: &PackageConfig) -> Result<ApplicationTree> {
  ApplicationTree::from_file(path, config).with_context(|| format!("Failed to load tree: {}", path.display()))
}

pub fn hash_config(jobs: Option<usize>) -> HashConfig {
  match jobs {
    Some(parallelism) => HashConfig {
      parallelism: parallelism.max(1),
    },
    None => HashConfig::default(),
  }
}

impl RunArgs {
  pub fn load(&self, store: &Path, package: bool) -> Result<Inputs> {
    let config = load_package_config(self.config.as_deref())?;
    let tree = load_tree(&self.tree, &config)?;

    let include_root = self
      .include_root
      .clone()
      .or_else(|| self.config.as_ref().and_then(|c| c.parent()).map(Path::to_path_buf));

    let options = RunOptions {
      commit_id: self.commit.clone(),
      deployed_version: self.deployed_version.clone(),
      hash: hash_config(self.jobs),
      keep_going: self.keep_going,
      select: SelectOptions {
        output_dir: self.output_dir.clone().unwrap_or_else(paths::packages_dir),
        include_root,
        skip_existing: self.skip_existing,
      },
      package,
    };

    debug!(
      store = %store.display(),
      output_dir = %options.select.output_dir.display(),
      applications = tree.iter().count(),
      "loaded run inputs"
    );

    Ok(Inputs {
      tree,
      config,
      ledger: Ledger::new(LocalFileStore::new(store)),
      options,
    })
  }
}

fn category_label(category: ErrorCategory) -> &'static str {
  match category {
    ErrorCategory::Io => "I/O",
    ErrorCategory::Configuration => "Configuration",
    ErrorCategory::RemoteUnavailable => "Store unavailable",
  }
}

/// Print a pipeline failure with its category and hand it back for the exit code.
pub fn report_failure(err: PipelineError) -> anyhow::Error {
  print_error(&format!("{} error: {}", category_label(err.category()), err));
  if let PipelineError::Hash(failures) = &err {
    for failure in failures {
      eprintln!("  {}: {}", failure.application, failure.error);
    }
  }
  err.into()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentSummary<'a> {
  id: &'a ComponentId,
  kind: VersionKind,
  version: &'a Version,
  status: Option<ComponentStatus>,
  hash: Option<&'a ContentHash>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureSummary<'a> {
  application: &'a str,
  error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary<'a> {
  deployed_version: Option<&'a Version>,
  new_version: &'a Version,
  first_deployment: bool,
  recorded: bool,
  components: Vec<ComponentSummary<'a>>,
  failures: Vec<FailureSummary<'a>>,
  packages: Vec<&'a Path>,
}

/// Render a run or plan report.
///
/// `packages` are the written package directories for a run and the planned
/// destinations for a plan.
pub fn print_report(report: &RunReport, packages: &[&Path], started: Instant, json: bool) -> Result<()> {
  if json {
    let summary = RunSummary {
      deployed_version: report.deployed_version.as_ref(),
      new_version: &report.new_version,
      first_deployment: report.first_deployment,
      recorded: report.recorded,
      components: report
        .versions()
        .iter()
        .map(|(id, entry)| ComponentSummary {
          id,
          kind: entry.version_type,
          version: &entry.version,
          status: report.assignment.status_of(id.as_str()),
          hash: entry.hash.as_ref(),
        })
        .collect(),
      failures: report
        .failures
        .iter()
        .map(|f| FailureSummary {
          application: &f.application,
          error: f.error.to_string(),
        })
        .collect(),
      packages: packages.to_vec(),
    };
    return print_json(&summary);
  }

  let from = match &report.deployed_version {
    Some(version) if !report.first_deployment => version.to_string(),
    Some(version) => format!("{} (no recorded map)", version),
    None => "first deployment".to_string(),
  };
  println!("Global: {} -> {}", from, report.new_version);
  println!();

  for (id, entry) in report.versions().iter().filter(|(id, _)| !id.is_global()) {
    let marker = status_marker(report.assignment.status_of(id.as_str()));
    println!("  {} {:<12} {:<32} {}", marker, entry.version_type, id, entry.version);
  }
  println!();

  for failure in &report.failures {
    print_warning(&format!("Skipped {}: {}", failure.application, failure.error));
  }

  let assignment = &report.assignment;
  print_stat("New", &assignment.count(ComponentStatus::New).to_string());
  print_stat("Changed", &assignment.count(ComponentStatus::Changed).to_string());
  print_stat("Unchanged", &assignment.count(ComponentStatus::Unchanged).to_string());
  print_stat("Packages", &packages.len().to_string());
  print_stat("Duration", &format_duration(started.elapsed()));

  if report.recorded {
    println!();
    print_success(&format!("Recorded {}", report.new_version));
  }

  Ok(())
}
