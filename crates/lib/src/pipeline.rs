//! One deployment run: hash, diff, assign, record, package.
//!
//! Stages run strictly in order. Hashing fans out over a worker pool but is
//! fully collected before assignment starts, and the version map is recorded
//! before any package is written.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::assign::{AssignError, Assignment, assign_with_report};
use crate::config::{ConfigError, PackageConfig};
use crate::hasher::{ApplicationFailure, HashConfig, hash_applications};
use crate::ledger::{FileStore, Ledger, LedgerError};
use crate::package::{PackageError, PackageTask, SelectOptions, execute_all, select_for_packaging};
use crate::project::{ApplicationTree, TreeError};
use crate::version::{GlobalVersionMap, Version};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Commit the new Global version is tagged with.
  pub commit_id: String,

  /// Currently deployed Global version. Read from the ledger when unset.
  pub deployed_version: Option<Version>,

  pub hash: HashConfig,

  /// Drop applications that fail to hash instead of aborting the run.
  pub keep_going: bool,

  pub select: SelectOptions,

  /// Materialize the selected packages after recording.
  pub package: bool,
}

#[derive(Debug)]
pub struct RunReport {
  pub deployed_version: Option<Version>,
  pub new_version: Version,
  pub first_deployment: bool,
  pub assignment: Assignment,
  /// Applications dropped from this run in keep-going mode.
  pub failures: Vec<ApplicationFailure>,
  pub tasks: Vec<PackageTask>,
  pub recorded: bool,
  pub packaged: Vec<PathBuf>,
}

impl RunReport {
  pub fn versions(&self) -> &GlobalVersionMap {
    &self.assignment.versions
  }
}

/// Error classes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
  /// Build output or package I/O failed.
  Io,
  /// Inputs are inconsistent or malformed.
  Configuration,
  /// The ledger store could not be reached.
  RemoteUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error("{} application(s) failed to hash: {}", .0.len(), failed_names(.0))]
  Hash(Vec<ApplicationFailure>),

  #[error(transparent)]
  Assign(#[from] AssignError),

  #[error(transparent)]
  Ledger(#[from] LedgerError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Tree(#[from] TreeError),

  #[error("invalid commit id '{0}': must be non-empty without whitespace or path separators")]
  InvalidCommit(String),

  #[error("deployed version {0} has no successor: sequence exhausted")]
  SequenceExhausted(Version),
}

impl PipelineError {
  pub fn category(&self) -> ErrorCategory {
    match self {
      PipelineError::Hash(_) | PipelineError::Package(_) => ErrorCategory::Io,
      PipelineError::Ledger(
        LedgerError::Unavailable { .. }
        | LedgerError::CreateDir { .. }
        | LedgerError::Write { .. }
        | LedgerError::Serialize(_),
      ) => ErrorCategory::RemoteUnavailable,
      PipelineError::Ledger(_)
      | PipelineError::Assign(_)
      | PipelineError::Config(_)
      | PipelineError::Tree(_)
      | PipelineError::InvalidCommit(_)
      | PipelineError::SequenceExhausted(_) => ErrorCategory::Configuration,
    }
  }
}

fn failed_names(failures: &[ApplicationFailure]) -> String {
  failures
    .iter()
    .map(|f| f.application.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Compute the versions and packages of a run without persisting anything.
pub async fn plan<S: FileStore>(
  tree: &ApplicationTree,
  config: &PackageConfig,
  ledger: &Ledger<S>,
  options: &RunOptions,
) -> Result<RunReport, PipelineError> {
  validate_commit(&options.commit_id)?;

  let deployed_version = match &options.deployed_version {
    Some(version) => Some(version.clone()),
    None => ledger.current_version()?,
  };
  let base = deployed_version.clone().unwrap_or_else(|| Version::create(0, ""));
  let new_version = base
    .increment(options.commit_id.clone())
    .ok_or_else(|| PipelineError::SequenceExhausted(base.clone()))?;

  let previous = match &deployed_version {
    Some(version) => ledger.load_map(version)?,
    None => None,
  };
  let first_deployment = previous.is_none();
  let previous = previous.unwrap_or_default();
  info!(
    deployed = ?deployed_version.as_ref().map(|v| v.file_name()),
    new = %new_version,
    first_deployment,
    "resolved versions"
  );

  let outcome = hash_applications(tree, &options.hash).await;
  if !outcome.is_complete() {
    if !options.keep_going {
      return Err(PipelineError::Hash(outcome.failures));
    }
    for failure in &outcome.failures {
      warn!(application = %failure.application, error = %failure.error, "dropping application from run");
    }
  }

  let mut assignment = assign_with_report(&previous, &outcome.entries, &new_version)?;
  for failure in &outcome.failures {
    if let Some(app) = tree.get(&failure.application) {
      let ids = std::iter::once(app.application_type_name.as_str()).chain(app.services.keys().map(String::as_str));
      let carried = ids.filter(|id| assignment.carry_forward(&previous, id)).count();
      debug!(application = %app.application_type_name, carried, "kept deployed versions of dropped application");
    }
  }

  let packaged_tree = tree.without(outcome.failures.iter().map(|f| f.application.as_str()));
  let tasks = select_for_packaging(&assignment.versions, &packaged_tree, config, &options.select)?;

  Ok(RunReport {
    deployed_version,
    new_version,
    first_deployment,
    assignment,
    failures: outcome.failures,
    tasks,
    recorded: false,
    packaged: Vec::new(),
  })
}

/// Run the full pipeline: plan, record the version map, then package.
pub async fn run<S: FileStore>(
  tree: &ApplicationTree,
  config: &PackageConfig,
  ledger: &Ledger<S>,
  options: &RunOptions,
) -> Result<RunReport, PipelineError> {
  let mut report = plan(tree, config, ledger, options).await?;

  ledger.record(&report.assignment.versions)?;
  report.recorded = true;

  if options.package {
    report.packaged = execute_all(&report.tasks)?;
  }

  info!(
    version = %report.new_version,
    packages = report.packaged.len(),
    "run complete"
  );
  Ok(report)
}

fn validate_commit(commit_id: &str) -> Result<(), PipelineError> {
  let invalid = commit_id.is_empty() || commit_id.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\');
  if invalid {
    return Err(PipelineError::InvalidCommit(commit_id.to_string()));
  }
  Ok(())
}
