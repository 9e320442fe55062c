//! Content hashing of build outputs.
//!
//! Every service hashes its build-output directory. Every application gets an
//! aggregate over its services' hashes, so any service change changes the
//! application hash. A single global hash aggregates all applications.

mod pool;

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::project::{ApplicationProject, ServiceProject};
use crate::util::hash::{ContentHash, DirHashError, combine_hashes, hash_directory};
use crate::version::{ComponentId, VersionKind};

pub use pool::{ApplicationFailure, HashConfig, HashOutcome, hash_applications};

/// Content hash of one application or service in the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
  pub component_id: ComponentId,
  pub kind: VersionKind,
  pub content_hash: ContentHash,
  /// Owning application (the application itself for application entries).
  pub application: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
  #[error("build output for {application}/{service} not found at {path}")]
  MissingBuildOutput {
    application: String,
    service: String,
    path: PathBuf,
  },

  #[error("failed to hash build output for {application}/{service}: {source}")]
  Read {
    application: String,
    service: String,
    #[source]
    source: DirHashError,
  },

  #[error("hash task for {application}/{service} did not complete: {message}")]
  TaskFailed {
    application: String,
    service: String,
    message: String,
  },
}

/// Hash a single service's build output.
pub fn hash_service(application: &str, service: &ServiceProject) -> Result<ContentHash, HashError> {
  let path = &service.build_output_path;
  if !path.is_dir() {
    return Err(HashError::MissingBuildOutput {
      application: application.to_string(),
      service: service.service_name.clone(),
      path: path.clone(),
    });
  }

  let hash = hash_directory(path, &[]).map_err(|source| HashError::Read {
    application: application.to_string(),
    service: service.service_name.clone(),
    source,
  })?;
  debug!(application, service = %service.service_name, hash = %hash, "hashed service");
  Ok(hash)
}

/// Hash every service of `application` and aggregate them.
///
/// Returns the service entries in name order followed by the application
/// entry.
pub fn calculate(application: &ApplicationProject) -> Result<Vec<HashEntry>, HashError> {
  let name = &application.application_type_name;
  let mut hashes = BTreeMap::new();
  for service in application.services.values() {
    hashes.insert(service.service_name.clone(), hash_service(name, service)?);
  }
  Ok(entries_for(name, &hashes))
}

/// Builds the entries of one application from its services' hashes.
pub(crate) fn entries_for(application: &str, service_hashes: &BTreeMap<String, ContentHash>) -> Vec<HashEntry> {
  let mut entries: Vec<HashEntry> = service_hashes
    .iter()
    .map(|(service, hash)| HashEntry {
      component_id: ComponentId::new(service.clone()),
      kind: VersionKind::Service,
      content_hash: hash.clone(),
      application: application.to_string(),
    })
    .collect();

  let aggregate = combine_hashes(service_hashes.iter().map(|(name, hash)| (name.as_str(), hash)));
  entries.push(HashEntry {
    component_id: ComponentId::new(application),
    kind: VersionKind::Application,
    content_hash: aggregate,
    application: application.to_string(),
  });
  entries
}

/// Aggregate hash over every application entry in `entries`.
pub fn global_hash(entries: &[HashEntry]) -> ContentHash {
  combine_hashes(
    entries
      .iter()
      .filter(|e| e.kind == VersionKind::Application)
      .map(|e| (e.component_id.as_str(), &e.content_hash)),
  )
}
