//! JSON tree descriptor loading.
//!
//! ```json
//! {
//!   "applications": [
//!     {
//!       "applicationTypeName": "ShopType",
//!       "manifestPath": "Shop/ApplicationPackageRoot",
//!       "services": [
//!         { "serviceName": "WebPkg", "buildOutputPath": "Web/bin/Release", "kind": "aspNetCore" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the descriptor's directory.

use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use super::types::{ApplicationProject, ApplicationTree, ServiceKind, ServiceProject};
use crate::config::PackageConfig;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
  #[error("failed to read tree descriptor {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed tree descriptor: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("application name must not be empty")]
  EmptyApplicationName,

  #[error("service name in application '{0}' must not be empty")]
  EmptyServiceName(String),

  #[error("application '{0}' is declared more than once")]
  DuplicateApplication(String),

  #[error("service '{service}' is declared more than once in application '{application}'")]
  DuplicateService { application: String, service: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeDescriptor {
  applications: Vec<ApplicationDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationDescriptor {
  application_type_name: String,
  #[serde(default)]
  manifest_path: Option<PathBuf>,
  #[serde(default)]
  services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDescriptor {
  service_name: String,
  build_output_path: PathBuf,
  #[serde(default)]
  kind: ServiceKind,
}

impl ApplicationTree {
  /// Load a tree descriptor from disk.
  pub fn from_file(path: &Path, config: &PackageConfig) -> Result<Self, TreeError> {
    let content = fs::read_to_string(path).map_err(|source| TreeError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Self::from_json(&content, base_dir, config)
  }

  /// Parse a tree descriptor, resolving relative paths against `base_dir`.
  ///
  /// Services listed in the config's `GuestExecutables` section are tagged
  /// as guest executables regardless of their declared kind.
  pub fn from_json(content: &str, base_dir: &Path, config: &PackageConfig) -> Result<Self, TreeError> {
    let descriptor: TreeDescriptor = serde_json::from_str(content).map_err(TreeError::Parse)?;
    let mut tree = ApplicationTree::new();

    for app in descriptor.applications {
      if app.application_type_name.trim().is_empty() {
        return Err(TreeError::EmptyApplicationName);
      }

      let mut project = ApplicationProject::new(app.application_type_name.clone());
      project.manifest_path = app.manifest_path.map(|p| resolve(base_dir, p));

      for service in app.services {
        if service.service_name.trim().is_empty() {
          return Err(TreeError::EmptyServiceName(app.application_type_name));
        }

        let kind = if config.is_guest_executable(&app.application_type_name, &service.service_name) {
          ServiceKind::GuestExecutable
        } else {
          service.kind
        };

        let entry = ServiceProject::new(service.service_name.clone(), resolve(base_dir, service.build_output_path))
          .with_kind(kind);
        match project.services.entry(service.service_name) {
          Entry::Occupied(occupied) => {
            return Err(TreeError::DuplicateService {
              application: app.application_type_name,
              service: occupied.key().clone(),
            });
          }
          Entry::Vacant(vacant) => {
            debug!(application = %app.application_type_name, service = %vacant.key(), ?kind, "discovered service");
            vacant.insert(entry);
          }
        }
      }

      match tree.applications.entry(app.application_type_name) {
        Entry::Occupied(occupied) => return Err(TreeError::DuplicateApplication(occupied.key().clone())),
        Entry::Vacant(vacant) => {
          vacant.insert(project);
        }
      }
    }

    info!(
      applications = tree.applications.len(),
      services = tree.service_count(),
      "loaded application tree"
    );
    Ok(tree)
  }
}

fn resolve(base_dir: &Path, path: PathBuf) -> PathBuf {
  if path.is_absolute() { path } else { base_dir.join(path) }
}
