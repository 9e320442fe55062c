use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::version::{ComponentId, Version, VersionKind};

/// Something copied into a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PackageSource {
  /// Application manifest file or directory.
  ApplicationManifest { path: PathBuf },
  /// A service's whole build-output directory.
  BuildOutput { path: PathBuf },
  /// A single file placed at `{package_name}/{target_file_name}`.
  #[serde(rename_all = "camelCase")]
  ExternalInclude {
    package_name: String,
    path: PathBuf,
    target_file_name: String,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsBinding {
  pub service: String,
  pub endpoint_name: String,
  pub cert_thumbprint: String,
}

/// One artifact to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTask {
  pub component_id: ComponentId,
  pub kind: VersionKind,
  pub application: String,
  pub version: Version,
  pub sources: Vec<PackageSource>,
  pub https: Vec<HttpsBinding>,
  pub destination: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
  #[error("no version assigned to {kind} '{component}'")]
  MissingVersion { component: String, kind: VersionKind },

  #[error("package source {path} does not exist")]
  MissingSource { path: PathBuf },

  #[error("failed to write package at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk {path}: {message}")]
  Walk { path: PathBuf, message: String },

  #[error("failed to serialize package descriptor: {0}")]
  Serialize(String),
}
