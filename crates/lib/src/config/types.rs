use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed package config: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("{section} entry {index} has an empty {field}")]
  EmptyField {
    section: &'static str,
    index: usize,
    field: &'static str,
  },

  #[error("duplicate Https binding for {application}/{service} endpoint '{endpoint}'")]
  DuplicateHttps {
    application: String,
    service: String,
    endpoint: String,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageConfig {
  pub https: Vec<HttpsConfig>,
  pub external_includes: Vec<ExternalInclude>,
  pub guest_executables: Vec<GuestExecutable>,
  pub cluster: Option<ClusterConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpsConfig {
  pub application_type_name: String,
  pub service_manifest_name: String,
  pub endpoint_name: String,
  pub cert_thumbprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalInclude {
  pub application_type_name: String,
  pub service_manifest_name: String,
  pub package_name: String,
  pub source_file_name: String,
  pub target_file_name: String,
  /// Directory holding `source_file_name`.
  pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuestExecutable {
  pub application_type_name: String,
  pub package_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterConfig {
  pub endpoint: String,
  pub port: u16,
  #[serde(default)]
  pub pfx_file: Option<String>,
  #[serde(default)]
  pub pfx_key: Option<String>,
}

impl PackageConfig {
  /// Parse and validate a config document.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let config: PackageConfig = serde_json::from_str(content).map_err(ConfigError::Parse)?;
    config.validate()?;
    debug!(
      https = config.https.len(),
      external_includes = config.external_includes.len(),
      guest_executables = config.guest_executables.len(),
      "loaded package config"
    );
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Https bindings declared for one service, in document order.
  pub fn https_for<'a>(&'a self, application: &'a str, service: &'a str) -> impl Iterator<Item = &'a HttpsConfig> {
    self
      .https
      .iter()
      .filter(move |h| h.application_type_name == application && h.service_manifest_name == service)
  }

  /// External includes declared for one service, in document order.
  pub fn includes_for<'a>(
    &'a self,
    application: &'a str,
    service: &'a str,
  ) -> impl Iterator<Item = &'a ExternalInclude> {
    self
      .external_includes
      .iter()
      .filter(move |i| i.application_type_name == application && i.service_manifest_name == service)
  }

  pub fn is_guest_executable(&self, application: &str, package_name: &str) -> bool {
    self
      .guest_executables
      .iter()
      .any(|g| g.application_type_name == application && g.package_name == package_name)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    let mut endpoints = HashSet::new();
    for (index, https) in self.https.iter().enumerate() {
      require("Https", index, "ApplicationTypeName", &https.application_type_name)?;
      require("Https", index, "ServiceManifestName", &https.service_manifest_name)?;
      require("Https", index, "EndpointName", &https.endpoint_name)?;
      require("Https", index, "CertThumbprint", &https.cert_thumbprint)?;

      let key = (
        https.application_type_name.as_str(),
        https.service_manifest_name.as_str(),
        https.endpoint_name.as_str(),
      );
      if !endpoints.insert(key) {
        return Err(ConfigError::DuplicateHttps {
          application: https.application_type_name.clone(),
          service: https.service_manifest_name.clone(),
          endpoint: https.endpoint_name.clone(),
        });
      }
    }

    for (index, include) in self.external_includes.iter().enumerate() {
      require("ExternalIncludes", index, "ApplicationTypeName", &include.application_type_name)?;
      require("ExternalIncludes", index, "ServiceManifestName", &include.service_manifest_name)?;
      require("ExternalIncludes", index, "PackageName", &include.package_name)?;
      require("ExternalIncludes", index, "SourceFileName", &include.source_file_name)?;
      require("ExternalIncludes", index, "TargetFileName", &include.target_file_name)?;
    }

    for (index, guest) in self.guest_executables.iter().enumerate() {
      require("GuestExecutables", index, "ApplicationTypeName", &guest.application_type_name)?;
      require("GuestExecutables", index, "PackageName", &guest.package_name)?;
    }

    Ok(())
  }
}

fn require(section: &'static str, index: usize, field: &'static str, value: &str) -> Result<(), ConfigError> {
  if value.trim().is_empty() {
    return Err(ConfigError::EmptyField { section, index, field });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const FULL_CONFIG: &str = r#"{
    "Https": [
      { "ApplicationTypeName": "ShopType", "ServiceManifestName": "WebPkg", "EndpointName": "Https", "CertThumbprint": "ABCD" }
    ],
    "ExternalIncludes": [
      { "ApplicationTypeName": "ShopType", "ServiceManifestName": "WebPkg", "PackageName": "Config",
        "SourceFileName": "prod.json", "TargetFileName": "appsettings.json", "Source": "settings" }
    ],
    "GuestExecutables": [
      { "ApplicationTypeName": "ShopType", "PackageName": "NodePkg" }
    ],
    "Cluster": { "Endpoint": "cluster.example.com", "Port": 19080, "PfxFile": "cert.pfx", "PfxKey": "secret" }
  }"#;

  #[test]
  fn parses_all_sections() {
    let config = PackageConfig::from_json(FULL_CONFIG).unwrap();

    assert_eq!(config.https.len(), 1);
    assert_eq!(config.https[0].cert_thumbprint, "ABCD");
    assert_eq!(config.external_includes[0].target_file_name, "appsettings.json");
    assert!(config.is_guest_executable("ShopType", "NodePkg"));
    assert!(!config.is_guest_executable("ShopType", "WebPkg"));
    assert_eq!(config.cluster.as_ref().unwrap().port, 19080);
  }

  #[test]
  fn missing_sections_default_to_empty() {
    let config = PackageConfig::from_json("{}").unwrap();
    assert_eq!(config, PackageConfig::default());
  }

  #[test]
  fn lookups_match_application_and_service() {
    let config = PackageConfig::from_json(FULL_CONFIG).unwrap();

    assert_eq!(config.https_for("ShopType", "WebPkg").count(), 1);
    assert_eq!(config.https_for("ShopType", "ApiPkg").count(), 0);
    assert_eq!(config.https_for("OtherType", "WebPkg").count(), 0);
    assert_eq!(config.includes_for("ShopType", "WebPkg").count(), 1);
  }

  #[test]
  fn malformed_document_is_rejected() {
    assert!(matches!(PackageConfig::from_json("[1, 2]"), Err(ConfigError::Parse(_))));
    assert!(matches!(
      PackageConfig::from_json(r#"{ "Https": [{ "ApplicationTypeName": "A" }] }"#),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn empty_required_field_is_rejected() {
    let json = r#"{ "GuestExecutables": [{ "ApplicationTypeName": "A", "PackageName": " " }] }"#;
    let err = PackageConfig::from_json(json).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::EmptyField {
        section: "GuestExecutables",
        index: 0,
        field: "PackageName"
      }
    ));
  }

  #[test]
  fn duplicate_https_endpoint_is_rejected() {
    let json = r#"{ "Https": [
      { "ApplicationTypeName": "A", "ServiceManifestName": "S", "EndpointName": "E", "CertThumbprint": "1" },
      { "ApplicationTypeName": "A", "ServiceManifestName": "S", "EndpointName": "E", "CertThumbprint": "2" }
    ] }"#;
    assert!(matches!(
      PackageConfig::from_json(json),
      Err(ConfigError::DuplicateHttps { .. })
    ));
  }

  #[test]
  fn from_file_reports_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let err = PackageConfig::from_file(&temp.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
