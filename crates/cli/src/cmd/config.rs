//! Implementation of the `deployver config` subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Subcommand;

use deployver_lib::config::PackageConfig;
use deployver_lib::project::ApplicationTree;

use super::inputs::{load_package_config, load_tree};
use crate::output::{print_stat, print_success, print_warning};

#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Validate a package config, optionally against a tree descriptor
  Check {
    /// Package config document
    config: PathBuf,

    /// Report entries that name applications or services missing from this tree
    #[arg(long)]
    tree: Option<PathBuf>,
  },
}

pub fn cmd_config(command: ConfigCommand) -> Result<()> {
  match command {
    ConfigCommand::Check { config, tree } => cmd_check(&config, tree.as_deref()),
  }
}

fn cmd_check(config_path: &Path, tree_path: Option<&Path>) -> Result<()> {
  let config = load_package_config(Some(config_path))?;

  print_success(&format!("{} is valid", config_path.display()));
  print_stat("Https", &config.https.len().to_string());
  print_stat("ExternalIncludes", &config.external_includes.len().to_string());
  print_stat("GuestExecutables", &config.guest_executables.len().to_string());
  if let Some(cluster) = &config.cluster {
    print_stat("Cluster", &format!("{}:{}", cluster.endpoint, cluster.port));
  }

  let Some(tree_path) = tree_path else {
    return Ok(());
  };
  let tree = load_tree(tree_path, &config)?;
  let dangling = dangling_references(&config, &tree);
  for reference in &dangling {
    print_warning(&format!("{} not found in {}", reference, tree_path.display()));
  }
  if !dangling.is_empty() {
    bail!("config references {} unknown component(s)", dangling.len());
  }
  Ok(())
}

/// Config entries naming an application or service the tree does not have.
fn dangling_references(config: &PackageConfig, tree: &ApplicationTree) -> Vec<String> {
  let service_exists = |application: &str, service: &str| {
    tree
      .get(application)
      .is_some_and(|app| app.services.contains_key(service))
  };

  let https = config
    .https
    .iter()
    .filter(|h| !service_exists(&h.application_type_name, &h.service_manifest_name))
    .map(|h| format!("Https {}/{}", h.application_type_name, h.service_manifest_name));
  let includes = config
    .external_includes
    .iter()
    .filter(|i| !service_exists(&i.application_type_name, &i.service_manifest_name))
    .map(|i| format!("ExternalInclude {}/{}", i.application_type_name, i.service_manifest_name));
  let guests = config
    .guest_executables
    .iter()
    .filter(|g| !service_exists(&g.application_type_name, &g.package_name))
    .map(|g| format!("GuestExecutable {}/{}", g.application_type_name, g.package_name));

  https.chain(includes).chain(guests).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use deployver_lib::project::{ApplicationProject, ServiceProject};

  #[test]
  fn dangling_references_reports_unknown_services() {
    let config = PackageConfig::from_json(
      r#"{
        "Https": [
          { "ApplicationTypeName": "A", "ServiceManifestName": "S1", "EndpointName": "Web", "CertThumbprint": "ab" },
          { "ApplicationTypeName": "A", "ServiceManifestName": "Gone", "EndpointName": "Web", "CertThumbprint": "ab" }
        ],
        "GuestExecutables": [ { "ApplicationTypeName": "Missing", "PackageName": "S1" } ]
      }"#,
    )
    .unwrap();
    let tree = ApplicationTree::new()
      .with_application(ApplicationProject::new("A").with_service(ServiceProject::new("S1", "/b")));

    let dangling = dangling_references(&config, &tree);
    assert_eq!(dangling, vec!["Https A/Gone", "GuestExecutable Missing/S1"]);
  }
}
