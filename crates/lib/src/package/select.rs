use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::{HttpsBinding, PackageError, PackageSource, PackageTask};
use crate::config::{HttpsConfig, PackageConfig};
use crate::project::{ApplicationProject, ApplicationTree, ServiceProject};
use crate::version::{ComponentId, GlobalVersionMap, Version, VersionKind};

#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
  /// Root under which package destinations are laid out.
  pub output_dir: PathBuf,

  /// Base for relative `ExternalIncludes` sources. Defaults to the working directory.
  pub include_root: Option<PathBuf>,

  /// Skip tasks whose destination already exists.
  pub skip_existing: bool,
}

/// Select the packages to produce for a run.
///
/// Every application yields one application task followed by one task per
/// service, in name order, whatever its change status. Destinations are
/// `{output}/{app}/{app version}` and `{output}/{app}/{service}/{service version}`,
/// so unchanged components resolve to the artifact of their earlier run.
pub fn select_for_packaging(
  versions: &GlobalVersionMap,
  tree: &ApplicationTree,
  config: &PackageConfig,
  options: &SelectOptions,
) -> Result<Vec<PackageTask>, PackageError> {
  let mut tasks = Vec::new();
  let mut skipped = 0usize;

  for app in tree.iter() {
    let app_name = &app.application_type_name;
    let mut app_tasks = vec![application_task(app, versions, config, options)?];
    for service in app.services.values() {
      app_tasks.push(service_task(app_name, service, versions, config, options)?);
    }

    for task in app_tasks {
      if options.skip_existing && task.destination.exists() {
        debug!(component = %task.component_id, destination = %task.destination.display(), "package exists, skipping");
        skipped += 1;
        continue;
      }
      tasks.push(task);
    }
  }

  info!(tasks = tasks.len(), skipped, "selected packages");
  Ok(tasks)
}

fn application_task(
  app: &ApplicationProject,
  versions: &GlobalVersionMap,
  config: &PackageConfig,
  options: &SelectOptions,
) -> Result<PackageTask, PackageError> {
  let name = &app.application_type_name;
  let version = version_for(versions, name, VersionKind::Application)?;

  let sources = app
    .manifest_path
    .iter()
    .map(|path| PackageSource::ApplicationManifest { path: path.clone() })
    .collect();

  let https = app
    .services
    .keys()
    .flat_map(|service| config.https_for(name, service))
    .map(binding)
    .collect();

  Ok(PackageTask {
    component_id: ComponentId::new(name.clone()),
    kind: VersionKind::Application,
    application: name.clone(),
    destination: options.output_dir.join(name).join(version.file_name()),
    version,
    sources,
    https,
  })
}

fn service_task(
  application: &str,
  service: &ServiceProject,
  versions: &GlobalVersionMap,
  config: &PackageConfig,
  options: &SelectOptions,
) -> Result<PackageTask, PackageError> {
  let name = &service.service_name;
  let version = version_for(versions, name, VersionKind::Service)?;
  let include_root = options.include_root.as_deref().unwrap_or_else(|| Path::new("."));

  let mut sources = vec![PackageSource::BuildOutput {
    path: service.build_output_path.clone(),
  }];
  sources.extend(
    config
      .includes_for(application, name)
      .map(|include| PackageSource::ExternalInclude {
        package_name: include.package_name.clone(),
        path: include_root.join(&include.source).join(&include.source_file_name),
        target_file_name: include.target_file_name.clone(),
      }),
  );

  Ok(PackageTask {
    component_id: ComponentId::new(name.clone()),
    kind: VersionKind::Service,
    application: application.to_string(),
    destination: options
      .output_dir
      .join(application)
      .join(name)
      .join(version.file_name()),
    version,
    sources,
    https: config.https_for(application, name).map(binding).collect(),
  })
}

fn version_for(versions: &GlobalVersionMap, component: &str, kind: VersionKind) -> Result<Version, PackageError> {
  versions
    .get(component)
    .filter(|entry| entry.version_type == kind)
    .map(|entry| entry.version.clone())
    .ok_or_else(|| PackageError::MissingVersion {
      component: component.to_string(),
      kind,
    })
}

fn binding(https: &HttpsConfig) -> HttpsBinding {
  HttpsBinding {
    service: https.service_manifest_name.clone(),
    endpoint_name: https.endpoint_name.clone(),
    cert_thumbprint: https.cert_thumbprint.clone(),
  }
}
