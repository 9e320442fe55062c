use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::types::{HttpsBinding, PackageError, PackageSource, PackageTask};
use crate::consts::PACKAGE_DESCRIPTOR_FILENAME;
use crate::version::{ComponentId, Version, VersionKind};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageDescriptor<'a> {
  component_id: &'a ComponentId,
  kind: VersionKind,
  application: &'a str,
  version: &'a Version,
  https: &'a [HttpsBinding],
}

/// Materialize one task at its destination.
///
/// Content is staged in a temp directory beside the destination and renamed
/// into place, replacing any earlier package at the same path.
pub fn execute(task: &PackageTask) -> Result<PathBuf, PackageError> {
  let destination = &task.destination;
  let parent = destination.parent().unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;

  let staging = tempfile::Builder::new()
    .prefix(".staging-")
    .tempdir_in(parent)
    .map_err(|source| io_err(parent, source))?;
  let root = staging.path();

  for source in &task.sources {
    match source {
      PackageSource::ApplicationManifest { path } => {
        if path.is_dir() {
          copy_tree(path, root)?;
        } else {
          copy_file(path, &root.join(file_name(path)?))?;
        }
      }
      PackageSource::BuildOutput { path } => copy_tree(path, root)?,
      PackageSource::ExternalInclude {
        package_name,
        path,
        target_file_name,
      } => copy_file(path, &root.join(package_name).join(target_file_name))?,
    }
  }

  let descriptor = PackageDescriptor {
    component_id: &task.component_id,
    kind: task.kind,
    application: &task.application,
    version: &task.version,
    https: &task.https,
  };
  let json = serde_json::to_string_pretty(&descriptor).map_err(|e| PackageError::Serialize(e.to_string()))?;
  let descriptor_path = root.join(PACKAGE_DESCRIPTOR_FILENAME);
  fs::write(&descriptor_path, json).map_err(|source| io_err(&descriptor_path, source))?;

  if destination.exists() {
    debug!(destination = %destination.display(), "replacing existing package");
    fs::remove_dir_all(destination).map_err(|source| io_err(destination, source))?;
  }
  fs::rename(root, destination).map_err(|source| io_err(destination, source))?;

  debug!(
    component = %task.component_id,
    version = %task.version,
    destination = %destination.display(),
    "packaged"
  );
  Ok(destination.clone())
}

/// Materialize tasks in order, stopping at the first failure.
pub fn execute_all(tasks: &[PackageTask]) -> Result<Vec<PathBuf>, PackageError> {
  let written = tasks.iter().map(execute).collect::<Result<Vec<_>, _>>()?;
  info!(packages = written.len(), "packaging complete");
  Ok(written)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), PackageError> {
  if !from.is_dir() {
    return Err(PackageError::MissingSource {
      path: from.to_path_buf(),
    });
  }

  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.map_err(|e| PackageError::Walk {
      path: from.to_path_buf(),
      message: e.to_string(),
    })?;
    let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
    let target = to.join(rel);

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target).map_err(|source| io_err(&target, source))?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      copy_file(entry.path(), &target)?;
    }
  }
  Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PackageError> {
  if !from.exists() {
    return Err(PackageError::MissingSource {
      path: from.to_path_buf(),
    });
  }
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
  }
  fs::copy(from, to).map_err(|source| io_err(to, source))?;
  Ok(())
}

/// Recreates the link at `to` with the same target, relative or absolute.
fn copy_symlink(from: &Path, to: &Path) -> Result<(), PackageError> {
  let link_target = fs::read_link(from).map_err(|source| io_err(from, source))?;
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
  }

  #[cfg(unix)]
  let created = std::os::unix::fs::symlink(&link_target, to);
  #[cfg(windows)]
  let created = if from.is_dir() {
    std::os::windows::fs::symlink_dir(&link_target, to)
  } else {
    std::os::windows::fs::symlink_file(&link_target, to)
  };

  created.map_err(|source| io_err(to, source))
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr, PackageError> {
  path.file_name().ok_or_else(|| PackageError::MissingSource {
    path: path.to_path_buf(),
  })
}

fn io_err(path: &Path, source: std::io::Error) -> PackageError {
  PackageError::Io {
    path: path.to_path_buf(),
    source,
  }
}
