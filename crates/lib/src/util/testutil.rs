//! Test utilities for deployver-lib.
//!
//! Helpers for laying out fake build outputs and trees on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::project::{ApplicationProject, ApplicationTree, ServiceProject};

/// Writes `files` (relative path, content) under `root`, creating parents.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (relative, content) in files {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }
}

/// Creates a build output directory for `service` holding one binary.
pub fn build_output(root: &Path, service: &str, content: &str) -> PathBuf {
  let dir = root.join("build").join(service);
  write_files(&dir, &[("bin/service.dll", content), ("config/settings.xml", "<Settings/>")]);
  dir
}

/// Two applications `A{S1,S2}` and `B{S3}` with build outputs under `root`.
pub fn two_app_tree(root: &Path) -> ApplicationTree {
  let a = ApplicationProject::new("A")
    .with_service(ServiceProject::new("S1", build_output(root, "S1", "s1 v1")))
    .with_service(ServiceProject::new("S2", build_output(root, "S2", "s2 v1")));
  let b = ApplicationProject::new("B").with_service(ServiceProject::new("S3", build_output(root, "S3", "s3 v1")));
  ApplicationTree::new().with_application(a).with_application(b)
}
