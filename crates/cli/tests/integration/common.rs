//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Descriptor for two applications: `A` with services `S1` and `S2`, `B` with `S3`.
pub const TWO_APP_TREE: &str = r#"{
  "applications": [
    {
      "applicationTypeName": "A",
      "manifestPath": "manifests/A",
      "services": [
        { "serviceName": "S1", "buildOutputPath": "build/S1" },
        { "serviceName": "S2", "buildOutputPath": "build/S2" }
      ]
    },
    {
      "applicationTypeName": "B",
      "manifestPath": "manifests/B",
      "services": [
        { "serviceName": "S3", "buildOutputPath": "build/S3" }
      ]
    }
  ]
}"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the tree, build
/// outputs, ledger and packages.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Environment with [`TWO_APP_TREE`] and build outputs for every service.
  pub fn two_apps() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("tree.json", TWO_APP_TREE);
    for app in ["A", "B"] {
      env.write_file(&format!("manifests/{}/ApplicationManifest.xml", app), "<ApplicationManifest/>");
    }
    for service in ["S1", "S2", "S3"] {
      env.build_service(service, &format!("{} v1", service));
    }
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// (Re)write the build output of `service`.
  pub fn build_service(&self, service: &str, content: &str) {
    self.write_file(&format!("build/{}/bin/service.dll", service), content);
    self.write_file(&format!("build/{}/PackageRoot/ServiceManifest.xml", service), "<ServiceManifest/>");
  }

  pub fn tree_path(&self) -> PathBuf {
    self.temp.path().join("tree.json")
  }

  pub fn ledger_path(&self) -> PathBuf {
    self.temp.path().join("ledger")
  }

  pub fn packages_path(&self) -> PathBuf {
    self.temp.path().join("packages")
  }

  /// Get a pre-configured Command for the deployver binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `DEPLOYVER_STORE`: Isolated ledger path
  /// - `XDG_DATA_HOME`: Isolated data path (default package output)
  /// - `APPDATA`: Isolated data path (for Windows)
  pub fn deployver_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("deployver");
    cmd.env("DEPLOYVER_STORE", self.ledger_path());
    cmd.env("XDG_DATA_HOME", self.temp.path().join("data"));
    cmd.env("APPDATA", self.temp.path().join("data"));
    cmd.env_remove("DEPLOYVER_COMMIT");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `deployver run` against the tree with packages written under the temp dir.
  pub fn run(&self, commit: &str) -> Command {
    let mut cmd = self.deployver_cmd();
    cmd
      .arg("run")
      .arg("--tree")
      .arg(self.tree_path())
      .arg("--output-dir")
      .arg(self.packages_path())
      .args(["--commit", commit]);
    cmd
  }

  /// Parse a command's stdout as JSON.
  pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("-o").arg("json").output().unwrap();
    assert!(
      output.status.success(),
      "command failed: {}",
      String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
  }
}

/// Version string (`v{sequence}-{commit}`) of component `id` in a run/plan JSON report.
pub fn component_version(report: &serde_json::Value, id: &str) -> String {
  let component = report["components"]
    .as_array()
    .unwrap()
    .iter()
    .find(|c| c["id"] == id)
    .unwrap_or_else(|| panic!("component {} missing from report", id));
  format!(
    "v{}-{}",
    component["version"]["sequence"],
    component["version"]["commitId"].as_str().unwrap()
  )
}
