//! `run`, `plan` and `hash` integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, component_version};

#[test]
fn first_run_assigns_one_version_to_everything() {
  let env = TestEnv::two_apps();

  let report = TestEnv::json_output(&mut env.run("c1"));

  assert_eq!(report["firstDeployment"], true);
  assert_eq!(report["recorded"], true);
  for id in ["__global__", "A", "B", "S1", "S2", "S3"] {
    assert_eq!(component_version(&report, id), "v1-c1", "component {}", id);
  }
  assert_eq!(report["packages"].as_array().unwrap().len(), 5);

  let packages = env.packages_path();
  assert!(packages.join("A/v1-c1/package.json").exists());
  assert!(packages.join("A/S1/v1-c1/package.json").exists());
  assert!(packages.join("B/S3/v1-c1").is_dir());
}

#[test]
fn changed_service_propagates_to_its_application_only() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();

  env.build_service("S1", "S1 v2");
  let report = TestEnv::json_output(&mut env.run("c2"));

  assert_eq!(report["firstDeployment"], false);
  assert_eq!(component_version(&report, "__global__"), "v2-c2");
  assert_eq!(component_version(&report, "A"), "v2-c2");
  assert_eq!(component_version(&report, "S1"), "v2-c2");
  assert_eq!(component_version(&report, "B"), "v1-c1");
  assert_eq!(component_version(&report, "S2"), "v1-c1");
  assert_eq!(component_version(&report, "S3"), "v1-c1");

  assert!(env.packages_path().join("A/S1/v2-c2").is_dir());
  assert!(env.packages_path().join("A/S2/v1-c1").is_dir());
}

#[test]
fn unchanged_tree_keeps_component_versions() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();

  let report = TestEnv::json_output(&mut env.run("c2"));

  assert_eq!(component_version(&report, "__global__"), "v2-c2");
  for id in ["A", "B", "S1", "S2", "S3"] {
    assert_eq!(component_version(&report, id), "v1-c1", "component {}", id);
  }
}

#[test]
fn run_text_output_reports_recorded_version() {
  let env = TestEnv::two_apps();

  env
    .run("c1")
    .assert()
    .success()
    .stdout(predicate::str::contains("first deployment -> v1-c1"))
    .stdout(predicate::str::contains("Recorded v1-c1"));
}

#[test]
fn plan_records_nothing() {
  let env = TestEnv::two_apps();

  env
    .deployver_cmd()
    .arg("plan")
    .arg("--tree")
    .arg(env.tree_path())
    .arg("--output-dir")
    .arg(env.packages_path())
    .args(["--commit", "c1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("v1-c1"));

  assert!(!env.packages_path().exists());
  env
    .deployver_cmd()
    .args(["ledger", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No version maps recorded"));
}

#[test]
fn deployed_version_override_selects_the_previous_map() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();
  env.build_service("S3", "S3 v2");
  env.run("c2").assert().success();

  let report = TestEnv::json_output(env.run("c3").args(["--deployed-version", "v1-c1"]));

  assert_eq!(component_version(&report, "__global__"), "v2-c3");
  assert_eq!(component_version(&report, "S3"), "v2-c3");
  assert_eq!(component_version(&report, "S1"), "v1-c1");
}

#[test]
fn missing_build_output_aborts_without_recording() {
  let env = TestEnv::two_apps();
  std::fs::remove_dir_all(env.temp.path().join("build/S3")).unwrap();

  env
    .run("c1")
    .assert()
    .failure()
    .stderr(predicate::str::contains("I/O error"))
    .stderr(predicate::str::contains("B"));

  assert!(!env.ledger_path().join("v1-c1.json").exists());
}

#[test]
fn keep_going_drops_failed_application() {
  let env = TestEnv::two_apps();
  std::fs::remove_dir_all(env.temp.path().join("build/S3")).unwrap();

  let report = TestEnv::json_output(env.run("c1").arg("--keep-going"));

  assert_eq!(report["failures"][0]["application"], "B");
  let ids: Vec<&str> = report["components"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["id"].as_str().unwrap())
    .collect();
  assert_eq!(ids, vec!["A", "S1", "S2", "__global__"]);
  assert!(!env.packages_path().join("B").exists());
}

#[test]
fn no_package_records_without_writing_packages() {
  let env = TestEnv::two_apps();

  env.run("c1").arg("--no-package").assert().success();

  assert!(env.ledger_path().join("v1-c1.json").exists());
  assert!(!env.packages_path().exists());
}

#[test]
fn invalid_commit_is_a_configuration_error() {
  let env = TestEnv::two_apps();

  env
    .run("bad commit")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn hash_prints_every_component() {
  let env = TestEnv::two_apps();

  let output = TestEnv::json_output(env.deployver_cmd().arg("hash").arg("--tree").arg(env.tree_path()));

  assert_eq!(output["components"].as_array().unwrap().len(), 5);
  assert_eq!(output["global"].as_str().unwrap().len(), 64);
  assert!(!env.ledger_path().exists());
}

#[test]
fn hash_fails_on_missing_build_output() {
  let env = TestEnv::two_apps();
  std::fs::remove_dir_all(env.temp.path().join("build/S1")).unwrap();

  env
    .deployver_cmd()
    .arg("hash")
    .arg("--tree")
    .arg(env.tree_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("1 application(s) failed to hash"));
}
