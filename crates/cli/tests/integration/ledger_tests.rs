//! `ledger` subcommand integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn list_marks_current_version() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();
  env.run("c2").assert().success();

  env
    .deployver_cmd()
    .args(["ledger", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("v1-c1"))
    .stdout(predicate::str::contains("v2-c2 (current)"));
}

#[test]
fn list_json_returns_index() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();

  let index = TestEnv::json_output(env.deployver_cmd().args(["ledger", "list"]));

  assert_eq!(index["current"], "v1-c1");
  assert_eq!(index["entries"].as_array().unwrap().len(), 1);
  assert_eq!(index["entries"][0]["components"], 6);
}

#[test]
fn show_prints_recorded_map() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();

  let map = TestEnv::json_output(env.deployver_cmd().args(["ledger", "show", "v1-c1"]));

  assert_eq!(map["S1"]["VersionType"], "Service");
  assert_eq!(map["A"]["VersionType"], "Application");
  assert_eq!(map["__global__"]["Version"]["sequence"], 1);
  assert_eq!(map["__global__"]["Version"]["commitId"], "c1");
  assert!(map["S1"]["Hash"].is_string());
}

#[test]
fn show_text_lists_components() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();

  env
    .deployver_cmd()
    .args(["ledger", "show", "v1-c1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Components: 6"));
}

#[test]
fn corrupt_ledger_is_a_configuration_error() {
  let env = TestEnv::two_apps();
  env.run("c1").assert().success();
  env.write_file("ledger/v1-c1.json", "{ not json");

  env
    .run("c2")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Configuration error"));
}
