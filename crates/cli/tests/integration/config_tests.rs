//! `config check` integration tests and config-driven packaging.

use predicates::prelude::*;

use super::common::TestEnv;

const CONFIG: &str = r#"{
  "Https": [
    { "ApplicationTypeName": "A", "ServiceManifestName": "S1", "EndpointName": "Web", "CertThumbprint": "ABCDEF" }
  ],
  "ExternalIncludes": [
    {
      "ApplicationTypeName": "A",
      "ServiceManifestName": "S2",
      "PackageName": "Code",
      "SourceFileName": "shared.dll",
      "TargetFileName": "shared.dll",
      "Source": "vendor"
    }
  ]
}"#;

#[test]
fn check_reports_section_counts() {
  let env = TestEnv::two_apps();
  env.write_file("config.json", CONFIG);

  env
    .deployver_cmd()
    .args(["config", "check"])
    .arg(env.temp.path().join("config.json"))
    .assert()
    .success()
    .stdout(predicate::str::contains("Https: 1"))
    .stdout(predicate::str::contains("ExternalIncludes: 1"));
}

#[test]
fn check_against_tree_flags_unknown_services() {
  let env = TestEnv::two_apps();
  env.write_file(
    "config.json",
    r#"{ "GuestExecutables": [ { "ApplicationTypeName": "A", "PackageName": "Nope" } ] }"#,
  );

  env
    .deployver_cmd()
    .args(["config", "check"])
    .arg(env.temp.path().join("config.json"))
    .arg("--tree")
    .arg(env.tree_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("GuestExecutable A/Nope"));
}

#[test]
fn malformed_config_fails() {
  let env = TestEnv::two_apps();
  env.write_file("config.json", r#"{ "Https": [ { "ApplicationTypeName": "" } ] }"#);

  env
    .deployver_cmd()
    .args(["config", "check"])
    .arg(env.temp.path().join("config.json"))
    .assert()
    .failure();
}

#[test]
fn run_with_config_packages_includes_and_bindings() {
  let env = TestEnv::two_apps();
  env.write_file("config.json", CONFIG);
  env.write_file("vendor/shared.dll", "shared");

  env
    .run("c1")
    .arg("--config")
    .arg(env.temp.path().join("config.json"))
    .assert()
    .success();

  let s2 = env.packages_path().join("A/S2/v1-c1");
  assert!(s2.join("Code/shared.dll").exists());

  let descriptor = std::fs::read_to_string(env.packages_path().join("A/S1/v1-c1/package.json")).unwrap();
  assert!(descriptor.contains("ABCDEF"));
}
