//! Parallel hashing of a whole application tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::{HashEntry, HashError, entries_for, hash_service};
use crate::project::ApplicationTree;
use crate::util::hash::ContentHash;

/// Hashing configuration.
#[derive(Debug, Clone)]
pub struct HashConfig {
  /// Maximum number of services hashed at once.
  pub parallelism: usize,
}

impl Default for HashConfig {
  fn default() -> Self {
    Self {
      parallelism: std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4),
    }
  }
}

/// An application whose services could not all be hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFailure {
  pub application: String,
  pub error: HashError,
}

/// Result of hashing a tree.
///
/// `entries` holds every application that hashed completely, in name order
/// (services first, then the application entry). A failed application
/// contributes no entries at all.
#[derive(Debug, Default)]
pub struct HashOutcome {
  pub entries: Vec<HashEntry>,
  pub failures: Vec<ApplicationFailure>,
}

impl HashOutcome {
  pub fn is_complete(&self) -> bool {
    self.failures.is_empty()
  }
}

type ServiceResult = (String, String, Result<ContentHash, HashError>);

/// Hash every service of `tree` on a bounded pool, one task per service.
///
/// All tasks are awaited before the outcome is assembled; nothing is
/// returned for a partially hashed application.
pub async fn hash_applications(tree: &ApplicationTree, config: &HashConfig) -> HashOutcome {
  info!(
    applications = tree.applications.len(),
    services = tree.service_count(),
    parallelism = config.parallelism,
    "hashing build outputs"
  );

  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut join_set: JoinSet<ServiceResult> = JoinSet::new();

  for app in tree.iter() {
    for service in app.services.values() {
      let application = app.application_type_name.clone();
      let service = service.clone();
      let semaphore = semaphore.clone();

      join_set.spawn(async move {
        let service_name = service.service_name.clone();
        let task_failed = |message: String| HashError::TaskFailed {
          application: application.clone(),
          service: service_name.clone(),
          message,
        };

        let result = match semaphore.acquire_owned().await {
          Ok(permit) => {
            let app_name = application.clone();
            let joined = tokio::task::spawn_blocking(move || {
              let _permit = permit;
              hash_service(&app_name, &service)
            })
            .await;
            joined.unwrap_or_else(|e| Err(task_failed(e.to_string())))
          }
          Err(e) => Err(task_failed(e.to_string())),
        };

        (application.clone(), service_name.clone(), result)
      });
    }
  }

  let mut collected: BTreeMap<String, BTreeMap<String, Result<ContentHash, HashError>>> = BTreeMap::new();
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((application, service, result)) => {
        collected.entry(application).or_default().insert(service, result);
      }
      Err(e) => {
        error!(error = %e, "hash task panicked");
      }
    }
  }

  let mut outcome = HashOutcome::default();
  for app in tree.iter() {
    let name = &app.application_type_name;
    let results = collected.remove(name).unwrap_or_default();

    match application_hashes(name, app.services.keys(), results) {
      Ok(hashes) => outcome.entries.extend(entries_for(name, &hashes)),
      Err(error) => {
        warn!(application = %name, error = %error, "failed to hash application");
        outcome.failures.push(ApplicationFailure {
          application: name.clone(),
          error,
        });
      }
    }
  }

  info!(
    entries = outcome.entries.len(),
    failed = outcome.failures.len(),
    "hashing complete"
  );
  outcome
}

/// Checks that every expected service produced a hash.
fn application_hashes<'a>(
  application: &str,
  expected: impl Iterator<Item = &'a String>,
  mut results: BTreeMap<String, Result<ContentHash, HashError>>,
) -> Result<BTreeMap<String, ContentHash>, HashError> {
  let mut hashes = BTreeMap::new();
  for service in expected {
    match results.remove(service) {
      Some(Ok(hash)) => {
        hashes.insert(service.clone(), hash);
      }
      Some(Err(e)) => return Err(e),
      None => {
        return Err(HashError::TaskFailed {
          application: application.to_string(),
          service: service.clone(),
          message: "no result collected".to_string(),
        });
      }
    }
  }
  Ok(hashes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hasher::calculate;
  use crate::project::{ApplicationProject, ServiceProject};
  use crate::util::testutil::two_app_tree;
  use crate::version::VersionKind;
  use tempfile::tempdir;
  use tracing_test::traced_test;

  #[tokio::test]
  async fn pool_matches_sequential_calculation() {
    let temp = tempdir().unwrap();
    let tree = two_app_tree(temp.path());

    let outcome = hash_applications(&tree, &HashConfig { parallelism: 2 }).await;

    let mut expected = calculate(tree.get("A").unwrap()).unwrap();
    expected.extend(calculate(tree.get("B").unwrap()).unwrap());
    assert!(outcome.is_complete());
    assert_eq!(outcome.entries, expected);
  }

  #[tokio::test]
  async fn single_worker_still_hashes_everything() {
    let temp = tempdir().unwrap();
    let tree = two_app_tree(temp.path());

    let outcome = hash_applications(&tree, &HashConfig { parallelism: 1 }).await;

    assert_eq!(outcome.entries.len(), 5);
    assert_eq!(
      outcome
        .entries
        .iter()
        .filter(|e| e.kind == VersionKind::Application)
        .count(),
      2
    );
  }

  #[tokio::test]
  #[traced_test]
  async fn failure_is_confined_to_its_application() {
    let temp = tempdir().unwrap();
    let broken = ApplicationProject::new("C").with_service(ServiceProject::new("S4", temp.path().join("missing")));
    let tree = two_app_tree(temp.path()).with_application(broken);

    let outcome = hash_applications(&tree, &HashConfig::default()).await;

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].application, "C");
    assert!(matches!(outcome.failures[0].error, HashError::MissingBuildOutput { .. }));
    assert!(outcome.entries.iter().all(|e| e.application != "C"));
    assert_eq!(outcome.entries.len(), 5);
    assert!(logs_contain("failed to hash application"));
  }

  #[tokio::test]
  async fn empty_tree_yields_nothing() {
    let outcome = hash_applications(&ApplicationTree::new(), &HashConfig::default()).await;
    assert!(outcome.entries.is_empty());
    assert!(outcome.is_complete());
  }
}
