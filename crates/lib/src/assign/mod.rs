//! Version assignment from a diff of content hashes.
//!
//! Given the version map of the currently deployed run and the hashes of the
//! current build outputs, every component is classified as new, changed or
//! unchanged:
//!
//! - With no previous map (first deployment) every component, Global
//!   included, receives the new version.
//! - A component absent from the previous map is new and receives the new
//!   version.
//! - A component whose hash differs from the recorded one is changed and
//!   receives the new version.
//! - A component whose hash matches keeps its previous version untouched.
//! - Global always receives the new version.
//!
//! Application hashes aggregate their services' hashes, so a changed service
//! always changes its application as well. No separate cascade exists.

mod types;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::hasher::{HashEntry, global_hash};
use crate::util::hash::ContentHash;
use crate::version::{ComponentId, GlobalVersion, GlobalVersionMap, Version, VersionKind};

pub use types::{AssignError, Assignment, ComponentStatus};

/// Assigns versions for the current run.
///
/// `previous` is the map recorded for the currently deployed Global version;
/// an empty map means nothing was deployed before.
pub fn assign(
  previous: &GlobalVersionMap,
  current: &[HashEntry],
  new_version: &Version,
) -> Result<GlobalVersionMap, AssignError> {
  assign_with_report(previous, current, new_version).map(|assignment| assignment.versions)
}

/// Same as [`assign`], also reporting why each component got its version.
pub fn assign_with_report(
  previous: &GlobalVersionMap,
  current: &[HashEntry],
  new_version: &Version,
) -> Result<Assignment, AssignError> {
  check_collisions(current)?;

  let none_deployed = previous.is_empty();
  let mut versions = GlobalVersionMap::new();
  let mut statuses = BTreeMap::new();

  let global_id = ComponentId::global();
  let global = global_hash(current);
  let global_status = classify(previous, &global_id, VersionKind::Global, &global);
  versions.insert(
    global_id.clone(),
    GlobalVersion::new(VersionKind::Global, new_version.clone(), Some(global)),
  );
  statuses.insert(global_id, global_status);

  for entry in current {
    let (status, version) = if none_deployed {
      (ComponentStatus::New, new_version.clone())
    } else {
      match classify(previous, &entry.component_id, entry.kind, &entry.content_hash) {
        ComponentStatus::Unchanged => match previous.version_of(entry.component_id.as_str()) {
          Some(prior) => (ComponentStatus::Unchanged, prior.clone()),
          None => (ComponentStatus::New, new_version.clone()),
        },
        status => (status, new_version.clone()),
      }
    };

    debug!(
      component = %entry.component_id,
      kind = %entry.kind,
      ?status,
      version = %version,
      "assigned version"
    );
    versions.insert(
      entry.component_id.clone(),
      GlobalVersion::new(entry.kind, version, Some(entry.content_hash.clone())),
    );
    statuses.insert(entry.component_id.clone(), status);
  }

  let assignment = Assignment { versions, statuses };
  info!(
    version = %new_version,
    first_deployment = none_deployed,
    new = assignment.count(ComponentStatus::New),
    changed = assignment.count(ComponentStatus::Changed),
    unchanged = assignment.count(ComponentStatus::Unchanged),
    "versions assigned"
  );
  Ok(assignment)
}

fn classify(
  previous: &GlobalVersionMap,
  id: &ComponentId,
  kind: VersionKind,
  hash: &ContentHash,
) -> ComponentStatus {
  match previous.get(id.as_str()) {
    None => ComponentStatus::New,
    Some(prior) if prior.version_type == kind && prior.hash.as_ref() == Some(hash) => ComponentStatus::Unchanged,
    Some(_) => ComponentStatus::Changed,
  }
}

/// Rejects any id used by more than one component, or by the Global slot.
fn check_collisions(current: &[HashEntry]) -> Result<(), AssignError> {
  let mut seen: HashMap<&str, &HashEntry> = HashMap::with_capacity(current.len());

  for entry in current {
    if entry.component_id.is_global() {
      return Err(AssignError::ReservedIdentifier {
        id: entry.component_id.clone(),
        kind: entry.kind,
      });
    }

    if let Some(first) = seen.insert(entry.component_id.as_str(), entry) {
      return Err(AssignError::Collision {
        id: entry.component_id.clone(),
        first_kind: first.kind,
        first_application: first.application.clone(),
        second_kind: entry.kind,
        second_application: entry.application.clone(),
      });
    }
  }

  Ok(())
}
