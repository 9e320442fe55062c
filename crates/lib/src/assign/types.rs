use std::collections::BTreeMap;

use serde::Serialize;

use crate::version::{ComponentId, GlobalVersionMap, VersionKind};

/// Outcome of comparing a component against the deployed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
  New,
  Changed,
  Unchanged,
}

/// Versions of a run with the classification behind each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
  pub versions: GlobalVersionMap,
  pub statuses: BTreeMap<ComponentId, ComponentStatus>,
}

impl Assignment {
  pub fn status_of(&self, id: &str) -> Option<ComponentStatus> {
    self.statuses.get(id).copied()
  }

  pub fn count(&self, status: ComponentStatus) -> usize {
    self
      .statuses
      .iter()
      .filter(|(id, s)| !id.is_global() && **s == status)
      .count()
  }

  /// Copies `id`'s entry from `previous` as unchanged, unless this run
  /// already assigned it. Returns whether an entry was copied.
  pub fn carry_forward(&mut self, previous: &GlobalVersionMap, id: &str) -> bool {
    if self.versions.contains(id) {
      return false;
    }
    let Some(entry) = previous.get(id) else {
      return false;
    };
    let id = ComponentId::new(id);
    self.versions.insert(id.clone(), entry.clone());
    self.statuses.insert(id, ComponentStatus::Unchanged);
    true
  }

  /// True when no application or service needs redeploying.
  pub fn is_unchanged(&self) -> bool {
    self
      .statuses
      .iter()
      .all(|(id, s)| id.is_global() || *s == ComponentStatus::Unchanged)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
  #[error(
    "component id '{id}' is used by both {first_kind} (in {first_application}) and {second_kind} (in {second_application})"
  )]
  Collision {
    id: ComponentId,
    first_kind: VersionKind,
    first_application: String,
    second_kind: VersionKind,
    second_application: String,
  },

  #[error("{kind} '{id}' uses the reserved Global identifier")]
  ReservedIdentifier { id: ComponentId, kind: VersionKind },
}
