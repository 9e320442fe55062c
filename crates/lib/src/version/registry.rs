use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{ComponentId, Version, VersionKind};
use crate::util::hash::ContentHash;

/// One component's entry in the version map.
///
/// Serialized as `{ "VersionType": ..., "Version": {...}, "Hash": ... }`.
/// `Hash` is the content hash the version was assigned for; the next run
/// compares against it to decide whether the component changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVersion {
  #[serde(rename = "VersionType")]
  pub version_type: VersionKind,

  #[serde(rename = "Version")]
  pub version: Version,

  #[serde(rename = "Hash", default, skip_serializing_if = "Option::is_none")]
  pub hash: Option<ContentHash>,
}

impl GlobalVersion {
  pub fn new(version_type: VersionKind, version: Version, hash: Option<ContentHash>) -> Self {
    Self {
      version_type,
      version,
      hash,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  #[error("failed to parse version map: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize version map: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Mapping of every component of a run to its kind and version.
///
/// Backed by a `BTreeMap` so serialization order, and therefore the persisted
/// file, is stable for identical content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalVersionMap {
  entries: BTreeMap<ComponentId, GlobalVersion>,
}

impl GlobalVersionMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, id: &str) -> Option<&GlobalVersion> {
    self.entries.get(id)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.entries.contains_key(id)
  }

  /// Sets a component's entry, returning the one it replaced.
  pub fn insert(&mut self, id: ComponentId, entry: GlobalVersion) -> Option<GlobalVersion> {
    self.entries.insert(id, entry)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &GlobalVersion)> {
    self.entries.iter()
  }

  /// Components of the given kind, in key order.
  pub fn of_kind(&self, kind: VersionKind) -> impl Iterator<Item = (&ComponentId, &GlobalVersion)> {
    self.entries.iter().filter(move |(_, entry)| entry.version_type == kind)
  }

  pub fn version_of(&self, id: &str) -> Option<&Version> {
    self.entries.get(id).map(|entry| &entry.version)
  }

  /// The run-level Global version, if present.
  pub fn global_version(&self) -> Option<&Version> {
    self.of_kind(VersionKind::Global).map(|(_, entry)| &entry.version).next()
  }

  pub fn from_json(content: &str) -> Result<Self, RegistryError> {
    serde_json::from_str(content).map_err(RegistryError::Parse)
  }

  pub fn to_json(&self) -> Result<String, RegistryError> {
    serde_json::to_string_pretty(self).map_err(RegistryError::Serialize)
  }
}

impl<'a> IntoIterator for &'a GlobalVersionMap {
  type Item = (&'a ComponentId, &'a GlobalVersion);
  type IntoIter = std::collections::btree_map::Iter<'a, ComponentId, GlobalVersion>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::hash::hash_bytes;

  fn sample_map() -> GlobalVersionMap {
    let v1 = Version::create(1, "c1");
    let v2 = Version::create(2, "c2");
    let mut map = GlobalVersionMap::new();
    map.insert(
      ComponentId::global(),
      GlobalVersion::new(VersionKind::Global, v2.clone(), Some(hash_bytes(b"global"))),
    );
    map.insert(
      ComponentId::new("A"),
      GlobalVersion::new(VersionKind::Application, v2, Some(hash_bytes(b"A"))),
    );
    map.insert(
      ComponentId::new("S1"),
      GlobalVersion::new(VersionKind::Service, v1, Some(hash_bytes(b"S1"))),
    );
    map
  }

  #[test]
  fn json_round_trip_is_structurally_identical() {
    let map = sample_map();
    let json = map.to_json().unwrap();
    let parsed = GlobalVersionMap::from_json(&json).unwrap();

    assert_eq!(parsed, map);
    assert_eq!(parsed.to_json().unwrap(), json);
  }

  #[test]
  fn json_uses_ledger_field_names() {
    let map = sample_map();
    let value: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();

    assert_eq!(value["A"]["VersionType"], "Application");
    assert_eq!(value["S1"]["Version"]["sequence"], 1);
    assert_eq!(value["S1"]["Version"]["commitId"], "c1");
    assert_eq!(value["S1"]["Hash"], hash_bytes(b"S1").0);
  }

  #[test]
  fn entries_without_hash_are_accepted() {
    let json = r#"{ "__global__": { "VersionType": "Global", "Version": { "sequence": 3, "commitId": "x" } } }"#;
    let map = GlobalVersionMap::from_json(json).unwrap();

    assert_eq!(map.global_version(), Some(&Version::create(3, "x")));
    assert!(map.get("__global__").unwrap().hash.is_none());
    assert!(!map.to_json().unwrap().contains("Hash"));
  }

  #[test]
  fn insert_replaces_existing_entry() {
    let mut map = sample_map();
    let replaced = map.insert(
      ComponentId::new("A"),
      GlobalVersion::new(VersionKind::Application, Version::create(9, "z"), None),
    );

    assert_eq!(replaced.unwrap().version, Version::create(2, "c2"));
    assert_eq!(map.version_of("A"), Some(&Version::create(9, "z")));
    assert_eq!(map.len(), 3);
  }

  #[test]
  fn of_kind_filters_entries() {
    let map = sample_map();
    let services: Vec<_> = map.of_kind(VersionKind::Service).map(|(id, _)| id.as_str()).collect();
    assert_eq!(services, vec!["S1"]);
  }

  #[test]
  fn malformed_json_is_a_parse_error() {
    assert!(matches!(
      GlobalVersionMap::from_json("{ not json"),
      Err(RegistryError::Parse(_))
    ));
  }
}
