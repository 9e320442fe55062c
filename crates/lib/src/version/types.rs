use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{GLOBAL_IDENTIFIER, VERSION_FILE_PREFIX};

/// Immutable component version.
///
/// Equality is structural. Only `sequence` carries order; the commit id is
/// opaque traceability metadata and is never compared for recency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
  sequence: u64,
  commit_id: String,
}

impl Version {
  pub fn create(sequence: u64, commit_id: impl Into<String>) -> Self {
    Self {
      sequence,
      commit_id: commit_id.into(),
    }
  }

  /// Returns the next version in this lineage, tagged with `commit_id`.
  ///
  /// `None` once the sequence is exhausted.
  pub fn increment(&self, commit_id: impl Into<String>) -> Option<Self> {
    let sequence = self.sequence.checked_add(1)?;
    Some(Self::create(sequence, commit_id))
  }

  pub fn sequence(&self) -> u64 {
    self.sequence
  }

  pub fn commit_id(&self) -> &str {
    &self.commit_id
  }

  /// Canonical rendering used as artifact name and ledger key.
  pub fn file_name(&self) -> String {
    format!("{}{}-{}", VERSION_FILE_PREFIX, self.sequence, self.commit_id)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.file_name())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
  #[error("version '{0}' must start with 'v'")]
  MissingPrefix(String),

  #[error("version '{0}' must have the form v<sequence>-<commit>")]
  MissingCommit(String),

  #[error("version '{input}' has an invalid sequence: {message}")]
  InvalidSequence { input: String, message: String },
}

impl FromStr for Version {
  type Err = VersionParseError;

  /// Parses the rendering produced by [`Version::file_name`].
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rest = s
      .strip_prefix(VERSION_FILE_PREFIX)
      .ok_or_else(|| VersionParseError::MissingPrefix(s.to_string()))?;
    let (sequence, commit) = rest
      .split_once('-')
      .filter(|(_, commit)| !commit.is_empty())
      .ok_or_else(|| VersionParseError::MissingCommit(s.to_string()))?;
    let sequence = sequence.parse::<u64>().map_err(|e| VersionParseError::InvalidSequence {
      input: s.to_string(),
      message: e.to_string(),
    })?;
    Ok(Version::create(sequence, commit))
  }
}

/// Why a component carries a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionKind {
  Global,
  Application,
  Service,
}

impl VersionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      VersionKind::Global => "Global",
      VersionKind::Application => "Application",
      VersionKind::Service => "Service",
    }
  }
}

impl fmt::Display for VersionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

/// Key of a component in the version map.
///
/// Applications and services use their manifest-declared names; the Global
/// component uses [`GLOBAL_IDENTIFIER`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn global() -> Self {
    Self(GLOBAL_IDENTIFIER.to_string())
  }

  pub fn is_global(&self) -> bool {
    self.0 == GLOBAL_IDENTIFIER
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ComponentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(&self.0)
  }
}

impl Borrow<str> for ComponentId {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl From<&str> for ComponentId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl From<String> for ComponentId {
  fn from(value: String) -> Self {
    Self(value)
  }
}
