use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::LEDGER_INDEX_VERSION;
use crate::version::{RegistryError, Version, VersionParseError};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
  #[error("ledger store unavailable at {path}: {source}")]
  Unavailable {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create ledger directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("version map {file_name} is corrupt: {source}")]
  CorruptMap {
    file_name: String,
    #[source]
    source: RegistryError,
  },

  #[error("ledger index is corrupt: {0}")]
  CorruptIndex(#[source] serde_json::Error),

  #[error("ledger index points at an invalid version: {0}")]
  InvalidCurrent(#[source] VersionParseError),

  #[error("unsupported ledger index version: {0}")]
  UnsupportedIndexVersion(u32),

  #[error("version map has no Global version")]
  MissingGlobal,

  #[error("version {0} is already recorded")]
  AlreadyRecorded(String),

  #[error("failed to serialize ledger data: {0}")]
  Serialize(String),
}

/// One recorded run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub version: Version,
  pub recorded_at: u64,
  pub components: usize,
}

impl LedgerEntry {
  pub fn file_name(&self) -> String {
    self.version.file_name()
  }
}

/// Recorded runs in recording order plus the current pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerIndex {
  pub version: u32,
  /// File name of the currently deployed version map.
  pub current: Option<String>,
  pub entries: Vec<LedgerEntry>,
}

impl Default for LedgerIndex {
  fn default() -> Self {
    Self::new()
  }
}

impl LedgerIndex {
  pub fn new() -> Self {
    Self {
      version: LEDGER_INDEX_VERSION,
      current: None,
      entries: Vec::new(),
    }
  }

  pub fn add(&mut self, entry: LedgerEntry) {
    self.entries.push(entry);
  }

  pub fn current_version(&self) -> Result<Option<Version>, LedgerError> {
    self
      .current
      .as_deref()
      .map(|name| name.parse::<Version>().map_err(LedgerError::InvalidCurrent))
      .transpose()
  }
}
