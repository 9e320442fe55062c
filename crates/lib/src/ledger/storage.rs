use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use super::store::FileStore;
use super::types::{LedgerEntry, LedgerError, LedgerIndex};
use crate::consts::{LEDGER_INDEX_NAME, LEDGER_INDEX_VERSION};
use crate::version::{GlobalVersionMap, Version};

/// Version-map history on top of a [`FileStore`].
#[derive(Debug, Clone)]
pub struct Ledger<S> {
  store: S,
}

impl<S: FileStore> Ledger<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Load the index, returning an empty one if none was written yet.
  pub fn load_index(&self) -> Result<LedgerIndex, LedgerError> {
    let Some(content) = self.store.get_file_as_string(LEDGER_INDEX_NAME)? else {
      return Ok(LedgerIndex::new());
    };

    let index: LedgerIndex = serde_json::from_str(&content).map_err(LedgerError::CorruptIndex)?;
    if index.version != LEDGER_INDEX_VERSION {
      return Err(LedgerError::UnsupportedIndexVersion(index.version));
    }
    Ok(index)
  }

  fn save_index(&self, index: &LedgerIndex) -> Result<(), LedgerError> {
    let content = serde_json::to_string_pretty(index).map_err(|e| LedgerError::Serialize(e.to_string()))?;
    self.store.save_file(LEDGER_INDEX_NAME, &content)
  }

  /// Global version of the current deployment, if any was recorded.
  pub fn current_version(&self) -> Result<Option<Version>, LedgerError> {
    self.load_index()?.current_version()
  }

  /// Load the map recorded for `version`.
  ///
  /// Returns `Ok(None)` when nothing was recorded under that version.
  pub fn load_map(&self, version: &Version) -> Result<Option<GlobalVersionMap>, LedgerError> {
    let file_name = version.file_name();
    let Some(content) = self.store.get_file_as_string(&file_name)? else {
      debug!(version = %file_name, "no version map recorded");
      return Ok(None);
    };

    GlobalVersionMap::from_json(&content)
      .map(Some)
      .map_err(|source| LedgerError::CorruptMap { file_name, source })
  }

  /// Persist `map` under its Global version and make it current.
  ///
  /// Existing maps are never overwritten.
  pub fn record(&self, map: &GlobalVersionMap) -> Result<Version, LedgerError> {
    let version = map.global_version().cloned().ok_or(LedgerError::MissingGlobal)?;
    let file_name = version.file_name();

    if self.store.get_file_as_string(&file_name)?.is_some() {
      return Err(LedgerError::AlreadyRecorded(file_name));
    }

    let content = map.to_json().map_err(|e| LedgerError::Serialize(e.to_string()))?;
    self.store.save_file(&file_name, &content)?;

    let mut index = self.load_index()?;
    index.add(LedgerEntry {
      version: version.clone(),
      recorded_at: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default(),
      components: map.len(),
    });
    index.current = Some(file_name);
    self.save_index(&index)?;

    info!(version = %version, components = map.len(), "recorded version map");
    Ok(version)
  }

  /// Recorded runs, oldest first.
  pub fn list(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
    Ok(self.load_index()?.entries)
  }
}
