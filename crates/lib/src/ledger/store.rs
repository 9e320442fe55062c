use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::types::LedgerError;
use crate::consts::LEDGER_FILE_EXTENSION;

/// Named-document storage backing the ledger.
///
/// `get_file_as_string` returning `Ok(None)` means the document does not
/// exist; for the previous version map that is the first-deployment signal.
/// `Err` means the store could not be reached or read.
pub trait FileStore {
  fn get_file_as_string(&self, file_name: &str) -> Result<Option<String>, LedgerError>;

  fn save_file(&self, file_name: &str, content: &str) -> Result<(), LedgerError>;
}

/// Directory-backed store: each document is `{base}/{name}.json`.
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
  base_path: PathBuf,
}

impl LocalFileStore {
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn document_path(&self, file_name: &str) -> PathBuf {
    self.base_path.join(format!("{}.{}", file_name, LEDGER_FILE_EXTENSION))
  }

  fn ensure_dir(&self) -> Result<(), LedgerError> {
    fs::create_dir_all(&self.base_path).map_err(|source| LedgerError::CreateDir {
      path: self.base_path.clone(),
      source,
    })
  }
}

impl FileStore for LocalFileStore {
  fn get_file_as_string(&self, file_name: &str) -> Result<Option<String>, LedgerError> {
    let path = self.document_path(file_name);
    match fs::read_to_string(&path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "document not found");
        Ok(None)
      }
      Err(source) => Err(LedgerError::Unavailable { path, source }),
    }
  }

  fn save_file(&self, file_name: &str, content: &str) -> Result<(), LedgerError> {
    self.ensure_dir()?;

    let path = self.document_path(file_name);
    let temp_path = self
      .base_path
      .join(format!("{}.{}.tmp", file_name, LEDGER_FILE_EXTENSION));

    let write_err = |source| LedgerError::Write {
      path: path.clone(),
      source,
    };
    fs::write(&temp_path, content).map_err(write_err)?;
    fs::rename(&temp_path, &path).map_err(write_err)?;

    debug!(path = %path.display(), bytes = content.len(), "saved document");
    Ok(())
  }
}
