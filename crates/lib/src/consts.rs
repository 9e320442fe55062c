//! Crate-wide constants.

/// Application name, used for platform directories.
pub const APP_NAME: &str = "deployver";

/// Reserved component id of the run-level Global version.
///
/// No application or service may use this name.
pub const GLOBAL_IDENTIFIER: &str = "__global__";

/// Prefix of a rendered version file name (`v{sequence}-{commit}`).
pub const VERSION_FILE_PREFIX: char = 'v';

/// Extension appended to rendered version names when stored by [`crate::ledger::LocalFileStore`].
pub const LEDGER_FILE_EXTENSION: &str = "json";

/// Store name of the ledger index.
pub const LEDGER_INDEX_NAME: &str = "index";

/// Current ledger index format version.
pub const LEDGER_INDEX_VERSION: u32 = 1;

/// Descriptor written at the root of every materialized package.
pub const PACKAGE_DESCRIPTOR_FILENAME: &str = "package.json";
