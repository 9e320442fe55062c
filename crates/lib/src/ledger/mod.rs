//! Persistence of version maps between runs.
//!
//! Each run's [`GlobalVersionMap`](crate::version::GlobalVersionMap) is
//! stored under the rendered file name of its Global version. Maps are never
//! overwritten; an index tracks which one is current.
//!
//! # Storage Layout
//!
//! ```text
//! {store}/
//! ├── index.json          # LedgerIndex: recorded versions + current pointer
//! └── v<seq>-<commit>.json  # One version map per run
//! ```

mod storage;
mod store;
mod types;

pub use storage::Ledger;
pub use store::{FileStore, LocalFileStore};
pub use types::{LedgerEntry, LedgerError, LedgerIndex};
