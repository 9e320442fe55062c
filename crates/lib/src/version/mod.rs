//! Versions and the per-run version registry.
//!
//! A [`Version`] is the immutable `(sequence, commit)` pair rendered as
//! `v{sequence}-{commit}`. A [`GlobalVersionMap`] assigns one to every
//! component of a run and is the document persisted between runs.

mod registry;
mod types;

pub use registry::{GlobalVersion, GlobalVersionMap, RegistryError};
pub use types::{ComponentId, Version, VersionKind, VersionParseError};
