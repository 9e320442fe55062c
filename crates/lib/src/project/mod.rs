//! Application/service tree consumed by the hasher and packaging selector.
//!
//! Discovering the tree from build-tool project files happens outside this
//! crate; the result is handed over as a JSON descriptor (see [`load`]).

pub mod load;
mod types;

pub use load::TreeError;
pub use types::{ApplicationProject, ApplicationTree, ServiceKind, ServiceProject};
