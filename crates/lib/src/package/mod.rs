//! Package selection and materialization.
//!
//! [`select_for_packaging`] turns the final version map and the tree into one
//! task per application and per service, named after each component's
//! version. [`execute`] writes those tasks to disk.

mod execute;
mod select;
mod types;

pub use execute::{execute, execute_all};
pub use select::{SelectOptions, select_for_packaging};
pub use types::{HttpsBinding, PackageError, PackageSource, PackageTask};
