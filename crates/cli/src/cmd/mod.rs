mod config;
mod hash;
mod inputs;
mod ledger;
mod plan;
mod run;

pub use config::{ConfigCommand, cmd_config};
pub use hash::cmd_hash;
pub use inputs::RunArgs;
pub use ledger::{LedgerCommand, cmd_ledger};
pub use plan::cmd_plan;
pub use run::cmd_run;
