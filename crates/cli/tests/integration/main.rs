mod common;
mod config_tests;
mod ledger_tests;
mod run_tests;
