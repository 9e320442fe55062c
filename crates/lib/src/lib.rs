//! deployver-lib: change detection and version assignment for multi-service deployments
//!
//! This crate provides:
//! - `hasher`: content hashes of service build outputs, aggregated per application
//! - `version`: the immutable `Version` value and the per-run `GlobalVersionMap`
//! - `assign`: the diff against the deployed map that decides every component's version
//! - `ledger`: persistence of version maps between runs
//! - `package`: selection and materialization of versioned packages
//! - `pipeline`: one full run tying the stages together

pub mod assign;
pub mod config;
pub mod consts;
pub mod hasher;
pub mod ledger;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod project;
pub mod util;
pub mod version;
