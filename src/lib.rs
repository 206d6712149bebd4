//! Local OCM demo playground: prerequisite reconciliation, registry
//! lifecycle, and guided demo runs for the Open Component Model tooling.

pub mod cli;
pub mod commands;
pub mod config;
pub mod demo;
pub mod docker;
pub mod environment;
pub mod install;
pub mod ocm;
pub mod output;
pub mod probe;
pub mod registry;
pub mod runner;
