//! forgesync library crate — re-exports for integration tests.
//!
//! The primary interface is the `forgesync` binary. This lib.rs exposes the
//! internal modules so that integration tests can exercise the clone
//! executor, the reconciliation engine, and the status scanner directly
//! without going through the CLI.

pub mod classify;
pub mod clone;
pub mod cmd;
pub mod config;
pub mod format;
pub mod git;
pub mod layout;
pub mod reconcile;
pub mod status;
pub mod tags;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testutil;
