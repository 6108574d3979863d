//! Discord front end for the clan roster monitor.
//!
//! Exposes the command layer, configuration, gateway glue, and liveness
//! routes so integration tests and the binary entrypoint can both use
//! them.

pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod health;
pub mod reply;
