//! Member status monitoring engine.
//!
//! [`engine::MonitoringEngine`] runs a single background polling loop
//! over the roster. Each due member is resolved through a
//! [`chain::StrategyChain`]: fixed identity overrides, then the peer bot
//! query, then the web lookup, and finally the deterministic synthetic
//! fallback, which never fails. Results are written back through the
//! [`clanwatch_core::roster::RosterStore`].

pub mod cadence;
pub mod chain;
pub mod config;
pub mod engine;
pub mod overrides;
pub mod peer;
pub mod source;
pub mod synthetic;
pub mod web;
