//! Domain types shared by every `clanwatch` crate.
//!
//! Holds the rank vocabulary and experience ladder, the free-text status
//! parser, the roster store contract, and the presentation helpers used
//! by the chat front end. Nothing in here performs I/O.

pub mod error;
pub mod hashing;
pub mod parser;
pub mod rank;
pub mod report;
pub mod roster;
pub mod types;
