//! Row types for the roster tables.

pub mod clan;
pub mod member;
