//! Rank vocabulary and the experience ladder.
//!
//! [`Rank`] is the only representation of a rank that leaves the parser:
//! free-text rank strings never reach the roster store. [`RANK_TABLE`]
//! maps ascending experience thresholds to ranks and backs both
//! [`rank_for_experience`] and its inverse [`base_experience`].

use std::fmt;
use std::str::FromStr;

/// A player rank, lowest to highest, plus `Unknown` for members that
/// have never been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Recruit,
    Private,
    Gefreiter,
    Corporal,
    MasterCorporal,
    Sergeant,
    StaffSergeant,
    SergeantFirstClass,
    MasterSergeant,
    FirstSergeant,
    SergeantMajor,
    WarrantOfficer1,
    ChiefWarrantOfficer2,
    ChiefWarrantOfficer3,
    ChiefWarrantOfficer4,
    ChiefWarrantOfficer5,
    SecondLieutenant,
    FirstLieutenant,
    Captain,
    Major,
    LieutenantColonel,
    Colonel,
    Brigadier,
    MajorGeneral,
    LieutenantGeneral,
    General,
    Marshal,
    FieldMarshal,
    Commander,
    Generalissimo,
    Unknown,
}

/// Experience required for each rank, ascending. Thresholds are strictly
/// increasing and the first entry is always `(0, Recruit)`.
pub const RANK_TABLE: [(u64, Rank); 30] = [
    (0, Rank::Recruit),
    (500, Rank::Private),
    (1_500, Rank::Gefreiter),
    (3_700, Rank::Corporal),
    (7_300, Rank::MasterCorporal),
    (13_300, Rank::Sergeant),
    (22_500, Rank::StaffSergeant),
    (36_300, Rank::SergeantFirstClass),
    (56_300, Rank::MasterSergeant),
    (83_800, Rank::FirstSergeant),
    (121_000, Rank::SergeantMajor),
    (170_500, Rank::WarrantOfficer1),
    (234_800, Rank::ChiefWarrantOfficer2),
    (316_700, Rank::ChiefWarrantOfficer3),
    (419_300, Rank::ChiefWarrantOfficer4),
    (546_000, Rank::ChiefWarrantOfficer5),
    (700_700, Rank::SecondLieutenant),
    (888_600, Rank::FirstLieutenant),
    (1_113_300, Rank::Captain),
    (1_380_000, Rank::Major),
    (1_693_300, Rank::LieutenantColonel),
    (2_059_100, Rank::Colonel),
    (2_483_500, Rank::Brigadier),
    (2_974_000, Rank::MajorGeneral),
    (3_538_500, Rank::LieutenantGeneral),
    (4_185_500, Rank::General),
    (4_923_000, Rank::Marshal),
    (5_760_500, Rank::FieldMarshal),
    (6_708_000, Rank::Commander),
    (7_776_000, Rank::Generalissimo),
];

impl Rank {
    /// Display name as used by the game and stored in the roster.
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Recruit => "Recruit",
            Rank::Private => "Private",
            Rank::Gefreiter => "Gefreiter",
            Rank::Corporal => "Corporal",
            Rank::MasterCorporal => "Master Corporal",
            Rank::Sergeant => "Sergeant",
            Rank::StaffSergeant => "Staff Sergeant",
            Rank::SergeantFirstClass => "Sergeant First Class",
            Rank::MasterSergeant => "Master Sergeant",
            Rank::FirstSergeant => "First Sergeant",
            Rank::SergeantMajor => "Sergeant Major",
            Rank::WarrantOfficer1 => "Warrant Officer 1",
            Rank::ChiefWarrantOfficer2 => "Chief Warrant Officer 2",
            Rank::ChiefWarrantOfficer3 => "Chief Warrant Officer 3",
            Rank::ChiefWarrantOfficer4 => "Chief Warrant Officer 4",
            Rank::ChiefWarrantOfficer5 => "Chief Warrant Officer 5",
            Rank::SecondLieutenant => "Second Lieutenant",
            Rank::FirstLieutenant => "First Lieutenant",
            Rank::Captain => "Captain",
            Rank::Major => "Major",
            Rank::LieutenantColonel => "Lieutenant Colonel",
            Rank::Colonel => "Colonel",
            Rank::Brigadier => "Brigadier",
            Rank::MajorGeneral => "Major General",
            Rank::LieutenantGeneral => "Lieutenant General",
            Rank::General => "General",
            Rank::Marshal => "Marshal",
            Rank::FieldMarshal => "Field Marshal",
            Rank::Commander => "Commander",
            Rank::Generalissimo => "Generalissimo",
            Rank::Unknown => "Unknown",
        }
    }

    /// Position on the ladder (0 = Recruit), `None` for `Unknown`.
    pub fn ladder_index(self) -> Option<usize> {
        RANK_TABLE.iter().position(|(_, rank)| *rank == self)
    }

    /// Convert a stored column value back into a rank. Values outside the
    /// vocabulary map to `Unknown`.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(Rank::Unknown)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not part of the rank vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognised rank: {0}")]
pub struct UnknownRankError(pub String);

impl FromStr for Rank {
    type Err = UnknownRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(Rank::Unknown.as_str()) {
            return Ok(Rank::Unknown);
        }
        RANK_TABLE
            .iter()
            .map(|(_, rank)| *rank)
            .find(|rank| rank.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRankError(s.to_string()))
    }
}

/// Rank earned with `experience` points: the rank of the highest
/// threshold that does not exceed it.
pub fn rank_for_experience(experience: u64) -> Rank {
    let mut achieved = Rank::Recruit;
    for (required, rank) in RANK_TABLE {
        if experience >= required {
            achieved = rank;
        } else {
            break;
        }
    }
    achieved
}

/// Experience at which `rank` is first reached. `Unknown` anchors at 0.
pub fn base_experience(rank: Rank) -> u64 {
    RANK_TABLE
        .iter()
        .find(|(_, r)| *r == rank)
        .map(|(required, _)| *required)
        .unwrap_or(0)
}

/// Experience at which the rank after `rank` is reached, `None` for the
/// top rank and for `Unknown`.
pub fn next_threshold(rank: Rank) -> Option<u64> {
    let idx = rank.ladder_index()?;
    RANK_TABLE.get(idx + 1).map(|(required, _)| *required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase_from_zero() {
        assert_eq!(RANK_TABLE[0], (0, Rank::Recruit));
        for pair in RANK_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn recruit_below_first_promotion() {
        for exp in [0, 1, 250, 499] {
            assert_eq!(rank_for_experience(exp), Rank::Recruit);
        }
        assert_eq!(rank_for_experience(500), Rank::Private);
    }

    #[test]
    fn exact_thresholds_award_the_rank() {
        for (required, rank) in RANK_TABLE {
            assert_eq!(rank_for_experience(required), rank);
        }
    }

    #[test]
    fn lookup_is_monotonic() {
        let mut previous = 0usize;
        for exp in (0..8_000_000u64).step_by(7_919) {
            let idx = rank_for_experience(exp)
                .ladder_index()
                .expect("lookup never yields Unknown");
            assert!(idx >= previous, "rank dropped at {exp}");
            previous = idx;
        }
    }

    #[test]
    fn top_rank_is_open_ended() {
        assert_eq!(rank_for_experience(u64::MAX), Rank::Generalissimo);
        assert_eq!(next_threshold(Rank::Generalissimo), None);
    }

    #[test]
    fn base_experience_inverts_the_table() {
        assert_eq!(base_experience(Rank::Captain), 1_113_300);
        assert_eq!(base_experience(Rank::Recruit), 0);
        assert_eq!(base_experience(Rank::Unknown), 0);
        assert_eq!(rank_for_experience(base_experience(Rank::Major)), Rank::Major);
    }

    #[test]
    fn parses_display_names_case_insensitively() {
        assert_eq!("Lieutenant Colonel".parse::<Rank>(), Ok(Rank::LieutenantColonel));
        assert_eq!("master sergeant".parse::<Rank>(), Ok(Rank::MasterSergeant));
        assert_eq!("Unknown".parse::<Rank>(), Ok(Rank::Unknown));
        assert!("Admiral".parse::<Rank>().is_err());
        assert_eq!(Rank::from_stored("Admiral"), Rank::Unknown);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for (_, rank) in RANK_TABLE {
            assert_eq!(rank.to_string().parse::<Rank>(), Ok(rank));
        }
    }
}
