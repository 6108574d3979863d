//! Free-text status parser.
//!
//! Turns a peer bot reply or the visible text of a scraped profile page
//! into a [`ParsedStatus`]. Parsing never fails: a missing signal keeps
//! the caller's default.
//!
//! Rank detection walks [`RANK_PRIORITY`] and takes the first name found
//! in the text. Several rank names contain others ("Lieutenant Colonel"
//! contains "Colonel", "Sergeant Major" contains both "Sergeant" and
//! "Major"), so every name must appear before any shorter name it
//! contains. Do not reorder the list alphabetically or by ladder.

use std::sync::LazyLock;

use regex::Regex;

use crate::rank::{rank_for_experience, Rank};

/// Rank names in detection order, most specific first.
pub const RANK_PRIORITY: [Rank; 30] = [
    Rank::Generalissimo,
    Rank::FieldMarshal,
    Rank::LieutenantGeneral,
    Rank::MajorGeneral,
    Rank::LieutenantColonel,
    Rank::SergeantFirstClass,
    Rank::SergeantMajor,
    Rank::MasterSergeant,
    Rank::FirstSergeant,
    Rank::StaffSergeant,
    Rank::MasterCorporal,
    Rank::ChiefWarrantOfficer5,
    Rank::ChiefWarrantOfficer4,
    Rank::ChiefWarrantOfficer3,
    Rank::ChiefWarrantOfficer2,
    Rank::WarrantOfficer1,
    Rank::SecondLieutenant,
    Rank::FirstLieutenant,
    Rank::Commander,
    Rank::Marshal,
    Rank::General,
    Rank::Brigadier,
    Rank::Colonel,
    Rank::Major,
    Rank::Captain,
    Rank::Sergeant,
    Rank::Corporal,
    Rank::Gefreiter,
    Rank::Private,
    Rank::Recruit,
];

/// Lowercase substrings that mark a player as online.
const ONLINE_INDICATORS: &[&str] = &[
    "online",
    "в сети",
    "🟢",
    "active",
    "playing",
    "играет",
    "in battle",
];

/// Negated phrases that contain a positive indicator and must be removed
/// before the indicator scan.
const NEGATED_PHRASES: &[&str] = &["не в сети", "inactive"];

/// `Online` label followed by a yes/no token on the same or next line,
/// e.g. `Online: Yes` or an embed field rendered as `Online\nNo`.
static ONLINE_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:online|в сети)[ \t]*[:\-]?[ \t]*(?:\r?\n[ \t]*)?(yes|no|true|false|да|нет)\b",
    )
    .expect("valid regex")
});

static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:experience|опыт)[ \t]*[:\-]?\s*(\d[\d,]*)").expect("valid regex")
});

/// Where the parsed rank came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankSource {
    /// Derived from an experience figure through the rank table.
    Experience,
    /// A rank name found in the text.
    Text,
    /// Nothing recognisable; the caller's default was kept.
    Default,
}

/// Normalised result of parsing a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatus {
    pub rank: Rank,
    pub is_online: bool,
    pub experience: Option<u64>,
    pub rank_source: RankSource,
}

impl ParsedStatus {
    /// Whether the text carried any rank signal at all.
    pub fn has_rank_signal(&self) -> bool {
        self.rank_source != RankSource::Default
    }
}

/// Parse `raw` into a status, falling back to `default_rank` when the
/// text names no rank and carries no experience figure.
pub fn parse(raw: &str, default_rank: Rank) -> ParsedStatus {
    let is_online = detect_online(raw);
    let experience = detect_experience(raw);

    let (rank, rank_source) = match (experience, detect_rank(raw)) {
        (Some(exp), _) => (rank_for_experience(exp), RankSource::Experience),
        (None, Some(rank)) => (rank, RankSource::Text),
        (None, None) => (default_rank, RankSource::Default),
    };

    ParsedStatus {
        rank,
        is_online,
        experience,
        rank_source,
    }
}

/// First rank of [`RANK_PRIORITY`] whose name occurs in `raw`.
pub fn detect_rank(raw: &str) -> Option<Rank> {
    RANK_PRIORITY
        .iter()
        .copied()
        .find(|rank| raw.contains(rank.as_str()))
}

/// Online if a structured `Online: <yes/no>` field says so, otherwise if
/// any positive indicator appears outside a negated phrase.
///
/// The structured field is authoritative: `Online: No` wins over a stray
/// "🟢" or "playing" elsewhere in the text. The indicator scan is only a
/// union over what remains once "inactive" and "не в сети" are removed,
/// since both contain a positive indicator as a substring.
pub fn detect_online(raw: &str) -> bool {
    if let Some(caps) = ONLINE_FIELD_RE.captures(raw) {
        let token = caps[1].to_lowercase();
        return matches!(token.as_str(), "yes" | "true" | "да");
    }

    let mut lowered = raw.to_lowercase();
    for phrase in NEGATED_PHRASES {
        lowered = lowered.replace(phrase, " ");
    }
    ONLINE_INDICATORS
        .iter()
        .any(|indicator| lowered.contains(indicator))
}

/// Experience figure following an `Experience` label. Thousands
/// separators are accepted; values that overflow are ignored.
pub fn detect_experience(raw: &str) -> Option<u64> {
    let caps = EXPERIENCE_RE.captures(raw)?;
    let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
