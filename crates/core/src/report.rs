//! Clan reports for the chat front end.
//!
//! [`ClanReport`] lays a clan out as titled fields with markdown values.
//! Colours, footers and timestamps belong to the transport.

use crate::rank::Rank;
use crate::roster::Member;

/// Members listed per section before the remainder is summarised.
pub const SECTION_LIMIT: usize = 10;

/// Insignia shown next to a rank name.
pub fn rank_icon(rank: Rank) -> &'static str {
    match rank {
        Rank::Recruit => "🔸",
        Rank::Private => "🔹",
        Rank::Gefreiter => "🔸🔹",
        Rank::Corporal => "🔷",
        Rank::MasterCorporal => "🔷🔸",
        Rank::Sergeant => "🔷🔷",
        Rank::StaffSergeant => "🔷🔷🔸",
        Rank::SergeantFirstClass => "🔷🔷🔷",
        Rank::MasterSergeant => "🔶",
        Rank::FirstSergeant => "🔶🔸",
        Rank::SergeantMajor => "🔶🔶",
        Rank::WarrantOfficer1 => "🔶🔶🔸",
        Rank::ChiefWarrantOfficer2 => "🔶🔶🔶",
        Rank::ChiefWarrantOfficer3 => "🔶🔶🔶🔸",
        Rank::ChiefWarrantOfficer4 => "🔶🔶🔶🔶",
        Rank::ChiefWarrantOfficer5 => "🔶🔶🔶🔶🔸",
        Rank::SecondLieutenant => "🟨",
        Rank::FirstLieutenant => "🟨🔸",
        Rank::Captain => "🟨🟨🟨🟨",
        Rank::Major => "⭐",
        Rank::LieutenantColonel => "⭐🔸",
        Rank::Colonel => "⭐⭐",
        Rank::Brigadier => "⭐⭐🔸",
        Rank::MajorGeneral => "⭐⭐⭐",
        Rank::LieutenantGeneral => "⭐⭐⭐🔸",
        Rank::General => "⭐⭐⭐⭐",
        Rank::Marshal => "👑",
        Rank::FieldMarshal => "👑🔸",
        Rank::Commander => "👑👑",
        Rank::Generalissimo => "👑👑👑",
        Rank::Unknown => "🔸",
    }
}

/// Heading of the totals field.
pub const STATISTICS_HEADING: &str = "📊 Statistics";
pub const ONLINE_HEADING: &str = "🟢 Online Members";
pub const OFFLINE_HEADING: &str = "🔴 Offline Members";
/// Heading used instead of the member lists for an empty clan.
pub const EMPTY_HEADING: &str = "👥 Members";

/// One titled block of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportField {
    pub name: &'static str,
    pub value: String,
    /// Whether the field may sit beside its neighbours.
    pub inline: bool,
}

/// A clan's members split by online state, ready to be laid out as
/// titled fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanReport {
    pub clan_name: String,
    pub online: Vec<Member>,
    pub offline: Vec<Member>,
}

impl ClanReport {
    pub fn new(clan_name: impl Into<String>, members: Vec<Member>) -> Self {
        let (online, offline) = members.into_iter().partition(|m| m.is_online);
        Self {
            clan_name: clan_name.into(),
            online,
            offline,
        }
    }

    pub fn total(&self) -> usize {
        self.online.len() + self.offline.len()
    }

    pub fn title(&self) -> String {
        format!("🏆 Clan: {}", self.clan_name)
    }

    /// Statistics first, then the online and offline lists, each
    /// omitted when empty. An empty clan gets a single placeholder field
    /// after the statistics.
    pub fn fields(&self) -> Vec<ReportField> {
        let mut fields = vec![ReportField {
            name: STATISTICS_HEADING,
            value: format!(
                "**Total Members:** {}\n**Online:** {} 🟢\n**Offline:** {} 🔴",
                self.total(),
                self.online.len(),
                self.offline.len(),
            ),
            inline: true,
        }];

        if self.total() == 0 {
            fields.push(ReportField {
                name: EMPTY_HEADING,
                value: "No members in this clan yet.".to_string(),
                inline: false,
            });
            return fields;
        }

        fields.extend(member_list(ONLINE_HEADING, "🟢", &self.online));
        fields.extend(member_list(OFFLINE_HEADING, "🔴", &self.offline));
        fields
    }
}

fn member_list(name: &'static str, marker: &str, members: &[Member]) -> Option<ReportField> {
    if members.is_empty() {
        return None;
    }
    let mut lines: Vec<String> = members
        .iter()
        .take(SECTION_LIMIT)
        .map(|m| format!("{marker} **{}** {} {}", m.username, rank_icon(m.rank), m.rank))
        .collect();
    if members.len() > SECTION_LIMIT {
        lines.push(format!("... and {} more", members.len() - SECTION_LIMIT));
    }
    Some(ReportField {
        name,
        value: lines.join("\n"),
        inline: false,
    })
}
