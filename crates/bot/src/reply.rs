//! Transport-independent command replies.
//!
//! Commands produce a [`Reply`]; the Discord layer decides how it looks.

use clanwatch_core::report::ClanReport;

/// Outcome of a command, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command changed the roster.
    Success { title: String, description: String },
    /// The command was rejected or failed. The description is safe to
    /// show to the user.
    Failure { title: String, description: String },
    /// Read-only information such as listings and help.
    Info { title: String, description: String },
    /// A clan's member report.
    Clan(ClanReport),
}

impl Reply {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Reply::Success {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Reply::Failure {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Reply::Info {
            title: title.into(),
            description: description.into(),
        }
    }
}
