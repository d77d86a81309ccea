use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::actor::UnknownName;

/// Guarded actions. Which ones apply to a resource kind is decided by that
/// kind's rule table; asking for anything else is a contract error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
    Approve,
    Reject,
    Answer,
    Accept,
    Decline,
    MarkAsRead,
    Download,
    Share,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::ViewAny,
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Restore,
        Action::ForceDelete,
        Action::Approve,
        Action::Reject,
        Action::Answer,
        Action::Accept,
        Action::Decline,
        Action::MarkAsRead,
        Action::Download,
        Action::Share,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewAny => "viewAny",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::ForceDelete => "forceDelete",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Answer => "answer",
            Action::Accept => "accept",
            Action::Decline => "decline",
            Action::MarkAsRead => "markAsRead",
            Action::Download => "download",
            Action::Share => "share",
        }
    }

    /// Collection-level actions have no instance to inspect yet.
    pub fn is_collection(&self) -> bool {
        matches!(self, Action::ViewAny | Action::Create)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownName { kind: "action", value: s.to_string() })
    }
}
