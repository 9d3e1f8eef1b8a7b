use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on a stored message body, in characters.
pub const MAX_BODY_CHARS: usize = 1000;

/// What kind of participant a sharer is. System senders never log in; they
/// exist so automated notices have a sharezone-scoped author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharerKind {
    Member,
    SystemSender,
}

impl SharerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SharerKind::Member => "member",
            SharerKind::SystemSender => "system_sender",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(SharerKind::Member),
            "system_sender" => Some(SharerKind::SystemSender),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sharer {
    pub id: Uuid,
    /// Unique login identity.
    pub username: String,
    /// Display name, used to label conversations.
    pub name: String,
    /// `None` until the member is assigned to a community.
    pub sharezone: Option<Uuid>,
    pub kind: SharerKind,
    /// Site-wide administrator; sees message history across every sharezone.
    pub global_admin: bool,
}

impl Sharer {
    /// Identity comparison. Two snapshots of the same sharer taken at
    /// different times still compare equal here even if their fields drifted.
    pub fn is(&self, other: &Sharer) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sharezone {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// A direct message. `from_user` and `to_user` are resolved to the sharers'
/// current records when the message is loaded; `sharezone` is the community
/// the message was sent within and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub from_user: Sharer,
    pub to_user: Sharer,
    pub timestamp: DateTime<Utc>,
    pub body: String,
    pub read: bool,
    pub sharezone: Uuid,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "From: {}", self.from_user.name)?;
        writeln!(f, "To: {}", self.to_user.name)?;
        writeln!(f, "Message: {}", self.body)
    }
}

/// A completed hand-off of a tool between two members, awaiting the
/// receiver's confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub sharezone: Uuid,
    pub tool: String,
    pub from_user: Sharer,
    pub to_user: Sharer,
}

/// Messages from one correspondent, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub correspondent: String,
    pub messages: Vec<Message>,
}

/// Messages sent from one sharer to another, as shown in the admin history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBucket {
    pub from: String,
    pub to: String,
    pub messages: Vec<Message>,
}

/// A member that can be picked in a username drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectableUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

impl From<&Sharer> for SelectableUser {
    fn from(sharer: &Sharer) -> Self {
        Self {
            id: sharer.id,
            username: sharer.username.clone(),
            name: sharer.name.clone(),
        }
    }
}

/// One side of a history query: either a concrete username or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Any,
    Username(String),
}

impl UserFilter {
    /// Absent, blank, and the literal `Any` all mean the wildcard.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("Any") => UserFilter::Any,
            Some(name) => UserFilter::Username(name.to_string()),
        }
    }

    pub fn matches(&self, sharer: &Sharer) -> bool {
        match self {
            UserFilter::Any => true,
            UserFilter::Username(name) => sharer.username == *name,
        }
    }
}
