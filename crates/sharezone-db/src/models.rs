//! Database row types, mapped straight off SQLite rows and converted to the
//! shared models only once every id has parsed.
use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use sharezone_types::models::{Message, Sharer, SharerKind, Sharezone};

use crate::{Result, StoreError};

pub(crate) const SHARER_COLUMNS: &str = "id, username, name, sharezone_id, kind, global_admin";

pub struct SharerRow {
    pub id: String,
    pub username: String,
    pub name: String,
    pub sharezone_id: Option<String>,
    pub kind: String,
    pub global_admin: bool,
}

impl SharerRow {
    /// Reads six consecutive columns starting at `offset`.
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            username: row.get(offset + 1)?,
            name: row.get(offset + 2)?,
            sharezone_id: row.get(offset + 3)?,
            kind: row.get(offset + 4)?,
            global_admin: row.get(offset + 5)?,
        })
    }

    pub fn into_model(self) -> Result<Sharer> {
        let kind = SharerKind::parse(&self.kind)
            .ok_or_else(|| StoreError::Corrupt(format!("sharer {} has kind '{}'", self.id, self.kind)))?;
        let sharezone = self
            .sharezone_id
            .as_deref()
            .map(|sz| parse_id(sz, "sharezone_id"))
            .transpose()?;

        Ok(Sharer {
            id: parse_id(&self.id, "sharer id")?,
            username: self.username,
            name: self.name,
            sharezone,
            kind,
            global_admin: self.global_admin,
        })
    }
}

pub struct SharezoneRow {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl SharezoneRow {
    pub fn into_model(self) -> Result<Sharezone> {
        Ok(Sharezone {
            id: parse_id(&self.id, "sharezone id")?,
            name: self.name,
            description: self.description,
        })
    }
}

pub struct MessageRow {
    pub id: String,
    pub sharezone_id: String,
    pub body: String,
    pub read: bool,
    pub created_at: i64,
    pub from_user: SharerRow,
    pub to_user: SharerRow,
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sharezone_id: row.get(1)?,
            body: row.get(2)?,
            read: row.get(3)?,
            created_at: row.get(4)?,
            from_user: SharerRow::from_row(row, 5)?,
            to_user: SharerRow::from_row(row, 11)?,
        })
    }

    pub fn into_model(self) -> Result<Message> {
        let timestamp = DateTime::<Utc>::from_timestamp_micros(self.created_at).ok_or_else(|| {
            StoreError::Corrupt(format!("message {} has created_at {}", self.id, self.created_at))
        })?;

        Ok(Message {
            id: parse_id(&self.id, "message id")?,
            from_user: self.from_user.into_model()?,
            to_user: self.to_user.into_model()?,
            timestamp,
            body: self.body,
            read: self.read,
            sharezone: parse_id(&self.sharezone_id, "message sharezone_id")?,
        })
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| StoreError::Corrupt(format!("{} '{}': {}", what, raw, e)))
}
