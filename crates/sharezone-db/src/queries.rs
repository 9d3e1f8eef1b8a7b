use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{debug, error, info};
use uuid::Uuid;

use sharezone_types::models::{MAX_BODY_CHARS, Message, Sharer, SharerKind, Sharezone};

use crate::models::{MessageRow, SHARER_COLUMNS, SharerRow, SharezoneRow};
use crate::{Database, Result, StoreError};

const MESSAGE_SELECT: &str = "
    SELECT m.id, m.sharezone_id, m.body, m.read, m.created_at,
           f.id, f.username, f.name, f.sharezone_id, f.kind, f.global_admin,
           t.id, t.username, t.name, t.sharezone_id, t.kind, t.global_admin
    FROM messages m
    JOIN sharers f ON m.from_id = f.id
    JOIN sharers t ON m.to_id = t.id";

/// Which messages `list_messages` returns. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub to_user: Option<Uuid>,
    pub from_user: Option<Uuid>,
    pub sharezone: Option<Uuid>,
    pub unread_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageOrder {
    /// Grouped by sender (display name, then id), newest first within a sender.
    #[default]
    SenderThenNewest,
    NewestFirst,
}

impl MessageOrder {
    fn sql(self) -> &'static str {
        match self {
            MessageOrder::SenderThenNewest => "ORDER BY f.name, f.id, m.created_at DESC",
            MessageOrder::NewestFirst => "ORDER BY m.created_at DESC",
        }
    }
}

impl Database {
    // -- Sharezones --

    pub fn create_sharezone(&self, id: Uuid, name: &str, description: &str) -> Result<Sharezone> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sharezones (id, name, description) VALUES (?1, ?2, ?3)",
                params![id.to_string(), name, description],
            )?;
            Ok(Sharezone {
                id,
                name: name.to_string(),
                description: description.to_string(),
            })
        })
    }

    pub fn get_sharezone(&self, id: Uuid) -> Result<Option<Sharezone>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, description FROM sharezones WHERE id = ?1",
                [id.to_string()],
                |row| {
                    Ok(SharezoneRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?
            .map(SharezoneRow::into_model)
            .transpose()
        })
    }

    pub fn add_admin(&self, sharezone: Uuid, sharer: Uuid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO sharezone_admins (sharezone_id, sharer_id) VALUES (?1, ?2)",
                params![sharezone.to_string(), sharer.to_string()],
            )?;
            Ok(())
        })
    }

    pub fn is_admin_of(&self, sharer: Uuid, sharezone: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM sharezone_admins WHERE sharezone_id = ?1 AND sharer_id = ?2",
                    params![sharezone.to_string(), sharer.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Sharers --

    pub fn create_sharer(
        &self,
        id: Uuid,
        username: &str,
        name: &str,
        sharezone: Option<Uuid>,
    ) -> Result<Sharer> {
        self.insert_sharer(id, username, name, sharezone, SharerKind::Member)
    }

    /// Creates the system identity that authors automated notices for a
    /// sharezone. Its username is derived from the sharezone id.
    pub fn create_shed_sender(&self, id: Uuid, sharezone: Uuid, name: &str) -> Result<Sharer> {
        let username = format!("shed:{}", sharezone);
        self.insert_sharer(id, &username, name, Some(sharezone), SharerKind::SystemSender)
    }

    fn insert_sharer(
        &self,
        id: Uuid,
        username: &str,
        name: &str,
        sharezone: Option<Uuid>,
        kind: SharerKind,
    ) -> Result<Sharer> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sharers (id, username, name, sharezone_id, kind) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    username,
                    name,
                    sharezone.map(|sz| sz.to_string()),
                    kind.as_str()
                ],
            )?;
            Ok(Sharer {
                id,
                username: username.to_string(),
                name: name.to_string(),
                sharezone,
                kind,
                global_admin: false,
            })
        })
    }

    /// Moves a sharer to another sharezone (or none). Existing messages keep
    /// the sharezone they were sent within.
    pub fn set_sharezone(&self, sharer: Uuid, sharezone: Option<Uuid>) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sharers SET sharezone_id = ?2 WHERE id = ?1",
                params![sharer.to_string(), sharezone.map(|sz| sz.to_string())],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn set_global_admin(&self, sharer: Uuid, global_admin: bool) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sharers SET global_admin = ?2 WHERE id = ?1",
                params![sharer.to_string(), global_admin],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn get_sharer_by_username(&self, username: &str) -> Result<Option<Sharer>> {
        self.with_conn(|conn| {
            query_sharer(conn, &format!("SELECT {SHARER_COLUMNS} FROM sharers WHERE username = ?1"), username)
        })
    }

    pub fn get_sharer_by_id(&self, id: Uuid) -> Result<Option<Sharer>> {
        self.with_conn(|conn| {
            query_sharer(conn, &format!("SELECT {SHARER_COLUMNS} FROM sharers WHERE id = ?1"), &id.to_string())
        })
    }

    /// The system sender scoped to `sharezone`, if one has been created.
    pub fn shed_sender_of(&self, sharezone: Uuid) -> Result<Option<Sharer>> {
        self.with_conn(|conn| {
            query_sharer(
                conn,
                &format!(
                    "SELECT {SHARER_COLUMNS} FROM sharers
                     WHERE sharezone_id = ?1 AND kind = 'system_sender'
                     ORDER BY created_at, id LIMIT 1"
                ),
                &sharezone.to_string(),
            )
        })
    }

    /// Ordinary members, optionally restricted to one sharezone, by username.
    pub fn list_members(&self, sharezone: Option<Uuid>) -> Result<Vec<Sharer>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {SHARER_COLUMNS} FROM sharers WHERE kind = 'member'");
            let mut values = Vec::new();
            if let Some(sz) = sharezone {
                sql.push_str(" AND sharezone_id = ?1");
                values.push(sz.to_string());
            }
            sql.push_str(" ORDER BY username");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), |row| SharerRow::from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(SharerRow::into_model).collect()
        })
    }

    // -- Messages --

    /// Persists a message, assigning its id and timestamp. Every data-model
    /// invariant is re-checked here against the sharers' current records.
    pub fn insert_message(
        &self,
        from_user: Uuid,
        to_user: Uuid,
        sharezone: Uuid,
        body: &str,
    ) -> Result<Message> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let from = require_sharer(&tx, from_user, "sender")?;
            let to = require_sharer(&tx, to_user, "recipient")?;
            check_message_invariants(&from, &to, sharezone, body).inspect_err(|e| {
                error!("Refusing to store message {} -> {}: {}", from.username, to.username, e);
            })?;

            let last: i64 =
                tx.query_row("SELECT COALESCE(MAX(created_at), 0) FROM messages", [], |r| r.get(0))?;
            let created_at = Utc::now().timestamp_micros().max(last + 1);
            let id = Uuid::new_v4();

            tx.execute(
                "INSERT INTO messages (id, from_id, to_id, sharezone_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    from_user.to_string(),
                    to_user.to_string(),
                    sharezone.to_string(),
                    body,
                    created_at
                ],
            )?;
            tx.commit()?;

            debug!("Stored message {} from {} to {}", id, from.username, to.username);

            let timestamp = DateTime::<Utc>::from_timestamp_micros(created_at)
                .ok_or_else(|| StoreError::Corrupt(format!("timestamp {} out of range", created_at)))?;

            Ok(Message {
                id,
                from_user: from,
                to_user: to,
                timestamp,
                body: body.to_string(),
                read: false,
                sharezone,
            })
        })
    }

    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Deletes a message outright and hands back what was removed.
    pub fn delete_message(&self, id: Uuid) -> Result<Message> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let message = query_message(&tx, id)?;
            tx.execute("DELETE FROM messages WHERE id = ?1", [id.to_string()])?;
            tx.commit()?;

            info!("Deleted message {}", id);
            Ok(message)
        })
    }

    pub fn list_messages(&self, filter: &MessageFilter, order: MessageOrder) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut clauses = Vec::new();
            let mut values = Vec::new();

            let columns = [
                ("m.to_id", filter.to_user),
                ("m.from_id", filter.from_user),
                ("m.sharezone_id", filter.sharezone),
            ];
            for (column, value) in columns {
                if let Some(id) = value {
                    values.push(id.to_string());
                    clauses.push(format!("{} = ?{}", column, values.len()));
                }
            }
            if filter.unread_only {
                clauses.push("m.read = 0".to_string());
            }

            let mut sql = MESSAGE_SELECT.to_string();
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push(' ');
            sql.push_str(order.sql());

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(MessageRow::into_model).collect()
        })
    }

    /// Flips one message's read flag. Returns whether this call changed it;
    /// an already-read message is left alone.
    pub fn mark_read(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET read = 1 WHERE id = ?1 AND read = 0",
                [id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_unread(&self, to_user: Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE to_id = ?1 AND read = 0",
                [to_user.to_string()],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
    }
}

fn check_message_invariants(from: &Sharer, to: &Sharer, sharezone: Uuid, body: &str) -> Result<()> {
    if from.is(to) {
        return Err(StoreError::ConstraintViolation(format!(
            "sender and recipient are both {}",
            from.username
        )));
    }
    if from.sharezone != Some(sharezone) {
        return Err(StoreError::ConstraintViolation(format!(
            "sender {} is not in sharezone {}",
            from.username, sharezone
        )));
    }
    if to.sharezone != Some(sharezone) {
        return Err(StoreError::ConstraintViolation(format!(
            "recipient {} is not in sharezone {}",
            to.username, sharezone
        )));
    }
    let chars = body.chars().count();
    if chars == 0 || chars > MAX_BODY_CHARS {
        return Err(StoreError::ConstraintViolation(format!(
            "body length {} outside 1..={}",
            chars, MAX_BODY_CHARS
        )));
    }
    Ok(())
}

fn require_sharer(conn: &Connection, id: Uuid, role: &str) -> Result<Sharer> {
    query_sharer(conn, &format!("SELECT {SHARER_COLUMNS} FROM sharers WHERE id = ?1"), &id.to_string())?
        .ok_or_else(|| StoreError::ConstraintViolation(format!("unknown {} {}", role, id)))
}

fn query_sharer(conn: &Connection, sql: &str, key: &str) -> Result<Option<Sharer>> {
    let mut stmt = conn.prepare(sql)?;

    stmt.query_row([key], |row| SharerRow::from_row(row, 0))
        .optional()?
        .map(SharerRow::into_model)
        .transpose()
}

fn query_message(conn: &Connection, id: Uuid) -> Result<Message> {
    let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
    let mut stmt = conn.prepare(&sql)?;

    stmt.query_row([id.to_string()], MessageRow::from_row)
        .optional()?
        .ok_or(StoreError::NotFound)?
        .into_model()
}
