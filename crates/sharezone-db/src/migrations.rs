use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (membership + messages)");
        conn.execute_batch(
            "
            CREATE TABLE sharezones (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE sharers (
                id            TEXT PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE,
                name          TEXT NOT NULL,
                sharezone_id  TEXT REFERENCES sharezones(id),
                kind          TEXT NOT NULL DEFAULT 'member',
                global_admin  INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_sharers_sharezone
                ON sharers(sharezone_id, kind);

            CREATE TABLE sharezone_admins (
                sharezone_id  TEXT NOT NULL REFERENCES sharezones(id) ON DELETE CASCADE,
                sharer_id     TEXT NOT NULL REFERENCES sharers(id) ON DELETE CASCADE,
                PRIMARY KEY (sharezone_id, sharer_id)
            );

            -- created_at holds microseconds since the epoch, assigned by the store
            CREATE TABLE messages (
                id            TEXT PRIMARY KEY,
                from_id       TEXT NOT NULL REFERENCES sharers(id),
                to_id         TEXT NOT NULL REFERENCES sharers(id),
                sharezone_id  TEXT NOT NULL REFERENCES sharezones(id),
                body          TEXT NOT NULL CHECK (length(body) BETWEEN 1 AND 1000),
                read          INTEGER NOT NULL DEFAULT 0,
                created_at    INTEGER NOT NULL,
                CHECK (from_id <> to_id)
            );

            CREATE INDEX idx_messages_inbox
                ON messages(to_id, read);

            CREATE INDEX idx_messages_history
                ON messages(sharezone_id, from_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
