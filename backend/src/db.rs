use crate::config::Config;
use rusqlite::Connection;

/// Open a connection to the portal database.
pub fn open(cfg: &Config) -> Result<Connection, String> {
    Connection::open(&cfg.db_path).map_err(|e| e.to_string())
}

/// Create the schema if it does not exist yet. Called once at startup.
pub fn init(cfg: &Config) -> Result<(), String> {
    let conn = open(cfg)?;
    init_schema(&conn)
}

/// Roster rows plus the single-row layout settings record.
///
/// `layout_settings` is a key-value table with exactly one well-known key:
/// the `CHECK (id = 1)` constraint enforces the singleton, and writes go
/// through `INSERT OR REPLACE` so the record is created on first save and
/// overwritten in place ever after.
pub fn init_schema(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS recipients (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            event         TEXT NOT NULL DEFAULT '',
            artifact_path TEXT,
            status        TEXT NOT NULL DEFAULT 'pending'
        );
        CREATE TABLE IF NOT EXISTS layout_settings (
            id   INTEGER PRIMARY KEY CHECK (id = 1),
            data TEXT NOT NULL
        );",
    )
    .map_err(|e| e.to_string())
}
