use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS upload (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id    TEXT NOT NULL,
            source_path TEXT NOT NULL,
            token       TEXT NOT NULL,
            row_count   INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            upload_id   INTEGER,
            owner_id    TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            FOREIGN KEY (upload_id) REFERENCES upload(id)
        );

        CREATE TABLE IF NOT EXISTS record_field (
            record_id   INTEGER NOT NULL,
            field       TEXT NOT NULL,
            kind        TEXT NOT NULL,
            value       TEXT NOT NULL,
            PRIMARY KEY (record_id, field),
            FOREIGN KEY (record_id) REFERENCES record(id)
        );

        CREATE INDEX IF NOT EXISTS idx_record_owner
            ON record(owner_id, id);

        CREATE INDEX IF NOT EXISTS idx_upload_token
            ON upload(token);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
