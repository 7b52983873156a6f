//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    migrate_log_kind_index(conn)?;
    Ok(())
}

/// Databases created before the kind index existed scan the whole log on
/// every history lookup.
fn migrate_log_kind_index(conn: &Connection) -> Result<(), DbError> {
    if index_exists(conn, "idx_image_log_kind")? {
        return Ok(());
    }
    tracing::info!("Adding log kind index to image_log");
    conn.execute_batch("CREATE INDEX idx_image_log_kind ON image_log (log_kind, id);")?;
    Ok(())
}

fn index_exists(conn: &Connection, name: &str) -> Result<bool, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS image_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    log_kind TEXT NOT NULL,
    image_path TEXT NOT NULL,
    prompt TEXT NOT NULL DEFAULT '',
    logged_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;
