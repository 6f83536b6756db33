use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;
use tracing::info;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookstore-inventory";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "ebookstore.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "inventory.log";

/// The single table. `STRICT` makes SQLite refuse text in the integer
/// columns instead of silently storing it.
const BOOKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY CHECK (id BETWEEN 1000 AND 9999),
    title TEXT NOT NULL UNIQUE,
    author TEXT NOT NULL,
    qty INTEGER NOT NULL DEFAULT 0 CHECK (qty >= 0),
    UNIQUE (id, title)
) STRICT";

/// Open the store at its fixed location in the user's home, creating the
/// file and table on first run.
pub fn ensure_schema() -> Result<Connection> {
    ensure_schema_at(&db_path()?)
}

/// Same as [`ensure_schema`] for an explicit database file.
pub fn ensure_schema_at(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    init_schema(&conn)?;
    info!(path = %db_path.display(), "opened inventory");
    Ok(conn)
}

/// Create the `books` table on an already open connection if it is missing.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(BOOKS_TABLE, [])
        .context("failed to create books table")?;
    Ok(())
}

/// Close the store explicitly so a failed final flush is reported instead of
/// being swallowed by `Drop`.
pub fn close_store(conn: Connection) -> Result<()> {
    conn.close()
        .map_err(|(_, err)| err)
        .context("failed to close SQLite database")?;
    info!("closed inventory");
    Ok(())
}

/// Directory holding the database and the log file.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}
