use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    File(PathBuf),
    /// Private database that disappears with its connection.
    Memory,
}

impl Display for StorageTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(_) => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl StorageTarget {
    /// Connects, configures the connection and brings the schema up to date.
    ///
    /// File targets are created when missing and switched to WAL journaling.
    pub fn open(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let result = self.connect_and_prepare();
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => info!(
                "event=db_open module=db status=ok target={self} duration_ms={duration_ms}"
            ),
            Err(err) => error!(
                "event=db_open module=db status=error target={self} duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }

    fn connect_and_prepare(&self) -> DbResult<Connection> {
        let mut conn = match self {
            Self::File(path) => {
                let conn = Connection::open(path)?;
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
                conn
            }
            Self::Memory => Connection::open_in_memory()?,
        };

        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    }
}

/// Opens (creating if needed) the database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    StorageTarget::File(path.as_ref().to_path_buf()).open()
}

pub fn open_db_in_memory() -> DbResult<Connection> {
    StorageTarget::Memory.open()
}
