pub mod functions;

use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;

use crate::error::{Error, Result};

/// Where connections come from.
#[derive(Clone)]
enum Source {
    /// A database file, opened read-only once per query.
    File(PathBuf),
    /// A shared in-memory connection. In-memory databases exist per
    /// connection, so this handle is reused rather than reopened.
    Memory(tokio_rusqlite::Connection),
}

/// Handle to the order/user database.
///
/// The handle is constructed explicitly and passed by reference to every
/// report. It holds no open connection for file databases: each call to
/// [`Database::connect`] opens a fresh read-only connection that is closed
/// as soon as the returned value is dropped, on success and failure alike.
#[derive(Clone)]
pub struct Database {
    source: Source,
}

impl Database {
    /// Open the database at the default path (`~/.salesdash/salesdash.db`).
    pub async fn open() -> Result<Self> {
        Self::open_at(default_path()?).await
    }

    /// Open the database at the given path. The file must already exist; a
    /// test connection is made so that configuration problems surface here
    /// rather than on the first report.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self {
            source: Source::File(path.as_ref().to_path_buf()),
        };
        let conn = db.connect().await?;
        conn.call(|c| c.execute_batch("SELECT 1"))
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for testing). Unlike file databases it is
    /// writable, so fixtures can be loaded through [`Database::connect`].
    pub async fn open_memory() -> Result<Self> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self {
            source: Source::Memory(conn),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(p) => Some(p),
            Source::Memory(_) => None,
        }
    }

    /// Acquire a connection scope with `MONTH`/`YEAR` registered.
    pub async fn connect(&self) -> Result<tokio_rusqlite::Connection> {
        let conn = match &self.source {
            Source::File(path) => {
                log::debug!("Opening {}", path.display());
                tokio_rusqlite::Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .await
                .map_err(|e| {
                    Error::Connection(format!("cannot open {}: {e}", path.display()))
                })?
            }
            Source::Memory(conn) => conn.clone(),
        };
        conn.call(|conn| {
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            functions::register(conn)
        })
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(conn)
    }
}

fn default_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot determine home directory".into()))?
        .join(".salesdash")
        .join("salesdash.db"))
}

/// Fixture schema and data shared by the crate's tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::Database;

    pub const SCHEMA: &str = "
        CREATE TABLE UserLevelData (
            Userid   TEXT PRIMARY KEY,
            Industry TEXT NOT NULL
        );
        CREATE TABLE OrderData (
            OrderId      INTEGER PRIMARY KEY,
            Userid       TEXT NOT NULL,
            PurchaseDate TEXT NOT NULL,
            Invoice      REAL NOT NULL
        );";

    /// In-memory database with the schema and the given insert statements.
    pub async fn seeded(inserts: &'static str) -> Database {
        let db = Database::open_memory().await.unwrap();
        db.connect()
            .await
            .unwrap()
            .call(move |conn| {
                conn.execute_batch(SCHEMA)?;
                conn.execute_batch(inserts)
            })
            .await
            .unwrap();
        db
    }
}
