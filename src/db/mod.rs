//! SQLite persistence behind [`crate::repository::SqliteRepository`].
//!
//! One file holds every user's partition; rows are keyed by `user_id`.
//! rusqlite connections are blocking and not `Sync`, so the repository checks a
//! connection out of an r2d2 pool for each blocking task it runs.
//!
//! - `schema`: tables and the schema version marker
//! - `records`: journal record rows, kept in insertion order
//! - `goals`: the current goal row, goal history and the completion counter
//!
//! ```no_run
//! use sentio::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/sentio.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod goals;
pub mod records;
pub mod schema;

use crate::errors::{AppResult, DatabaseError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Upper bound on connections checked out by concurrent blocking tasks.
const POOL_SIZE: u32 = 5;

/// Wait on a write lock held by another connection before failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens `db_path`, creating the file if needed, and checks that a pooled
    /// connection can run a query.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(SqliteConnectionManager::file(db_path))
            .map_err(DatabaseError::Pool)?;

        pool.get()
            .map_err(DatabaseError::Pool)?
            .query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(DatabaseError::Sqlite)?;

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool.get().map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Creates missing tables. Safe to repeat on every start.
    pub fn initialize_schema(&self) -> AppResult<()> {
        schema::create_tables(&*self.get_conn()?)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Per-connection settings applied when the pool hands a connection out.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    }
}
