use duckdb::Connection;
use r2d2::ManageConnection;
use std::sync::Mutex;

/// Hands out clones of a single root connection so every pooled handle sees
/// the same database instance, in-memory ones included.
pub struct DuckDBConnectionManager {
    root: Mutex<Connection>,
}

impl DuckDBConnectionManager {
    pub fn new(connection_string: &str) -> Result<Self, duckdb::Error> {
        let root = if connection_string == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(connection_string)?
        };

        Ok(Self {
            root: Mutex::new(root),
        })
    }
}

impl ManageConnection for DuckDBConnectionManager {
    type Connection = Connection;
    type Error = duckdb::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let root = self.root.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        root.try_clone()
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.execute("SELECT 1", [])?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
