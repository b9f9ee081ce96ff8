pub mod db_pool;
pub mod db_utils;

use crate::config::DatabaseConfig;
use db_pool::DuckDBConnectionManager;
use r2d2::Pool;
use std::error::Error;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbError {
    Pool(String),
    Query(duckdb::Error),
    Io(std::io::Error),
    Task(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Pool(msg) => write!(f, "Connection pool error: {}", msg),
            DbError::Query(err) => write!(f, "SQL error: {}", err),
            DbError::Io(err) => write!(f, "IO error: {}", err),
            DbError::Task(msg) => write!(f, "Database task failed: {}", msg),
        }
    }
}

impl Error for DbError {}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::Query(err)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(err: r2d2::Error) -> Self {
        DbError::Pool(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Io(err)
    }
}

impl From<tokio::task::JoinError> for DbError {
    fn from(err: tokio::task::JoinError) -> Self {
        DbError::Task(err.to_string())
    }
}

/// The database the generated queries run against.
#[derive(Clone)]
pub struct SqlDatabase {
    pool: Pool<DuckDBConnectionManager>,
}

impl SqlDatabase {
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        info!("Opening DuckDB database: {}", config.connection_string);
        let manager = DuckDBConnectionManager::new(&config.connection_string)?;
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1) as u32)
            .build(manager)?;

        let db = Self { pool };

        if let Some(script) = &config.init_script {
            info!("Running init script: {}", script);
            let sql = std::fs::read_to_string(script)?;
            db.execute_batch(&sql)?;
        }

        Ok(db)
    }

    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        let conn = self.pool.get()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Runs one statement and renders the rows as a list of tuples, e.g.
    /// `[('Andy Fixter',), ('Peter Marsh',)]`. No rows yields an empty string.
    pub async fn run(&self, sql: &str) -> Result<String, DbError> {
        let pool = self.pool.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || -> Result<String, DbError> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let column_count = rows.as_ref().map(|s| s.column_count()).unwrap_or(0);

            let mut tuples = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    let value = row.get::<_, duckdb::types::Value>(i)?;
                    values.push(db_utils::literal_value(&value));
                }
                tuples.push(db_utils::tuple(&values));
            }

            debug!("Query returned {} rows", tuples.len());

            if tuples.is_empty() {
                Ok(String::new())
            } else {
                Ok(format!("[{}]", tuples.join(", ")))
            }
        })
        .await?
    }

    /// CREATE TABLE statements plus a few sample rows for every table in the
    /// main schema, ordered by table name.
    pub async fn table_info(&self, sample_rows: usize) -> Result<String, DbError> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> Result<String, DbError> {
            let conn = pool.get()?;

            let mut tables_stmt = conn.prepare(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'main' ORDER BY table_name",
            )?;
            let tables: Vec<String> = tables_stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<_, _>>()?;

            let mut sections = Vec::with_capacity(tables.len());

            for table_name in &tables {
                let mut columns_stmt = conn.prepare(
                    "SELECT column_name, data_type, is_nullable \
                     FROM information_schema.columns \
                     WHERE table_schema = 'main' AND table_name = ? \
                     ORDER BY ordinal_position",
                )?;
                let columns: Vec<(String, String, bool)> = columns_stmt
                    .query_map([table_name], |row| {
                        Ok((
                            row.get::<_, String>(0)?,        // column_name
                            row.get::<_, String>(1)?,        // data_type
                            row.get::<_, String>(2)? == "YES", // is_nullable
                        ))
                    })?
                    .collect::<Result<_, _>>()?;

                let mut section = db_utils::create_table_ddl(table_name, &columns);

                if sample_rows > 0 && !columns.is_empty() {
                    let sample_sql = format!(
                        "SELECT * FROM \"{}\" LIMIT {}",
                        table_name, sample_rows
                    );
                    let mut sample_stmt = conn.prepare(&sample_sql)?;
                    let mut rows = sample_stmt.query([])?;

                    let mut lines = vec![columns
                        .iter()
                        .map(|(name, _, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join("\t")];

                    while let Some(row) = rows.next()? {
                        let mut values = Vec::with_capacity(columns.len());
                        for i in 0..columns.len() {
                            let value = row.get::<_, duckdb::types::Value>(i)?;
                            values.push(db_utils::display_value(&value));
                        }
                        lines.push(values.join("\t"));
                    }

                    section.push_str(&format!(
                        "\n\n/*\n{} rows from {} table:\n{}\n*/",
                        sample_rows,
                        table_name,
                        lines.join("\n")
                    ));
                }

                sections.push(section);
            }

            Ok(sections.join("\n\n"))
        })
        .await?
    }
}
