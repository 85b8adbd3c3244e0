mod conversion;
mod error;

use crate::{
    ast::Value,
    connector::{Queryable, ResultSet},
    error::{Error, ErrorKind},
};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::Mutex;

/// A connector interface for the SQLite database.
///
/// Every connection runs with foreign key enforcement turned on, so the
/// catalog's parent links hold on SQLite too.
pub struct Sqlite {
    pub(crate) client: Mutex<rusqlite::Connection>,
}

impl Sqlite {
    /// Open a database file, creating it if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Sqlite> {
        let path = path.as_ref();

        if path.is_dir() {
            let kind = ErrorKind::DatabaseUrlIsInvalid(format!("{} is a directory", path.display()));
            return Err(Error::builder(kind).build());
        }

        let conn = rusqlite::Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a new in-memory database.
    pub fn new_in_memory() -> crate::Result<Sqlite> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: rusqlite::Connection) -> crate::Result<Sqlite> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        tracing::debug!(target: "doc_catalog::connector", "opened sqlite connection");

        Ok(Sqlite {
            client: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Queryable for Sqlite {
    async fn query_raw(&self, sql: &str, params: &[Value<'_>]) -> crate::Result<ResultSet> {
        let client = self.client.lock().await;

        let mut stmt = client.prepare_cached(sql)?;
        let columns = conversion::columns_of(&stmt);
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;

        let mut result = ResultSet::new(columns.names, Vec::new());

        while let Some(row) = rows.next()? {
            result.rows.push(conversion::to_result_row(row, &columns.decl_types)?);
        }

        Ok(result)
    }

    async fn execute_raw(&self, sql: &str, params: &[Value<'_>]) -> crate::Result<u64> {
        let client = self.client.lock().await;

        let mut stmt = client.prepare_cached(sql)?;
        let changes = stmt.execute(rusqlite::params_from_iter(params.iter()))?;

        Ok(u64::try_from(changes)?)
    }

    async fn raw_cmd(&self, cmd: &str) -> crate::Result<()> {
        let client = self.client.lock().await;
        client.execute_batch(cmd)?;

        Ok(())
    }
}
