//! The only place that hands statements to a live connection.

use crate::{
    ast::Query,
    connector::{Queryable, ResultSet},
    dialect::Dialect,
};
use std::{fmt, sync::Arc};

/// Why a statement is being executed. Attached to every execution error so
/// callers can tell an expected failure (a duplicate insert while replaying)
/// from unexpected corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    CreateTable,
    MetaInsert,
    MetaDelete,
    /// Advancing a RID counter.
    MetaUpdate,
    MetaRead,
    CreateSchema,
    DropSchema,
    AddColumn,
    CreateIndex,
    DropIndex,
}

impl ExecutionContext {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionContext::CreateTable => "CREATE_TABLE",
            ExecutionContext::MetaInsert => "META_INSERT",
            ExecutionContext::MetaDelete => "META_DELETE",
            ExecutionContext::MetaUpdate => "META_UPDATE",
            ExecutionContext::MetaRead => "META_READ",
            ExecutionContext::CreateSchema => "CREATE_SCHEMA",
            ExecutionContext::DropSchema => "DROP_SCHEMA",
            ExecutionContext::AddColumn => "ADD_COLUMN",
            ExecutionContext::CreateIndex => "CREATE_INDEX",
            ExecutionContext::DropIndex => "DROP_INDEX",
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders statements with the configured dialect and runs them. Failures
/// come back tagged with the context they ran under; nothing is retried.
#[derive(Debug, Clone)]
pub struct SqlHelper {
    dialect: Arc<dyn Dialect>,
}

impl SqlHelper {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        SqlHelper { dialect }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Run a statement that produces no rows, typically DDL.
    pub async fn execute_statement(
        &self,
        conn: &dyn Queryable,
        statement: &str,
        context: ExecutionContext,
    ) -> crate::Result<()> {
        tracing::debug!(target: "doc_catalog::sql", %context, sql = statement, "executing statement");

        conn.raw_cmd(statement)
            .await
            .map_err(|err| Self::execution_error(err, context, statement))
    }

    /// Run a row mutating statement, returning the number of affected rows.
    pub async fn execute_update(
        &self,
        conn: &dyn Queryable,
        query: Query<'_>,
        context: ExecutionContext,
    ) -> crate::Result<u64> {
        let (sql, params) = self.dialect.build(query)?;

        tracing::debug!(target: "doc_catalog::sql", %context, sql = sql.as_str(), params = params.len(), "executing update");

        let affected = conn
            .execute_raw(&sql, &params)
            .await
            .map_err(|err| Self::execution_error(err, context, &sql))?;

        tracing::trace!(target: "doc_catalog::sql", %context, affected, "update done");

        Ok(affected)
    }

    /// Run a statement that returns rows, including `UPDATE ... RETURNING`.
    pub async fn query(
        &self,
        conn: &dyn Queryable,
        query: Query<'_>,
        context: ExecutionContext,
    ) -> crate::Result<ResultSet> {
        let (sql, params) = self.dialect.build(query)?;

        tracing::debug!(target: "doc_catalog::sql", %context, sql = sql.as_str(), params = params.len(), "executing query");

        conn.query_raw(&sql, &params)
            .await
            .map_err(|err| Self::execution_error(err, context, &sql))
    }

    fn execution_error(err: crate::Error, context: ExecutionContext, sql: &str) -> crate::Error {
        tracing::warn!(target: "doc_catalog::sql", %context, sql, error = %err, "statement failed");

        err.with_context(context)
    }
}
