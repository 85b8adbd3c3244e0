use super::ResultSet;
use crate::ast::Value;
use async_trait::async_trait;

/// Represents a connection or a transaction that can be queried.
///
/// Statements arrive fully rendered. The parameters are bound in the order
/// the placeholders appear in the SQL text.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Execute a query given as SQL, interpolating the given parameters.
    async fn query_raw(&self, sql: &str, params: &[Value<'_>]) -> crate::Result<ResultSet>;

    /// Execute a query given as SQL, interpolating the given parameters and
    /// returning the number of affected rows.
    async fn execute_raw(&self, sql: &str, params: &[Value<'_>]) -> crate::Result<u64>;

    /// Run a command in the database, for queries that can't be run using
    /// prepared statements.
    async fn raw_cmd(&self, cmd: &str) -> crate::Result<()>;
}
