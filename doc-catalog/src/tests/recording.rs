use crate::{
    ast::Value,
    connector::{Queryable, ResultSet},
    error::{Error, ErrorKind},
};
use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex};

/// A connection that records every statement it receives. Queries answer
/// with the queued result sets, updates with the queued affected counts,
/// both falling back to empty answers.
#[derive(Default)]
pub(crate) struct RecordingQueryable {
    statements: Mutex<Vec<String>>,
    results: Mutex<VecDeque<ResultSet>>,
    affected: Mutex<VecDeque<u64>>,
    fail_at: Option<usize>,
}

impl RecordingQueryable {
    /// Fails the statement with the given zero based position.
    pub(crate) fn failing_at(position: usize) -> Self {
        RecordingQueryable {
            fail_at: Some(position),
            ..Default::default()
        }
    }

    pub(crate) fn with_result(self, result: ResultSet) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn with_affected(self, affected: u64) -> Self {
        self.affected.lock().unwrap().push_back(affected);
        self
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) -> crate::Result<()> {
        let mut statements = self.statements.lock().unwrap();
        let position = statements.len();
        statements.push(sql.to_owned());

        if self.fail_at == Some(position) {
            let kind = ErrorKind::QueryError(format!("statement {position} failed").into());
            return Err(Error::builder(kind).build());
        }

        Ok(())
    }
}

#[async_trait]
impl Queryable for RecordingQueryable {
    async fn query_raw(&self, sql: &str, _: &[Value<'_>]) -> crate::Result<ResultSet> {
        self.record(sql)?;
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute_raw(&self, sql: &str, _: &[Value<'_>]) -> crate::Result<u64> {
        self.record(sql)?;
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(1))
    }

    async fn raw_cmd(&self, cmd: &str) -> crate::Result<()> {
        self.record(cmd)
    }
}

/// A single `last_rid` row, as the locking read returns it.
pub(crate) fn last_rid_row(last_rid: i32) -> ResultSet {
    ResultSet::new(vec!["last_rid".to_owned()], vec![vec![Value::Int32(last_rid)]])
}
