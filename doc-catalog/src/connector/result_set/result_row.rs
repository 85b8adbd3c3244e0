use crate::{
    ast::Value,
    error::{Error, ErrorKind},
};
use std::sync::Arc;

/// An owned version of a `Row` in a `ResultSet`. See
/// [ResultRowRef](struct.ResultRowRef.html) for documentation on data access.
#[derive(Debug, PartialEq)]
pub struct ResultRow {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) values: Vec<Value<'static>>,
}

impl IntoIterator for ResultRow {
    type Item = Value<'static>;
    type IntoIter = std::vec::IntoIter<Value<'static>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// A reference to a `Row` in a `ResultSet`. The columns can be accessed either
/// through their position or using the column name.
///
/// ```
/// # use doc_catalog::connector::*;
/// let names = vec!["name".to_string(), "identifier".to_string()];
/// let rows = vec![vec!["d1".into(), "db1".into()]];
///
/// let result_set = ResultSet::new(names, rows);
/// let row = result_set.first().unwrap();
///
/// assert_eq!(row.at(1), row.get("identifier"));
/// ```
#[derive(Debug, PartialEq)]
pub struct ResultRowRef<'a> {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) values: &'a Vec<Value<'static>>,
}

impl ResultRow {
    /// Take a value from a certain position in the row, if having a value in
    /// that position.
    pub fn at(&self, i: usize) -> Option<&Value<'static>> {
        self.values.get(i)
    }

    /// Take a value with the given column name from the row.
    pub fn get(&self, name: &str) -> Option<&Value<'static>> {
        self.columns.iter().position(|c| c == name).map(|idx| &self.values[idx])
    }

    /// Like `get`, but a missing column is an error.
    pub fn try_get(&self, name: &str) -> crate::Result<&Value<'static>> {
        self.get(name).ok_or_else(|| column_not_found(name))
    }

    /// Make a referring [ResultRowRef](struct.ResultRowRef.html).
    pub fn as_ref(&self) -> ResultRowRef<'_> {
        ResultRowRef {
            columns: Arc::clone(&self.columns),
            values: &self.values,
        }
    }

    pub fn into_single(self) -> crate::Result<Value<'static>> {
        match self.into_iter().next() {
            Some(val) => Ok(val),
            None => Err(Error::builder(ErrorKind::NotFound).build()),
        }
    }
}

impl<'a> ResultRowRef<'a> {
    /// Take a value from a certain position in the row, if having a value in
    /// that position.
    pub fn at(&self, i: usize) -> Option<&'a Value<'static>> {
        self.values.get(i)
    }

    /// Take a value with the given column name from the row.
    pub fn get(&self, name: &str) -> Option<&'a Value<'static>> {
        self.columns.iter().position(|c| c == name).map(|idx| &self.values[idx])
    }

    /// Like `get`, but a missing column is an error.
    pub fn try_get(&self, name: &str) -> crate::Result<&'a Value<'static>> {
        self.get(name).ok_or_else(|| column_not_found(name))
    }
}

fn column_not_found(name: &str) -> Error {
    Error::builder(ErrorKind::ColumnNotFound {
        column: name.to_owned(),
    })
    .build()
}
