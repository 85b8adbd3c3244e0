use crate::ast::*;

/// A builder for a `DELETE` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Delete<'a> {
    pub(crate) table: Table<'a>,
    pub(crate) conditions: Option<ConditionTree<'a>>,
}

impl<'a> From<Delete<'a>> for Query<'a> {
    fn from(delete: Delete<'a>) -> Self {
        Query::Delete(Box::new(delete))
    }
}

impl<'a> Delete<'a> {
    /// Creates a new `DELETE` statement for the given table.
    pub fn from_table<T>(table: T) -> Self
    where
        T: Into<Table<'a>>,
    {
        Self {
            table: table.into(),
            conditions: None,
        }
    }

    /// Adds `WHERE` conditions to the query.
    ///
    /// ```rust
    /// # use doc_catalog::{ast::*, visitor::{Visitor, Sqlite}};
    /// let conditions = Column::from("database").equals("d1").and(Column::from("name").equals("c1"));
    /// let query = Delete::from_table(("doc_catalog", "collection")).so_that(conditions);
    /// let (sql, _) = Sqlite::build(query).unwrap();
    ///
    /// assert_eq!(
    ///     "DELETE FROM `doc_catalog`.`collection` WHERE (`database` = ? AND `name` = ?)",
    ///     sql,
    /// );
    /// ```
    pub fn so_that<T>(mut self, conditions: T) -> Self
    where
        T: Into<ConditionTree<'a>>,
    {
        self.conditions = Some(conditions.into());
        self
    }
}
