use crate::ast::*;

/// A builder for an `UPDATE` statement.
#[derive(Debug, PartialEq, Clone)]
pub struct Update<'a> {
    pub(crate) table: Table<'a>,
    pub(crate) columns: Vec<Column<'a>>,
    pub(crate) values: Vec<Expression<'a>>,
    pub(crate) conditions: Option<ConditionTree<'a>>,
    pub(crate) returning: Vec<Column<'a>>,
}

impl<'a> From<Update<'a>> for Query<'a> {
    fn from(update: Update<'a>) -> Self {
        Query::Update(Box::new(update))
    }
}

impl<'a> Update<'a> {
    /// Creates the basis for an `UPDATE` statement to the given table.
    pub fn table<T>(table: T) -> Self
    where
        T: Into<Table<'a>>,
    {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
            conditions: None,
            returning: Vec::new(),
        }
    }

    /// Add another column value assignment to the query.
    ///
    /// ```rust
    /// # use doc_catalog::{ast::*, visitor::{Visitor, Sqlite}};
    /// let query = Update::table("doc_part")
    ///     .set("last_rid", SqlOp::add(Column::from("last_rid"), 3))
    ///     .so_that(Column::from("identifier").equals("t00"));
    /// let (sql, params) = Sqlite::build(query).unwrap();
    ///
    /// assert_eq!("UPDATE `doc_part` SET `last_rid` = (`last_rid` + ?) WHERE `identifier` = ?", sql);
    /// assert_eq!(vec![Value::Int32(3), Value::from("t00")], params);
    /// ```
    pub fn set<K, V>(mut self, column: K, value: V) -> Self
    where
        K: Into<Column<'a>>,
        V: Into<Expression<'a>>,
    {
        self.columns.push(column.into());
        self.values.push(value.into());

        self
    }

    /// Adds `WHERE` conditions to the query.
    pub fn so_that<T>(mut self, conditions: T) -> Self
    where
        T: Into<ConditionTree<'a>>,
    {
        self.conditions = Some(conditions.into());
        self
    }

    /// Sets the columns to be returned from the updated rows. Only rendered
    /// by backends supporting `RETURNING`.
    pub fn returning<K, I>(mut self, columns: I) -> Self
    where
        K: Into<Column<'a>>,
        I: IntoIterator<Item = K>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }
}
