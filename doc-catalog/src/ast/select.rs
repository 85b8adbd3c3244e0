use crate::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A builder for a `SELECT` statement.
#[derive(Debug, PartialEq, Clone)]
pub struct Select<'a> {
    pub(crate) table: Table<'a>,
    pub(crate) columns: Vec<Column<'a>>,
    pub(crate) conditions: Option<ConditionTree<'a>>,
    pub(crate) ordering: Vec<(Column<'a>, Order)>,
    pub(crate) for_update: bool,
}

impl<'a> From<Select<'a>> for Query<'a> {
    fn from(sel: Select<'a>) -> Query<'a> {
        Query::Select(Box::new(sel))
    }
}

impl<'a> Select<'a> {
    /// Creates a new `SELECT` statement for the given table.
    ///
    /// ```rust
    /// # use doc_catalog::{ast::*, visitor::{Visitor, Sqlite}};
    /// let query = Select::from_table("database").column("name").order_by("name");
    /// let (sql, _) = Sqlite::build(query).unwrap();
    ///
    /// assert_eq!("SELECT `name` FROM `database` ORDER BY `name` ASC", sql);
    /// ```
    pub fn from_table<T>(table: T) -> Self
    where
        T: Into<Table<'a>>,
    {
        Select {
            table: table.into(),
            columns: Vec::new(),
            conditions: None,
            ordering: Vec::new(),
            for_update: false,
        }
    }

    /// Selects a column. Without any, every column is returned.
    pub fn column<T>(mut self, column: T) -> Self
    where
        T: Into<Column<'a>>,
    {
        self.columns.push(column.into());
        self
    }

    pub fn columns<T, I>(mut self, columns: I) -> Self
    where
        T: Into<Column<'a>>,
        I: IntoIterator<Item = T>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
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

    pub fn order_by<T>(mut self, column: T) -> Self
    where
        T: Into<Column<'a>>,
    {
        self.ordering.push((column.into(), Order::Asc));
        self
    }

    pub fn order_by_desc<T>(mut self, column: T) -> Self
    where
        T: Into<Column<'a>>,
    {
        self.ordering.push((column.into(), Order::Desc));
        self
    }

    /// Locks the selected rows until the end of the transaction, on
    /// backends that support row locks.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }
}
