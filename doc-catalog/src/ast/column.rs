use super::Table;
use std::borrow::Cow;

/// A column reference, optionally bound to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub name: Cow<'a, str>,
    pub table: Option<Table<'a>>,
}

impl<'a> Column<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Column {
            name: name.into(),
            table: None,
        }
    }

    /// Include the table name in the column expression.
    pub fn table(mut self, table: impl Into<Table<'a>>) -> Self {
        self.table = Some(table.into());
        self
    }
}

impl<'a> From<&'a str> for Column<'a> {
    fn from(name: &'a str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column<'_> {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}
