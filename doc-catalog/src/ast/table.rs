use std::borrow::Cow;

/// A table definition, optionally qualified with the schema it lives in.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<'a> {
    pub name: Cow<'a, str>,
    pub database: Option<Cow<'a, str>>,
}

impl<'a> Table<'a> {
    /// Define in which schema the table is located.
    pub fn database(mut self, database: impl Into<Cow<'a, str>>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl<'a> From<&'a str> for Table<'a> {
    fn from(s: &'a str) -> Table<'a> {
        Table {
            name: Cow::Borrowed(s),
            database: None,
        }
    }
}

impl<'a> From<(&'a str, &'a str)> for Table<'a> {
    fn from((database, name): (&'a str, &'a str)) -> Table<'a> {
        Table::from(name).database(database)
    }
}

impl From<String> for Table<'_> {
    fn from(s: String) -> Self {
        Table {
            name: Cow::Owned(s),
            database: None,
        }
    }
}

impl From<(String, String)> for Table<'_> {
    fn from((database, name): (String, String)) -> Self {
        Table::from(name).database(database)
    }
}
