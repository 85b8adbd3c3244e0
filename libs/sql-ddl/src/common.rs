use std::{
    borrow::Cow,
    fmt::{Display, Write as _},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl AsRef<str> for SortOrder {
    fn as_ref(&self) -> &str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Default)]
pub struct IndexColumn<'a> {
    pub name: Cow<'a, str>,
    pub sort_order: Option<SortOrder>,
}

impl<'a> IndexColumn<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        IndexColumn {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A column definition inside `CREATE TABLE` or `ALTER TABLE ... ADD COLUMN`.
#[derive(Debug, Default)]
pub struct Column<'a> {
    pub name: Cow<'a, str>,
    pub r#type: Cow<'a, str>,
    pub not_null: bool,
    pub default: Option<Cow<'a, str>>,
}

impl<'a> Column<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, r#type: impl Into<Cow<'a, str>>) -> Self {
        Column {
            name: name.into(),
            r#type: r#type.into(),
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<Cow<'a, str>>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Display for Column<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&Ident(&self.name), f)?;
        f.write_str(" ")?;
        f.write_str(self.r#type.as_ref())?;

        if self.not_null {
            f.write_str(" NOT NULL")?;
        }

        if let Some(default) = &self.default {
            f.write_str(" DEFAULT ")?;
            f.write_str(default)?;
        }

        Ok(())
    }
}

/// A `FOREIGN KEY` table constraint. The referenced table is rendered as
/// given, so callers decide whether it carries a schema.
pub struct ForeignKey<'a> {
    pub constrained_columns: Vec<Cow<'a, str>>,
    pub referenced_table: &'a dyn Display,
    pub referenced_columns: Vec<Cow<'a, str>>,
}

impl Display for ForeignKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FOREIGN KEY (")?;
        self.constrained_columns.iter().map(|s| Ident(s)).join(", ", f)?;
        write!(f, ") REFERENCES {}(", self.referenced_table)?;
        self.referenced_columns.iter().map(|s| Ident(s)).join(", ", f)?;
        f.write_str(")")
    }
}

/// `CREATE TABLE`, shared by every dialect since the catalog only uses the
/// portable subset of the syntax.
pub struct CreateTable<'a> {
    pub table_name: &'a dyn Display,
    pub columns: Vec<Column<'a>>,
    pub primary_key: Vec<Cow<'a, str>>,
    pub unique: Vec<Vec<Cow<'a, str>>>,
    pub foreign_keys: Vec<ForeignKey<'a>>,
}

impl Display for CreateTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CREATE TABLE {} (\n", self.table_name)?;

        let mut lines: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();

        if !self.primary_key.is_empty() {
            let mut line = String::from("PRIMARY KEY (");
            self.primary_key.iter().map(|s| Ident(s)).join(", ", &mut line)?;
            line.push(')');
            lines.push(line);
        }

        for columns in &self.unique {
            let mut line = String::from("UNIQUE (");
            columns.iter().map(|s| Ident(s)).join(", ", &mut line)?;
            line.push(')');
            lines.push(line);
        }

        lines.extend(self.foreign_keys.iter().map(|fk| fk.to_string()));

        lines.iter().map(|l| Indented(l)).join(",\n", f)?;

        f.write_str("\n)")
    }
}

struct Indented<'a>(&'a str);

impl Display for Indented<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "    {}", self.0)
    }
}

/// A double-quoted identifier. Embedded quotes are doubled.
pub(crate) struct Ident<'a>(pub(crate) &'a str);

impl Display for Ident<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('"')?;

        for c in self.0.chars() {
            if c == '"' {
                f.write_str("\"\"")?;
            } else {
                f.write_char(c)?;
            }
        }

        f.write_char('"')
    }
}

/// A single-quoted string literal. Embedded quotes are doubled.
pub(crate) struct StrLit<'a>(pub(crate) &'a str);

impl Display for StrLit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.0.replace('\'', "''"))
    }
}

pub(crate) trait IteratorJoin {
    fn join<W: std::fmt::Write>(self, sep: &str, f: &mut W) -> std::fmt::Result;
}

impl<T, I> IteratorJoin for T
where
    T: Iterator<Item = I>,
    I: Display,
{
    fn join<W: std::fmt::Write>(mut self, sep: &str, f: &mut W) -> std::fmt::Result {
        if let Some(first) = self.next() {
            write!(f, "{first}")?;

            for item in self {
                f.write_str(sep)?;
                write!(f, "{item}")?;
            }
        }

        Ok(())
    }
}

pub(crate) fn render_index_columns<W: std::fmt::Write>(columns: &[IndexColumn<'_>], f: &mut W) -> std::fmt::Result {
    columns
        .iter()
        .map(|c| {
            let mut rendered = Ident(&c.name).to_string();

            if let Some(sort_order) = c.sort_order {
                rendered.push(' ');
                rendered.push_str(sort_order.as_ref());
            }

            rendered
        })
        .join(", ", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn identifiers_escape_quotes() {
        assert_eq!(r#""a""b""#, Ident("a\"b").to_string());
        assert_eq!("'it''s'", StrLit("it's").to_string());
    }

    #[test]
    fn create_table_with_constraints() {
        let create_table = CreateTable {
            table_name: &Ident("field"),
            columns: vec![
                Column::new("database", "varchar").not_null(),
                Column::new("name", "varchar").not_null(),
                Column::new("last_rid", "integer").not_null().default_value("0"),
            ],
            primary_key: vec!["database".into(), "name".into()],
            unique: vec![vec!["last_rid".into()]],
            foreign_keys: vec![ForeignKey {
                constrained_columns: vec!["database".into()],
                referenced_table: &Ident("database"),
                referenced_columns: vec!["name".into()],
            }],
        };

        let expected = indoc!(
            r#"
            CREATE TABLE "field" (
                "database" varchar NOT NULL,
                "name" varchar NOT NULL,
                "last_rid" integer NOT NULL DEFAULT 0,
                PRIMARY KEY ("database", "name"),
                UNIQUE ("last_rid"),
                FOREIGN KEY ("database") REFERENCES "database"("name")
            )"#
        );

        assert_eq!(expected, create_table.to_string());
    }
}
