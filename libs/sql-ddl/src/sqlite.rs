//! SQLite has no schemas. A schema is an attached database file, and
//! objects inside it are qualified with the attachment name.

use crate::common::{render_index_columns, Column, Ident, IndexColumn, StrLit};
use std::{borrow::Cow, fmt::Display};

/// Render an `ATTACH DATABASE` statement.
///
/// ```
/// # use sql_ddl::sqlite::AttachDatabase;
///
/// let attach = AttachDatabase { file_path: ":memory:".into(), schema_name: "db1".into() };
/// assert_eq!(attach.to_string(), r#"ATTACH DATABASE ':memory:' AS "db1""#);
/// ```
#[derive(Debug)]
pub struct AttachDatabase<'a> {
    pub file_path: Cow<'a, str>,
    pub schema_name: Cow<'a, str>,
}

impl Display for AttachDatabase<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ATTACH DATABASE {} AS {}",
            StrLit(&self.file_path),
            Ident(&self.schema_name)
        )
    }
}

/// Render a `DETACH DATABASE` statement.
///
/// ```
/// # use sql_ddl::sqlite::DetachDatabase;
///
/// let detach = DetachDatabase { schema_name: "db1".into() };
/// assert_eq!(detach.to_string(), r#"DETACH DATABASE "db1""#);
/// ```
#[derive(Debug)]
pub struct DetachDatabase<'a> {
    pub schema_name: Cow<'a, str>,
}

impl Display for DetachDatabase<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DETACH DATABASE {}", Ident(&self.schema_name))
    }
}

#[derive(Debug)]
pub struct SqliteIdentifier<'a> {
    pub schema: Option<Cow<'a, str>>,
    pub name: Cow<'a, str>,
}

impl<'a> From<&'a str> for SqliteIdentifier<'a> {
    fn from(name: &'a str) -> Self {
        SqliteIdentifier {
            schema: None,
            name: name.into(),
        }
    }
}

impl<'a> From<(&'a str, &'a str)> for SqliteIdentifier<'a> {
    fn from((schema, name): (&'a str, &'a str)) -> Self {
        SqliteIdentifier {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl Display for SqliteIdentifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            Display::fmt(&Ident(schema), f)?;
            f.write_str(".")?;
        }

        Display::fmt(&Ident(&self.name), f)
    }
}

pub struct AlterTableAddColumn<'a> {
    pub table_name: SqliteIdentifier<'a>,
    pub column: Column<'a>,
}

impl Display for AlterTableAddColumn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ALTER TABLE {} ADD COLUMN {}", self.table_name, self.column)
    }
}

/// `CREATE INDEX`. SQLite qualifies the index name with the schema and
/// forbids qualifying the table.
pub struct CreateIndex<'a> {
    pub index_name: SqliteIdentifier<'a>,
    pub is_unique: bool,
    pub table_name: Cow<'a, str>,
    pub columns: Vec<IndexColumn<'a>>,
}

impl Display for CreateIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CREATE {uniqueness}INDEX {index_name} ON {table_name}(",
            uniqueness = if self.is_unique { "UNIQUE " } else { "" },
            index_name = self.index_name,
            table_name = Ident(&self.table_name),
        )?;

        render_index_columns(&self.columns, f)?;

        f.write_str(")")
    }
}

#[derive(Debug)]
pub struct DropIndex<'a> {
    pub index_name: SqliteIdentifier<'a>,
}

impl Display for DropIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DROP INDEX {}", self.index_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortOrder;

    #[test]
    fn create_index_qualifies_the_index_name() {
        let create_index = CreateIndex {
            index_name: ("db1", "t00_idx").into(),
            is_unique: false,
            table_name: "t00".into(),
            columns: vec![IndexColumn {
                name: "f_age".into(),
                sort_order: Some(SortOrder::Desc),
            }],
        };

        assert_eq!(
            create_index.to_string(),
            r#"CREATE INDEX "db1"."t00_idx" ON "t00"("f_age" DESC)"#
        );
    }

    #[test]
    fn add_column() {
        let alter = AlterTableAddColumn {
            table_name: ("db1", "t00").into(),
            column: Column::new("f_ok", "BOOLEAN"),
        };

        assert_eq!(alter.to_string(), r#"ALTER TABLE "db1"."t00" ADD COLUMN "f_ok" BOOLEAN"#);
    }

    #[test]
    fn drop_index() {
        let drop = DropIndex {
            index_name: ("db1", "t00_idx").into(),
        };

        assert_eq!(drop.to_string(), r#"DROP INDEX "db1"."t00_idx""#);
    }
}
