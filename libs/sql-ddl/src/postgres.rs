use crate::common::{render_index_columns, Column, Ident, IndexColumn};
use std::{borrow::Cow, fmt::Display};

pub struct AlterTable<'a> {
    pub table_name: &'a dyn Display,
    pub clause: AlterTableClause<'a>,
}

impl Display for AlterTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ALTER TABLE ")?;
        self.table_name.fmt(f)?;
        f.write_str(" ")?;
        self.clause.fmt(f)
    }
}

pub enum AlterTableClause<'a> {
    AddColumn(Column<'a>),
}

impl Display for AlterTableClause<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            AlterTableClause::AddColumn(col) => {
                f.write_str("ADD COLUMN ")?;
                Display::fmt(col, f)
            }
        }
    }
}

/// Render a `CREATE SCHEMA` statement.
///
/// ```
/// # use sql_ddl::postgres::CreateSchema;
///
/// let create_schema = CreateSchema { schema_name: "catalog".into(), if_not_exists: true };
/// assert_eq!(create_schema.to_string(), r#"CREATE SCHEMA IF NOT EXISTS "catalog""#);
/// ```
#[derive(Debug)]
pub struct CreateSchema<'a> {
    pub schema_name: Cow<'a, str>,
    pub if_not_exists: bool,
}

impl Display for CreateSchema<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CREATE SCHEMA ")?;

        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }

        Display::fmt(&Ident(&self.schema_name), f)
    }
}

/// Render a `DROP SCHEMA` statement.
///
/// ```
/// # use sql_ddl::postgres::DropSchema;
///
/// let drop_schema = DropSchema { schema_name: "db1".into(), cascade: true };
/// assert_eq!(drop_schema.to_string(), r#"DROP SCHEMA "db1" CASCADE"#);
/// ```
#[derive(Debug)]
pub struct DropSchema<'a> {
    pub schema_name: Cow<'a, str>,
    pub cascade: bool,
}

impl Display for DropSchema<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DROP SCHEMA ")?;
        Display::fmt(&Ident(&self.schema_name), f)?;

        if self.cascade {
            f.write_str(" CASCADE")?;
        }

        Ok(())
    }
}

/// Render a `DROP INDEX` statement.
///
/// ```
/// # use sql_ddl::postgres::{DropIndex, PostgresIdentifier};
///
/// let drop_index = DropIndex { index_name: PostgresIdentifier::WithSchema("db1".into(), "idx".into()) };
/// assert_eq!(drop_index.to_string(), r#"DROP INDEX "db1"."idx""#);
/// ```
#[derive(Debug)]
pub struct DropIndex<'a> {
    /// The name of the index to be dropped.
    pub index_name: PostgresIdentifier<'a>,
}

impl Display for DropIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DROP INDEX ")?;
        write!(f, "{}", self.index_name)
    }
}

#[derive(Debug)]
pub enum PostgresIdentifier<'a> {
    /// Simple identifier without a schema(namespace).
    Simple(Cow<'a, str>),
    /// Identifier with a schema(namespace). The first field is the schema.
    WithSchema(Cow<'a, str>, Cow<'a, str>),
}

impl<'a> From<&'a str> for PostgresIdentifier<'a> {
    fn from(s: &'a str) -> Self {
        PostgresIdentifier::Simple(Cow::Borrowed(s))
    }
}

impl<'a> From<(&'a str, &'a str)> for PostgresIdentifier<'a> {
    fn from((schema, item): (&'a str, &'a str)) -> Self {
        PostgresIdentifier::WithSchema(Cow::Borrowed(schema), Cow::Borrowed(item))
    }
}

impl Display for PostgresIdentifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostgresIdentifier::Simple(name) => Display::fmt(&Ident(name), f),
            PostgresIdentifier::WithSchema(prefix, name) => {
                Display::fmt(&Ident(prefix), f)?;
                f.write_str(".")?;
                Display::fmt(&Ident(name), f)
            }
        }
    }
}

/// `CREATE INDEX`. On PostgreSQL the index lives in the schema of its table,
/// so the index name is never qualified.
pub struct CreateIndex<'a> {
    pub index_name: Cow<'a, str>,
    pub is_unique: bool,
    pub table_reference: &'a dyn Display,
    pub columns: Vec<IndexColumn<'a>>,
}

impl Display for CreateIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CREATE {uniqueness}INDEX {index_name} ON {table_reference}(",
            uniqueness = if self.is_unique { "UNIQUE " } else { "" },
            index_name = Ident(&self.index_name),
            table_reference = self.table_reference,
        )?;

        render_index_columns(&self.columns, f)?;

        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortOrder;

    #[test]
    fn create_unique_index_sort_order() {
        let columns = vec![
            IndexColumn {
                name: "f_name".into(),
                sort_order: Some(SortOrder::Asc),
            },
            IndexColumn {
                name: "f_age".into(),
                sort_order: Some(SortOrder::Desc),
            },
        ];

        let create_index = CreateIndex {
            is_unique: true,
            index_name: "t00_idx".into(),
            table_reference: &PostgresIdentifier::WithSchema("db1".into(), "t00".into()),
            columns,
        };

        assert_eq!(
            create_index.to_string(),
            "CREATE UNIQUE INDEX \"t00_idx\" ON \"db1\".\"t00\"(\"f_name\" ASC, \"f_age\" DESC)"
        )
    }

    #[test]
    fn alter_table_add_column() {
        let alter_table = AlterTable {
            table_name: &PostgresIdentifier::WithSchema("db1".into(), "t00".into()),
            clause: AlterTableClause::AddColumn(Column::new("f_age", "INTEGER")),
        };

        assert_eq!(
            alter_table.to_string(),
            r#"ALTER TABLE "db1"."t00" ADD COLUMN "f_age" INTEGER"#
        );
    }
}
