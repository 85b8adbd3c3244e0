use super::{
    index_columns, malformed_table_ref, render_doc_part_table, render_meta_table, Dialect, IndexedColumn, SqlFamily,
};
use crate::{
    ast::{Query, Value},
    converters::{PostgresTypes, TypeRegistry},
    meta::{FieldType, TableRef},
    tables::{MetaColumnType, MetaTableKind},
    visitor::{self, Visitor},
};
use sql_ddl::postgres::{
    AlterTable, AlterTableClause, CreateIndex, CreateSchema, DropIndex, DropSchema, PostgresIdentifier,
};
use std::borrow::Cow;

/// PostgreSQL. Path references are `varchar[]` columns, every catalog
/// object is schema qualified.
#[derive(Debug, Clone, Default)]
pub struct Postgres {
    types: PostgresTypes,
}

impl Postgres {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dialect for Postgres {
    fn family(&self) -> SqlFamily {
        SqlFamily::Postgres
    }

    fn types(&self) -> &dyn TypeRegistry {
        &self.types
    }

    fn build<'a>(&self, query: Query<'a>) -> crate::Result<(String, Vec<Value<'a>>)> {
        visitor::Postgres::build(query)
    }

    fn meta_column_type(&self, column_type: MetaColumnType) -> &'static str {
        match column_type {
            MetaColumnType::Name => "varchar",
            MetaColumnType::TableRef => "varchar[]",
            MetaColumnType::Integer => "integer",
            MetaColumnType::Boolean => "boolean",
        }
    }

    fn create_meta_table_statement(&self, schema: &str, kind: MetaTableKind) -> String {
        let layout = kind.layout();
        let table_name = PostgresIdentifier::from((schema, kind.table_name()));
        let parent = layout
            .foreign_key
            .map(|fk| PostgresIdentifier::from((schema, fk.references.table_name())));

        render_meta_table(
            self,
            layout,
            &table_name,
            parent.as_ref().map(|p| p as &dyn std::fmt::Display),
        )
    }

    fn create_schema_statement(&self, schema: &str) -> String {
        CreateSchema {
            schema_name: Cow::Borrowed(schema),
            if_not_exists: false,
        }
        .to_string()
    }

    fn drop_schema_statement(&self, schema: &str) -> String {
        DropSchema {
            schema_name: Cow::Borrowed(schema),
            cascade: true,
        }
        .to_string()
    }

    fn create_doc_part_table_statement(&self, schema: &str, table: &str, is_root: bool) -> String {
        let table_name = PostgresIdentifier::from((schema, table));
        render_doc_part_table(&table_name, "integer", is_root)
    }

    fn add_column_statement(&self, schema: &str, table: &str, column: &str, field_type: FieldType) -> String {
        AlterTable {
            table_name: &PostgresIdentifier::from((schema, table)),
            clause: AlterTableClause::AddColumn(sql_ddl::Column::new(column, self.types.column_type(field_type))),
        }
        .to_string()
    }

    fn create_index_statement(
        &self,
        schema: &str,
        table: &str,
        index_name: &str,
        unique: bool,
        columns: &[IndexedColumn<'_>],
    ) -> String {
        CreateIndex {
            index_name: Cow::Borrowed(index_name),
            is_unique: unique,
            table_reference: &PostgresIdentifier::from((schema, table)),
            columns: index_columns(columns),
        }
        .to_string()
    }

    fn drop_index_statement(&self, schema: &str, index_name: &str) -> String {
        DropIndex {
            index_name: PostgresIdentifier::from((schema, index_name)),
        }
        .to_string()
    }

    fn table_ref_value(&self, table_ref: &TableRef) -> Value<'static> {
        Value::Array(
            table_ref
                .segments()
                .iter()
                .map(|segment| Value::Text(Cow::Owned(segment.clone())))
                .collect(),
        )
    }

    fn table_ref_from_sql(&self, value: Value<'_>) -> crate::Result<TableRef> {
        let Value::Array(elements) = &value else {
            return Err(malformed_table_ref(&value));
        };

        let segments = elements
            .iter()
            .map(|element| element.as_str().map(str::to_owned).ok_or_else(|| malformed_table_ref(&value)))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(TableRef::from_segments(segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FieldIndexOrdering;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn doc_part_table_ddl() {
        let expected = indoc!(
            r#"
            CREATE TABLE "doc_catalog"."doc_part" (
                "database" varchar NOT NULL,
                "collection" varchar NOT NULL,
                "table_ref" varchar[] NOT NULL,
                "identifier" varchar NOT NULL,
                "last_rid" integer NOT NULL DEFAULT 0,
                PRIMARY KEY ("database", "collection", "table_ref"),
                UNIQUE ("database", "identifier"),
                FOREIGN KEY ("database", "collection") REFERENCES "doc_catalog"."collection"("database", "name")
            )"#
        );

        assert_eq!(expected, Postgres::new().create_meta_table_statement("doc_catalog", MetaTableKind::DocPart));
    }

    #[test]
    fn table_ref_is_a_varchar_array() {
        let value = Postgres::new().table_ref_value(&TableRef::from_segments(["a", "$2"]));

        assert_eq!(Value::Array(vec![Value::from("a"), Value::from("$2")]), value);
        assert_eq!(Value::Array(Vec::new()), Postgres::new().table_ref_value(&TableRef::root()));
        assert!(Postgres::new().table_ref_from_sql(Value::from("[]")).is_err());
    }

    #[test]
    fn structure_ddl() {
        let dialect = Postgres::new();

        assert_eq!(r#"CREATE SCHEMA "db1""#, dialect.create_schema_statement("db1"));
        assert_eq!(r#"DROP SCHEMA "db1" CASCADE"#, dialect.drop_schema_statement("db1"));
        assert_eq!(
            r#"ALTER TABLE "db1"."t00" ADD COLUMN "f_d" DOUBLE PRECISION"#,
            dialect.add_column_statement("db1", "t00", "f_d", FieldType::Double)
        );
        assert_eq!(
            r#"CREATE UNIQUE INDEX "t00_idx" ON "db1"."t00"("f_a" ASC, "f_b" DESC)"#,
            dialect.create_index_statement(
                "db1",
                "t00",
                "t00_idx",
                true,
                &[
                    IndexedColumn::new("f_a", FieldIndexOrdering::Asc),
                    IndexedColumn::new("f_b", FieldIndexOrdering::Desc)
                ]
            )
        );
        assert_eq!(r#"DROP INDEX "db1"."t00_idx""#, dialect.drop_index_statement("db1", "t00_idx"));
    }

    #[test]
    fn child_doc_part_tables_link_to_their_parent() {
        let expected = indoc!(
            r#"
            CREATE TABLE "db1"."t01" (
                "did" integer NOT NULL,
                "rid" integer NOT NULL,
                "pid" integer NOT NULL,
                "seq" integer,
                PRIMARY KEY ("rid")
            )"#
        );

        assert_eq!(expected, Postgres::new().create_doc_part_table_statement("db1", "t01", false));
    }
}
