use super::{
    index_columns, malformed_table_ref, render_doc_part_table, render_meta_table, Dialect, IndexedColumn, SqlFamily,
};
use crate::{
    ast::{Query, Value},
    converters::{SqliteTypes, TypeRegistry},
    meta::{FieldType, TableRef},
    tables::{MetaColumnType, MetaTableKind},
    visitor::{self, Visitor},
};
use serde_json::Value as Json;
use sql_ddl::sqlite::{AlterTableAddColumn, AttachDatabase, CreateIndex, DetachDatabase, DropIndex, SqliteIdentifier};
use std::{borrow::Cow, path::PathBuf};

/// Where the attached schema databases live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteStorage {
    /// Every schema is a fresh in-memory database.
    InMemory,
    /// Every schema is a `<schema>.sqlite` file in the directory.
    Directory(PathBuf),
}

/// SQLite. Schemas are attached databases, path references are the JSON
/// text of the segment array.
///
/// Foreign keys may not name a table of another schema, so the catalog's
/// parent links are unqualified and resolve inside the catalog schema.
#[derive(Debug, Clone)]
pub struct Sqlite {
    storage: SqliteStorage,
    types: SqliteTypes,
}

impl Sqlite {
    pub fn new(storage: SqliteStorage) -> Self {
        Sqlite {
            storage,
            types: SqliteTypes,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(SqliteStorage::InMemory)
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    fn schema_file(&self, schema: &str) -> String {
        match &self.storage {
            SqliteStorage::InMemory => ":memory:".to_owned(),
            SqliteStorage::Directory(dir) => dir.join(format!("{schema}.sqlite")).to_string_lossy().into_owned(),
        }
    }
}

impl Dialect for Sqlite {
    fn family(&self) -> SqlFamily {
        SqlFamily::Sqlite
    }

    fn types(&self) -> &dyn TypeRegistry {
        &self.types
    }

    fn build<'a>(&self, query: Query<'a>) -> crate::Result<(String, Vec<Value<'a>>)> {
        visitor::Sqlite::build(query)
    }

    fn meta_column_type(&self, column_type: MetaColumnType) -> &'static str {
        match column_type {
            MetaColumnType::Name => "VARCHAR",
            MetaColumnType::TableRef => "TEXT",
            MetaColumnType::Integer => "INTEGER",
            MetaColumnType::Boolean => "BOOLEAN",
        }
    }

    fn create_meta_table_statement(&self, schema: &str, kind: MetaTableKind) -> String {
        let layout = kind.layout();
        let table_name = SqliteIdentifier::from((schema, kind.table_name()));
        let parent = layout
            .foreign_key
            .map(|fk| SqliteIdentifier::from(fk.references.table_name()));

        render_meta_table(
            self,
            layout,
            &table_name,
            parent.as_ref().map(|p| p as &dyn std::fmt::Display),
        )
    }

    fn create_schema_statement(&self, schema: &str) -> String {
        AttachDatabase {
            file_path: Cow::Owned(self.schema_file(schema)),
            schema_name: Cow::Borrowed(schema),
        }
        .to_string()
    }

    /// Detaching keeps the file of a directory backed schema on disk.
    fn drop_schema_statement(&self, schema: &str) -> String {
        DetachDatabase {
            schema_name: Cow::Borrowed(schema),
        }
        .to_string()
    }

    fn create_doc_part_table_statement(&self, schema: &str, table: &str, is_root: bool) -> String {
        let table_name = SqliteIdentifier::from((schema, table));
        render_doc_part_table(&table_name, "INTEGER", is_root)
    }

    fn add_column_statement(&self, schema: &str, table: &str, column: &str, field_type: FieldType) -> String {
        AlterTableAddColumn {
            table_name: SqliteIdentifier::from((schema, table)),
            column: sql_ddl::Column::new(column, self.types.column_type(field_type)),
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
            index_name: SqliteIdentifier::from((schema, index_name)),
            is_unique: unique,
            table_name: Cow::Borrowed(table),
            columns: index_columns(columns),
        }
        .to_string()
    }

    fn drop_index_statement(&self, schema: &str, index_name: &str) -> String {
        DropIndex {
            index_name: SqliteIdentifier::from((schema, index_name)),
        }
        .to_string()
    }

    fn table_ref_value(&self, table_ref: &TableRef) -> Value<'static> {
        let segments = table_ref.segments().iter().cloned().map(Json::String).collect();
        Value::Text(Cow::Owned(Json::Array(segments).to_string()))
    }

    fn table_ref_from_sql(&self, value: Value<'_>) -> crate::Result<TableRef> {
        let json: Json = match value.as_str() {
            Some(text) => serde_json::from_str(text).map_err(|_| malformed_table_ref(&value))?,
            None => return Err(malformed_table_ref(&value)),
        };

        let segments = json
            .as_array()
            .ok_or_else(|| malformed_table_ref(&value))?
            .iter()
            .map(|segment| segment.as_str().map(str::to_owned).ok_or_else(|| malformed_table_ref(&value)))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(TableRef::from_segments(segments))
    }
}
