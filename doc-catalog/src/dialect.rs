//! Everything that differs between the catalog backends.
//!
//! A [`Dialect`] is picked once, when the catalog is configured, and shared
//! as an `Arc<dyn Dialect>` by the writer, the reader and the structure
//! writer. It renders the DDL of the catalog and data tables, encodes path
//! references, chooses how RID counters are advanced and owns the
//! [type registry](crate::converters::TypeRegistry) of the backend.
mod postgres;
mod sqlite;

pub use postgres::Postgres;
pub use sqlite::{Sqlite, SqliteStorage};

use crate::{
    ast::{Column, Comparable, Compare, Expression, Query, Value},
    converters::TypeRegistry,
    meta::{FieldIndexOrdering, FieldType, TableRef},
    tables::{MetaColumnType, MetaTableKind, MetaTableLayout},
};
use sql_ddl::{CreateTable, ForeignKey, IndexColumn, SortOrder};
use std::{borrow::Cow, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlFamily {
    Postgres,
    Sqlite,
}

impl SqlFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlFamily::Postgres => "postgresql",
            SqlFamily::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for SqlFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a document part's RID counter is advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidAllocation {
    /// One `UPDATE ... RETURNING` incrementing the counter atomically.
    UpdateReturning,
    /// `SELECT ... FOR UPDATE` of the counter, then a compare-and-set
    /// `UPDATE`. For backends without `RETURNING`.
    LockingRead,
}

/// A column of a physical index on a document part table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedColumn<'a> {
    pub name: &'a str,
    pub ordering: FieldIndexOrdering,
}

impl<'a> IndexedColumn<'a> {
    pub fn new(name: &'a str, ordering: FieldIndexOrdering) -> Self {
        IndexedColumn { name, ordering }
    }
}

/// The columns every document part table starts with.
pub mod doc_part_columns {
    /// The document the row belongs to.
    pub const DID: &str = "did";
    /// The row id, allocated from the part's RID counter.
    pub const RID: &str = "rid";
    /// The RID of the parent row.
    pub const PID: &str = "pid";
    /// The position inside an array, `NULL` for embedded documents.
    pub const SEQ: &str = "seq";
}

pub trait Dialect: Send + Sync {
    fn family(&self) -> SqlFamily;

    fn types(&self) -> &dyn TypeRegistry;

    /// Renders a statement with this backend's visitor.
    fn build<'a>(&self, query: Query<'a>) -> crate::Result<(String, Vec<Value<'a>>)>;

    /// The native column type of a catalog column.
    fn meta_column_type(&self, column_type: MetaColumnType) -> &'static str;

    /// `CREATE TABLE` for one of the catalog tables inside `schema`.
    fn create_meta_table_statement(&self, schema: &str, kind: MetaTableKind) -> String;

    fn create_schema_statement(&self, schema: &str) -> String;

    fn drop_schema_statement(&self, schema: &str) -> String;

    /// `CREATE TABLE` for a document part. Root parts only hold the
    /// document id; children also link to their parent row.
    fn create_doc_part_table_statement(&self, schema: &str, table: &str, is_root: bool) -> String;

    fn add_column_statement(&self, schema: &str, table: &str, column: &str, field_type: FieldType) -> String;

    fn create_index_statement(
        &self,
        schema: &str,
        table: &str,
        index_name: &str,
        unique: bool,
        columns: &[IndexedColumn<'_>],
    ) -> String;

    fn drop_index_statement(&self, schema: &str, index_name: &str) -> String;

    fn rid_allocation(&self) -> RidAllocation {
        RidAllocation::UpdateReturning
    }

    /// The stored form of a path reference. The reference must have been
    /// validated.
    fn table_ref_value(&self, table_ref: &TableRef) -> Value<'static>;

    fn table_ref_from_sql(&self, value: Value<'_>) -> crate::Result<TableRef>;

    /// A condition matching exactly the given path. Both encodings compare
    /// whole values, so prefixes and suffixes never match.
    fn table_ref_eq<'a>(&self, column: Column<'a>, table_ref: &TableRef) -> Compare<'a> {
        column.equals(Expression::from(self.table_ref_value(table_ref)))
    }
}

impl fmt::Debug for dyn Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect").field("family", &self.family()).finish()
    }
}

/// Renders a catalog table from its layout. Every column is `NOT NULL`.
pub(crate) fn render_meta_table(
    dialect: &dyn Dialect,
    layout: &MetaTableLayout,
    table_name: &dyn fmt::Display,
    referenced_table: Option<&dyn fmt::Display>,
) -> String {
    let columns = layout
        .columns
        .iter()
        .map(|column| {
            let rendered = sql_ddl::Column::new(column.name, dialect.meta_column_type(column.column_type)).not_null();

            match column.default {
                Some(default) => rendered.default_value(default),
                None => rendered,
            }
        })
        .collect();

    let names = |columns: &[&'static str]| columns.iter().map(|c| Cow::Borrowed(*c)).collect::<Vec<_>>();

    let foreign_keys = match (layout.foreign_key, referenced_table) {
        (Some(fk), Some(referenced_table)) => vec![ForeignKey {
            constrained_columns: names(fk.columns),
            referenced_table,
            referenced_columns: names(fk.referenced_columns),
        }],
        _ => Vec::new(),
    };

    CreateTable {
        table_name,
        columns,
        primary_key: names(layout.primary_key),
        unique: layout.unique.iter().map(|u| names(*u)).collect(),
        foreign_keys,
    }
    .to_string()
}

pub(crate) fn render_doc_part_table(
    table_name: &dyn fmt::Display,
    integer_type: &'static str,
    is_root: bool,
) -> String {
    use doc_part_columns::*;

    let (columns, primary_key) = if is_root {
        (vec![sql_ddl::Column::new(DID, integer_type).not_null()], vec![DID.into()])
    } else {
        (
            vec![
                sql_ddl::Column::new(DID, integer_type).not_null(),
                sql_ddl::Column::new(RID, integer_type).not_null(),
                sql_ddl::Column::new(PID, integer_type).not_null(),
                sql_ddl::Column::new(SEQ, integer_type),
            ],
            vec![RID.into()],
        )
    };

    CreateTable {
        table_name,
        columns,
        primary_key,
        unique: Vec::new(),
        foreign_keys: Vec::new(),
    }
    .to_string()
}

pub(crate) fn index_columns<'a>(columns: &[IndexedColumn<'a>]) -> Vec<IndexColumn<'a>> {
    columns
        .iter()
        .map(|column| IndexColumn {
            name: Cow::Borrowed(column.name),
            sort_order: Some(match column.ordering {
                FieldIndexOrdering::Asc => SortOrder::Asc,
                FieldIndexOrdering::Desc => SortOrder::Desc,
            }),
        })
        .collect()
}

pub(crate) fn malformed_table_ref(value: &Value<'_>) -> crate::Error {
    kv_value::ConversionFailure::new(format!("{value:?}"), "TableRef").into()
}
