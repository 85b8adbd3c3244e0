//! DDL for the data side: the schemas and tables documents are stored in.
//!
//! The catalog describes the structure; this writer creates it. Column types
//! come from the dialect's [type registry](crate::converters::TypeRegistry),
//! so a field's column always matches how its values are converted.

use crate::{
    connector::Queryable,
    dialect::{Dialect, IndexedColumn},
    error::{Error, ErrorKind},
    meta::{MetaDatabase, MetaDocPart, MetaDocPartIndex, MetaField, MetaScalar},
    sql_helper::{ExecutionContext, SqlHelper},
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct StructureWriter {
    helper: SqlHelper,
}

impl StructureWriter {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        StructureWriter {
            helper: SqlHelper::new(dialect),
        }
    }

    fn dialect(&self) -> &dyn Dialect {
        self.helper.dialect()
    }

    /// Creates the schema holding the database's tables.
    pub async fn create_schema(&self, conn: &dyn Queryable, database: &MetaDatabase) -> crate::Result<()> {
        let statement = self.dialect().create_schema_statement(&database.identifier);

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::CreateSchema)
            .await
    }

    /// Drops the schema with everything in it.
    pub async fn drop_schema(&self, conn: &dyn Queryable, database: &MetaDatabase) -> crate::Result<()> {
        let statement = self.dialect().drop_schema_statement(&database.identifier);

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::DropSchema)
            .await
    }

    pub async fn create_doc_part_table(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        doc_part: &MetaDocPart,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let statement = self.dialect().create_doc_part_table_statement(
            &database.identifier,
            &doc_part.identifier,
            doc_part.table_ref.is_root(),
        );

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::CreateTable)
            .await
    }

    pub async fn add_field_column(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        doc_part: &MetaDocPart,
        field: &MetaField,
    ) -> crate::Result<()> {
        let statement = self.dialect().add_column_statement(
            &database.identifier,
            &doc_part.identifier,
            &field.identifier,
            field.field_type,
        );

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::AddColumn)
            .await
    }

    pub async fn add_scalar_column(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        doc_part: &MetaDocPart,
        scalar: &MetaScalar,
    ) -> crate::Result<()> {
        let statement = self.dialect().add_column_statement(
            &database.identifier,
            &doc_part.identifier,
            &scalar.identifier,
            scalar.field_type,
        );

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::AddColumn)
            .await
    }

    /// Creates the physical index over the columns of the document part's
    /// `fields`. Each field index entry is matched by name and type; an entry
    /// without a matching field fails before anything is executed.
    pub async fn create_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        doc_part: &MetaDocPart,
        fields: &[MetaField],
        index: &MetaDocPartIndex,
    ) -> crate::Result<()> {
        let columns = index
            .fields
            .iter()
            .map(|entry| {
                fields
                    .iter()
                    .find(|field| field.name == entry.name && field.field_type == entry.field_type)
                    .map(|field| IndexedColumn::new(&field.identifier, entry.ordering))
                    .ok_or_else(|| {
                        let message = format!(
                            "index {} names {} ({}), which is not a field of {}",
                            index.identifier,
                            entry.name,
                            entry.field_type,
                            doc_part.identifier
                        );

                        Error::builder(ErrorKind::invalid_argument(message)).build()
                    })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let statement = self.dialect().create_index_statement(
            &database.identifier,
            &doc_part.identifier,
            &index.identifier,
            index.unique,
            &columns,
        );

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::CreateIndex)
            .await
    }

    pub async fn drop_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        index: &MetaDocPartIndex,
    ) -> crate::Result<()> {
        let statement = self
            .dialect()
            .drop_index_statement(&database.identifier, &index.identifier);

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::DropIndex)
            .await
    }
}
