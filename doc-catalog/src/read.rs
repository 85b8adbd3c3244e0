//! Loading catalog rows back into entities.

use crate::{
    ast::{Column, Comparable, ConditionTree, Select, Value},
    connector::{Queryable, ResultRow, ResultSet},
    dialect::Dialect,
    error::{Error, ErrorKind},
    meta::{
        FieldIndexOrdering, FieldType, MetaCollection, MetaDatabase, MetaDocPart, MetaDocPartIndex, MetaField,
        MetaFieldIndex, MetaIndex, MetaIndexField, MetaScalar,
    },
    sql_helper::{ExecutionContext, SqlHelper},
    tables::{
        CollectionTable, DatabaseTable, DocPartIndexTable, DocPartTable, FieldIndexTable, FieldTable, IndexFieldTable,
        IndexTable, MetaTableKind, MetaTables, ScalarTable,
    },
};
use std::sync::Arc;

/// A document part as stored, with the current value of its RID counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocPart {
    pub doc_part: MetaDocPart,
    pub last_rid: i32,
}

/// Reads the catalog. Results come back ordered by their key.
#[derive(Debug, Clone)]
pub struct MetaDataReader {
    tables: MetaTables,
    helper: SqlHelper,
}

impl MetaDataReader {
    pub fn new(tables: MetaTables, dialect: Arc<dyn Dialect>) -> Self {
        MetaDataReader {
            tables,
            helper: SqlHelper::new(dialect),
        }
    }

    fn dialect(&self) -> &dyn Dialect {
        self.helper.dialect()
    }

    /// Every column of a catalog table, in the stored order.
    fn select(&self, kind: MetaTableKind) -> Select<'_> {
        Select::from_table(self.tables.table(kind)).columns(kind.layout().column_names().map(|name| Column::from(name)))
    }

    async fn query(&self, conn: &dyn Queryable, select: Select<'_>) -> crate::Result<ResultSet> {
        self.helper
            .query(conn, select.into(), ExecutionContext::MetaRead)
            .await
    }

    pub async fn read_databases(&self, conn: &dyn Queryable) -> crate::Result<Vec<MetaDatabase>> {
        let select = self.select(DatabaseTable::KIND).order_by(DatabaseTable::NAME);

        self.query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MetaDatabase::new(
                    text(&row, DatabaseTable::NAME)?,
                    text(&row, DatabaseTable::IDENTIFIER)?,
                ))
            })
            .collect()
    }

    pub async fn read_collections(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
    ) -> crate::Result<Vec<MetaCollection>> {
        let select = self
            .select(CollectionTable::KIND)
            .so_that(Column::from(CollectionTable::DATABASE).equals(database.name.as_str()))
            .order_by(CollectionTable::NAME);

        self.query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MetaCollection::new(
                    text(&row, CollectionTable::NAME)?,
                    text(&row, CollectionTable::IDENTIFIER)?,
                ))
            })
            .collect()
    }

    pub async fn read_doc_parts(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
    ) -> crate::Result<Vec<StoredDocPart>> {
        let select = self
            .select(DocPartTable::KIND)
            .so_that(ConditionTree::all([
                Column::from(DocPartTable::DATABASE).equals(database.name.as_str()),
                Column::from(DocPartTable::COLLECTION).equals(collection.name.as_str()),
            ]))
            .order_by(DocPartTable::IDENTIFIER);

        let mut doc_parts = self
            .query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                let table_ref = self.dialect().table_ref_from_sql(column(&row, DocPartTable::TABLE_REF)?.clone())?;

                Ok(StoredDocPart {
                    doc_part: MetaDocPart::new(table_ref, text(&row, DocPartTable::IDENTIFIER)?),
                    last_rid: integer(&row, DocPartTable::LAST_RID)?,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        // Parents before children.
        doc_parts.sort_by(|a, b| a.doc_part.table_ref.cmp(&b.doc_part.table_ref));

        Ok(doc_parts)
    }

    /// The current RID counter of a part: the first RID the next allocation
    /// hands out.
    pub async fn last_rid(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<i32> {
        doc_part.table_ref.validate()?;

        let select = Select::from_table(self.tables.table(DocPartTable::KIND))
            .column(DocPartTable::LAST_RID)
            .so_that(ConditionTree::all([
                Column::from(DocPartTable::DATABASE).equals(database.name.as_str()),
                Column::from(DocPartTable::COLLECTION).equals(collection.name.as_str()),
                self.dialect()
                    .table_ref_eq(Column::from(DocPartTable::TABLE_REF), &doc_part.table_ref),
            ]));

        let rows = self.query(conn, select).await?;

        match rows.into_iter().next() {
            Some(row) => integer(&row, DocPartTable::LAST_RID),
            None => Err(Error::builder(ErrorKind::DocPartNotFound {
                database: database.name.clone(),
                collection: collection.name.clone(),
                table_ref: doc_part.table_ref.to_string(),
            })
            .build()),
        }
    }

    pub async fn read_fields(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<Vec<MetaField>> {
        doc_part.table_ref.validate()?;

        let select = self
            .select(FieldTable::KIND)
            .so_that(ConditionTree::all([
                Column::from(FieldTable::DATABASE).equals(database.name.as_str()),
                Column::from(FieldTable::COLLECTION).equals(collection.name.as_str()),
                self.dialect()
                    .table_ref_eq(Column::from(FieldTable::TABLE_REF), &doc_part.table_ref),
            ]))
            .order_by(FieldTable::NAME)
            .order_by(FieldTable::TYPE);

        self.query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MetaField::new(
                    text(&row, FieldTable::NAME)?,
                    text(&row, FieldTable::IDENTIFIER)?,
                    field_type(&row, FieldTable::TYPE)?,
                ))
            })
            .collect()
    }

    pub async fn read_scalars(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<Vec<MetaScalar>> {
        doc_part.table_ref.validate()?;

        let select = self
            .select(ScalarTable::KIND)
            .so_that(ConditionTree::all([
                Column::from(ScalarTable::DATABASE).equals(database.name.as_str()),
                Column::from(ScalarTable::COLLECTION).equals(collection.name.as_str()),
                self.dialect()
                    .table_ref_eq(Column::from(ScalarTable::TABLE_REF), &doc_part.table_ref),
            ]))
            .order_by(ScalarTable::TYPE);

        self.query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MetaScalar::new(
                    text(&row, ScalarTable::IDENTIFIER)?,
                    field_type(&row, ScalarTable::TYPE)?,
                ))
            })
            .collect()
    }

    /// The indexes of a collection, each with its fields in position order.
    pub async fn read_indexes(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
    ) -> crate::Result<Vec<MetaIndex>> {
        let select = self
            .select(IndexTable::KIND)
            .so_that(ConditionTree::all([
                Column::from(IndexTable::DATABASE).equals(database.name.as_str()),
                Column::from(IndexTable::COLLECTION).equals(collection.name.as_str()),
            ]))
            .order_by(IndexTable::NAME);

        let mut indexes = self
            .query(conn, select)
            .await?
            .into_iter()
            .map(|row| Ok(MetaIndex::new(text(&row, IndexTable::NAME)?, boolean(&row, IndexTable::UNIQUE)?)))
            .collect::<crate::Result<Vec<_>>>()?;

        for index in indexes.iter_mut() {
            let select = self
                .select(IndexFieldTable::KIND)
                .so_that(ConditionTree::all([
                    Column::from(IndexFieldTable::DATABASE).equals(database.name.as_str()),
                    Column::from(IndexFieldTable::COLLECTION).equals(collection.name.as_str()),
                    Column::from(IndexFieldTable::INDEX).equals(index.name.as_str()),
                ]))
                .order_by(IndexFieldTable::POSITION);

            index.fields = self
                .query(conn, select)
                .await?
                .into_iter()
                .map(|row| {
                    Ok(MetaIndexField {
                        position: integer(&row, IndexFieldTable::POSITION)?,
                        table_ref: self
                            .dialect()
                            .table_ref_from_sql(column(&row, IndexFieldTable::TABLE_REF)?.clone())?,
                        name: text(&row, IndexFieldTable::NAME)?,
                        ordering: ordering(&row, IndexFieldTable::ORDERING)?,
                    })
                })
                .collect::<crate::Result<_>>()?;
        }

        Ok(indexes)
    }

    /// The physical indexes of a document part, each with its columns in
    /// position order.
    pub async fn read_doc_part_indexes(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<Vec<MetaDocPartIndex>> {
        doc_part.table_ref.validate()?;

        let select = self
            .select(DocPartIndexTable::KIND)
            .so_that(ConditionTree::all([
                Column::from(DocPartIndexTable::DATABASE).equals(database.name.as_str()),
                Column::from(DocPartIndexTable::COLLECTION).equals(collection.name.as_str()),
                self.dialect()
                    .table_ref_eq(Column::from(DocPartIndexTable::TABLE_REF), &doc_part.table_ref),
            ]))
            .order_by(DocPartIndexTable::IDENTIFIER);

        let mut indexes = self
            .query(conn, select)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MetaDocPartIndex::new(
                    text(&row, DocPartIndexTable::IDENTIFIER)?,
                    boolean(&row, DocPartIndexTable::UNIQUE)?,
                ))
            })
            .collect::<crate::Result<Vec<_>>>()?;

        for index in indexes.iter_mut() {
            let select = self
                .select(FieldIndexTable::KIND)
                .so_that(ConditionTree::all([
                    Column::from(FieldIndexTable::DATABASE).equals(database.name.as_str()),
                    Column::from(FieldIndexTable::IDENTIFIER).equals(index.identifier.as_str()),
                ]))
                .order_by(FieldIndexTable::POSITION);

            index.fields = self
                .query(conn, select)
                .await?
                .into_iter()
                .map(|row| {
                    Ok(MetaFieldIndex {
                        position: integer(&row, FieldIndexTable::POSITION)?,
                        name: text(&row, FieldIndexTable::NAME)?,
                        field_type: field_type(&row, FieldIndexTable::TYPE)?,
                        ordering: ordering(&row, FieldIndexTable::ORDERING)?,
                    })
                })
                .collect::<crate::Result<_>>()?;
        }

        Ok(indexes)
    }
}

fn column<'a>(row: &'a ResultRow, name: &str) -> crate::Result<&'a Value<'static>> {
    row.try_get(name)
}

fn text(row: &ResultRow, name: &str) -> crate::Result<String> {
    match column(row, name)? {
        Value::Text(s) => Ok(s.to_string()),
        _ => Err(Error::builder(ErrorKind::ResultTypeMismatch("text")).build()),
    }
}

fn integer(row: &ResultRow, name: &str) -> crate::Result<i32> {
    let value = column(row, name)?
        .as_i64()
        .ok_or_else(|| Error::builder(ErrorKind::ResultTypeMismatch("integer")).build())?;

    Ok(i32::try_from(value)?)
}

fn boolean(row: &ResultRow, name: &str) -> crate::Result<bool> {
    column(row, name)?
        .as_bool()
        .ok_or_else(|| Error::builder(ErrorKind::ResultTypeMismatch("boolean")).build())
}

fn field_type(row: &ResultRow, name: &str) -> crate::Result<FieldType> {
    text(row, name)?.parse()
}

fn ordering(row: &ResultRow, name: &str) -> crate::Result<FieldIndexOrdering> {
    text(row, name)?.parse()
}
