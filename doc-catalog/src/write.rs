//! Mutations of the catalog tables.

use crate::{
    ast::{Column, Comparable, Compare, ConditionTree, Conjunctive, Delete, Insert, Select, SqlOp, Table, Update},
    connector::Queryable,
    dialect::{Dialect, RidAllocation},
    error::{Error, ErrorKind},
    meta::{
        MetaCollection, MetaDatabase, MetaDocPart, MetaDocPartIndex, MetaField, MetaFieldIndex, MetaIndex,
        MetaIndexField, MetaScalar, TableRef,
    },
    sql_helper::{ExecutionContext, SqlHelper},
    tables::{
        CollectionTable, DatabaseTable, DocPartIndexTable, DocPartTable, FieldIndexTable, FieldTable, IndexFieldTable,
        IndexTable, MetaTableKind, MetaTables, ScalarTable,
    },
};
use std::sync::Arc;

/// Creates the catalog tables and inserts and deletes their rows.
///
/// Every operation runs on the connection it is given and never begins,
/// commits or rolls back a transaction; callers wanting several operations
/// to apply atomically run them inside their own transaction. Rows are keyed
/// by the database and collection names, and inserts do not check for
/// existing rows: a duplicate key fails with
/// [`UniqueConstraintViolation`](ErrorKind::UniqueConstraintViolation).
#[derive(Debug, Clone)]
pub struct MetaDataWriter {
    tables: MetaTables,
    helper: SqlHelper,
}

impl MetaDataWriter {
    pub fn new(tables: MetaTables, dialect: Arc<dyn Dialect>) -> Self {
        MetaDataWriter {
            tables,
            helper: SqlHelper::new(dialect),
        }
    }

    pub fn tables(&self) -> &MetaTables {
        &self.tables
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.helper.dialect()
    }

    fn table(&self, kind: MetaTableKind) -> Table<'_> {
        self.tables.table(kind)
    }

    fn table_ref_eq<'a>(&self, column: &'static str, table_ref: &TableRef) -> Compare<'a> {
        self.dialect().table_ref_eq(Column::from(column), table_ref)
    }

    pub async fn create_catalog_schema(&self, conn: &dyn Queryable) -> crate::Result<()> {
        let statement = self.dialect().create_schema_statement(self.tables.schema());

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::CreateSchema)
            .await
    }

    /// Creates the catalog schema and every catalog table, parents first.
    pub async fn create_catalog(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_catalog_schema(conn).await?;

        for kind in MetaTableKind::ALL {
            self.create_meta_table(conn, kind).await?;
        }

        Ok(())
    }

    pub async fn create_meta_table(&self, conn: &dyn Queryable, kind: MetaTableKind) -> crate::Result<()> {
        let statement = self.dialect().create_meta_table_statement(self.tables.schema(), kind);

        self.helper
            .execute_statement(conn, &statement, ExecutionContext::CreateTable)
            .await
    }

    pub async fn create_meta_database_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::Database).await
    }

    pub async fn create_meta_collection_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::Collection).await
    }

    pub async fn create_meta_doc_part_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::DocPart).await
    }

    pub async fn create_meta_field_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::Field).await
    }

    pub async fn create_meta_scalar_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::Scalar).await
    }

    pub async fn create_meta_index_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::Index).await
    }

    pub async fn create_meta_index_field_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::IndexField).await
    }

    pub async fn create_meta_doc_part_index_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::DocPartIndex).await
    }

    pub async fn create_meta_field_index_table(&self, conn: &dyn Queryable) -> crate::Result<()> {
        self.create_meta_table(conn, MetaTableKind::FieldIndex).await
    }

    async fn insert(&self, conn: &dyn Queryable, insert: Insert<'_>) -> crate::Result<()> {
        self.helper
            .execute_update(conn, insert.into(), ExecutionContext::MetaInsert)
            .await?;

        Ok(())
    }

    async fn delete(&self, conn: &dyn Queryable, delete: Delete<'_>) -> crate::Result<u64> {
        self.helper
            .execute_update(conn, delete.into(), ExecutionContext::MetaDelete)
            .await
    }

    pub async fn add_meta_database(&self, conn: &dyn Queryable, database: &MetaDatabase) -> crate::Result<()> {
        let insert = Insert::single_into(self.table(DatabaseTable::KIND))
            .value(DatabaseTable::NAME, database.name.as_str())
            .value(DatabaseTable::IDENTIFIER, database.identifier.as_str());

        self.insert(conn, insert.into()).await
    }

    pub async fn add_meta_collection(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
    ) -> crate::Result<()> {
        let insert = Insert::single_into(self.table(CollectionTable::KIND))
            .value(CollectionTable::DATABASE, database.name.as_str())
            .value(CollectionTable::NAME, collection.name.as_str())
            .value(CollectionTable::IDENTIFIER, collection.identifier.as_str());

        self.insert(conn, insert.into()).await
    }

    /// Registers a document part with its RID counter at zero.
    pub async fn add_meta_doc_part(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let insert = Insert::single_into(self.table(DocPartTable::KIND))
            .value(DocPartTable::DATABASE, database.name.as_str())
            .value(DocPartTable::COLLECTION, collection.name.as_str())
            .value(DocPartTable::TABLE_REF, self.dialect().table_ref_value(&doc_part.table_ref))
            .value(DocPartTable::IDENTIFIER, doc_part.identifier.as_str())
            .value(DocPartTable::LAST_RID, 0);

        self.insert(conn, insert.into()).await
    }

    pub async fn add_meta_field(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        field: &MetaField,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let insert = Insert::single_into(self.table(FieldTable::KIND))
            .value(FieldTable::DATABASE, database.name.as_str())
            .value(FieldTable::COLLECTION, collection.name.as_str())
            .value(FieldTable::TABLE_REF, self.dialect().table_ref_value(&doc_part.table_ref))
            .value(FieldTable::NAME, field.name.as_str())
            .value(FieldTable::TYPE, field.field_type.as_str())
            .value(FieldTable::IDENTIFIER, field.identifier.as_str());

        self.insert(conn, insert.into()).await
    }

    pub async fn add_meta_scalar(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        scalar: &MetaScalar,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let insert = Insert::single_into(self.table(ScalarTable::KIND))
            .value(ScalarTable::DATABASE, database.name.as_str())
            .value(ScalarTable::COLLECTION, collection.name.as_str())
            .value(ScalarTable::TABLE_REF, self.dialect().table_ref_value(&doc_part.table_ref))
            .value(ScalarTable::TYPE, scalar.field_type.as_str())
            .value(ScalarTable::IDENTIFIER, scalar.identifier.as_str());

        self.insert(conn, insert.into()).await
    }

    /// Inserts the index row only. Its fields are added one by one with
    /// [`add_meta_index_field`](Self::add_meta_index_field).
    pub async fn add_meta_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        index: &MetaIndex,
    ) -> crate::Result<()> {
        let insert = Insert::single_into(self.table(IndexTable::KIND))
            .value(IndexTable::DATABASE, database.name.as_str())
            .value(IndexTable::COLLECTION, collection.name.as_str())
            .value(IndexTable::NAME, index.name.as_str())
            .value(IndexTable::UNIQUE, index.unique);

        self.insert(conn, insert.into()).await
    }

    pub async fn add_meta_index_field(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        index: &MetaIndex,
        field: &MetaIndexField,
    ) -> crate::Result<()> {
        field.table_ref.validate()?;

        let insert = Insert::single_into(self.table(IndexFieldTable::KIND))
            .value(IndexFieldTable::DATABASE, database.name.as_str())
            .value(IndexFieldTable::COLLECTION, collection.name.as_str())
            .value(IndexFieldTable::INDEX, index.name.as_str())
            .value(IndexFieldTable::POSITION, field.position)
            .value(IndexFieldTable::TABLE_REF, self.dialect().table_ref_value(&field.table_ref))
            .value(IndexFieldTable::NAME, field.name.as_str())
            .value(IndexFieldTable::ORDERING, field.ordering.as_str());

        self.insert(conn, insert.into()).await
    }

    /// Inserts the doc part index row only. Its columns are added with
    /// [`add_meta_field_index`](Self::add_meta_field_index).
    pub async fn add_meta_doc_part_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        index: &MetaDocPartIndex,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let insert = Insert::single_into(self.table(DocPartIndexTable::KIND))
            .value(DocPartIndexTable::DATABASE, database.name.as_str())
            .value(DocPartIndexTable::IDENTIFIER, index.identifier.as_str())
            .value(DocPartIndexTable::COLLECTION, collection.name.as_str())
            .value(DocPartIndexTable::TABLE_REF, self.dialect().table_ref_value(&doc_part.table_ref))
            .value(DocPartIndexTable::UNIQUE, index.unique);

        self.insert(conn, insert.into()).await
    }

    pub async fn add_meta_field_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        index: &MetaDocPartIndex,
        field: &MetaFieldIndex,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let insert = Insert::single_into(self.table(FieldIndexTable::KIND))
            .value(FieldIndexTable::DATABASE, database.name.as_str())
            .value(FieldIndexTable::IDENTIFIER, index.identifier.as_str())
            .value(FieldIndexTable::POSITION, field.position)
            .value(FieldIndexTable::COLLECTION, collection.name.as_str())
            .value(FieldIndexTable::TABLE_REF, self.dialect().table_ref_value(&doc_part.table_ref))
            .value(FieldIndexTable::NAME, field.name.as_str())
            .value(FieldIndexTable::TYPE, field.field_type.as_str())
            .value(FieldIndexTable::ORDERING, field.ordering.as_str());

        self.insert(conn, insert.into()).await
    }

    /// Deletes the database row. Its collections must be gone already.
    pub async fn delete_meta_database(&self, conn: &dyn Queryable, database: &MetaDatabase) -> crate::Result<()> {
        let delete = Delete::from_table(self.table(DatabaseTable::KIND))
            .so_that(Column::from(DatabaseTable::NAME).equals(database.name.as_str()));

        self.delete(conn, delete).await?;

        Ok(())
    }

    pub async fn delete_meta_collection(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
    ) -> crate::Result<()> {
        let delete = Delete::from_table(self.table(CollectionTable::KIND)).so_that(ConditionTree::all([
            Column::from(CollectionTable::DATABASE).equals(database.name.as_str()),
            Column::from(CollectionTable::NAME).equals(collection.name.as_str()),
        ]));

        self.delete(conn, delete).await?;

        Ok(())
    }

    pub async fn delete_meta_doc_part(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let delete = Delete::from_table(self.table(DocPartTable::KIND)).so_that(ConditionTree::all([
            Column::from(DocPartTable::DATABASE).equals(database.name.as_str()),
            Column::from(DocPartTable::COLLECTION).equals(collection.name.as_str()),
            self.table_ref_eq(DocPartTable::TABLE_REF, &doc_part.table_ref),
        ]));

        self.delete(conn, delete).await?;

        Ok(())
    }

    pub async fn delete_meta_field(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        field: &MetaField,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let delete = Delete::from_table(self.table(FieldTable::KIND)).so_that(ConditionTree::all([
            Column::from(FieldTable::DATABASE).equals(database.name.as_str()),
            Column::from(FieldTable::COLLECTION).equals(collection.name.as_str()),
            self.table_ref_eq(FieldTable::TABLE_REF, &doc_part.table_ref),
            Column::from(FieldTable::NAME).equals(field.name.as_str()),
            Column::from(FieldTable::TYPE).equals(field.field_type.as_str()),
        ]));

        self.delete(conn, delete).await?;

        Ok(())
    }

    pub async fn delete_meta_scalar(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        scalar: &MetaScalar,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let delete = Delete::from_table(self.table(ScalarTable::KIND)).so_that(ConditionTree::all([
            Column::from(ScalarTable::DATABASE).equals(database.name.as_str()),
            Column::from(ScalarTable::COLLECTION).equals(collection.name.as_str()),
            self.table_ref_eq(ScalarTable::TABLE_REF, &doc_part.table_ref),
            Column::from(ScalarTable::TYPE).equals(scalar.field_type.as_str()),
        ]));

        self.delete(conn, delete).await?;

        Ok(())
    }

    /// Deletes the index together with its fields, the fields first.
    pub async fn delete_meta_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        index: &MetaIndex,
    ) -> crate::Result<()> {
        let fields = Delete::from_table(self.table(IndexFieldTable::KIND)).so_that(ConditionTree::all([
            Column::from(IndexFieldTable::DATABASE).equals(database.name.as_str()),
            Column::from(IndexFieldTable::COLLECTION).equals(collection.name.as_str()),
            Column::from(IndexFieldTable::INDEX).equals(index.name.as_str()),
        ]));

        self.delete(conn, fields).await?;

        let index_row = Delete::from_table(self.table(IndexTable::KIND)).so_that(ConditionTree::all([
            Column::from(IndexTable::DATABASE).equals(database.name.as_str()),
            Column::from(IndexTable::COLLECTION).equals(collection.name.as_str()),
            Column::from(IndexTable::NAME).equals(index.name.as_str()),
        ]));

        self.delete(conn, index_row).await?;

        Ok(())
    }

    /// Deletes the doc part index together with its columns, the columns
    /// first.
    pub async fn delete_meta_doc_part_index(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        index: &MetaDocPartIndex,
    ) -> crate::Result<()> {
        doc_part.table_ref.validate()?;

        let fields = Delete::from_table(self.table(FieldIndexTable::KIND)).so_that(ConditionTree::all([
            Column::from(FieldIndexTable::DATABASE).equals(database.name.as_str()),
            Column::from(FieldIndexTable::IDENTIFIER).equals(index.identifier.as_str()),
        ]));

        self.delete(conn, fields).await?;

        let index_row = Delete::from_table(self.table(DocPartIndexTable::KIND)).so_that(ConditionTree::all([
            Column::from(DocPartIndexTable::DATABASE).equals(database.name.as_str()),
            Column::from(DocPartIndexTable::IDENTIFIER).equals(index.identifier.as_str()),
            Column::from(DocPartIndexTable::COLLECTION).equals(collection.name.as_str()),
            self.table_ref_eq(DocPartIndexTable::TABLE_REF, &doc_part.table_ref),
        ]));

        self.delete(conn, index_row).await?;

        Ok(())
    }

    /// Reserves `count` consecutive row ids of the document part, returning
    /// the first of them. The counter starts at zero and only grows.
    ///
    /// The counter row stays locked by the caller's transaction until it
    /// ends, so concurrent writers to the same part are serialized while
    /// other parts are unaffected.
    pub async fn allocate_rids(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        count: i32,
    ) -> crate::Result<i32> {
        if count <= 0 {
            let message = format!("RID count must be positive, got {count}");
            return Err(Error::builder(ErrorKind::invalid_argument(message)).build());
        }

        doc_part.table_ref.validate()?;

        let first = match self.dialect().rid_allocation() {
            RidAllocation::UpdateReturning => self.allocate_returning(conn, database, collection, doc_part, count).await?,
            RidAllocation::LockingRead => self.allocate_locking(conn, database, collection, doc_part, count).await?,
        };

        tracing::trace!(
            target: "doc_catalog::rid",
            database = database.name.as_str(),
            collection = collection.name.as_str(),
            table_ref = %doc_part.table_ref,
            first,
            count,
            "allocated rids"
        );

        Ok(first)
    }

    fn doc_part_key<'a>(
        &self,
        database: &'a MetaDatabase,
        collection: &'a MetaCollection,
        doc_part: &MetaDocPart,
    ) -> ConditionTree<'a> {
        ConditionTree::all([
            Column::from(DocPartTable::DATABASE).equals(database.name.as_str()),
            Column::from(DocPartTable::COLLECTION).equals(collection.name.as_str()),
            self.table_ref_eq(DocPartTable::TABLE_REF, &doc_part.table_ref),
        ])
    }

    async fn allocate_returning(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        count: i32,
    ) -> crate::Result<i32> {
        let key = self
            .doc_part_key(database, collection, doc_part)
            .and(Column::from(DocPartTable::LAST_RID).less_than_or_equals(i32::MAX - count));

        let update = Update::table(self.table(DocPartTable::KIND))
            .set(DocPartTable::LAST_RID, SqlOp::add(Column::from(DocPartTable::LAST_RID), count))
            .so_that(key)
            .returning([DocPartTable::LAST_RID]);

        let rows = self
            .helper
            .query(conn, update.into(), ExecutionContext::MetaUpdate)
            .await?;

        let Some(row) = rows.first() else {
            return Err(self.unallocated(conn, database, collection, doc_part).await);
        };

        let last_rid = last_rid_of(row.try_get(DocPartTable::LAST_RID)?)?;

        Ok(last_rid - count)
    }

    /// Tells why a guarded counter update matched no row: the part is either
    /// missing or its counter cannot grow by the requested count.
    async fn unallocated(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
    ) -> Error {
        let select = Select::from_table(self.table(DocPartTable::KIND))
            .column(DocPartTable::LAST_RID)
            .so_that(self.doc_part_key(database, collection, doc_part));

        match self.helper.query(conn, select.into(), ExecutionContext::MetaUpdate).await {
            Ok(rows) if rows.is_empty() => doc_part_not_found(database, collection, doc_part),
            Ok(_) => rid_overflow(doc_part),
            Err(err) => err,
        }
    }

    async fn allocate_locking(
        &self,
        conn: &dyn Queryable,
        database: &MetaDatabase,
        collection: &MetaCollection,
        doc_part: &MetaDocPart,
        count: i32,
    ) -> crate::Result<i32> {
        let select = Select::from_table(self.table(DocPartTable::KIND))
            .column(DocPartTable::LAST_RID)
            .so_that(self.doc_part_key(database, collection, doc_part))
            .for_update();

        let rows = self
            .helper
            .query(conn, select.into(), ExecutionContext::MetaUpdate)
            .await?;

        let Some(row) = rows.first() else {
            return Err(doc_part_not_found(database, collection, doc_part));
        };

        let last_rid = last_rid_of(row.try_get(DocPartTable::LAST_RID)?)?;
        let next = last_rid.checked_add(count).ok_or_else(|| rid_overflow(doc_part))?;

        let key = self
            .doc_part_key(database, collection, doc_part)
            .and(Column::from(DocPartTable::LAST_RID).equals(last_rid));

        let update = Update::table(self.table(DocPartTable::KIND))
            .set(DocPartTable::LAST_RID, next)
            .so_that(key);

        let updated = self
            .helper
            .execute_update(conn, update.into(), ExecutionContext::MetaUpdate)
            .await?;

        if updated == 0 {
            let kind = ErrorKind::AllocationRace {
                table_ref: doc_part.table_ref.to_string(),
                expected: last_rid,
            };

            tracing::error!(target: "doc_catalog::rid", table_ref = %doc_part.table_ref, last_rid, "rid counter changed under a row lock");

            let mut builder = Error::builder(kind);
            builder.set_context(ExecutionContext::MetaUpdate);

            return Err(builder.build());
        }

        Ok(last_rid)
    }
}

fn last_rid_of(value: &crate::ast::Value<'_>) -> crate::Result<i32> {
    let last_rid = value
        .as_i64()
        .ok_or_else(|| Error::builder(ErrorKind::ResultTypeMismatch("integer")).build())?;

    Ok(i32::try_from(last_rid)?)
}

fn rid_overflow(doc_part: &MetaDocPart) -> Error {
    let message = format!("RID counter of {} would overflow", doc_part.table_ref);
    Error::builder(ErrorKind::invalid_argument(message)).build()
}

fn doc_part_not_found(database: &MetaDatabase, collection: &MetaCollection, doc_part: &MetaDocPart) -> Error {
    let mut builder = Error::builder(ErrorKind::DocPartNotFound {
        database: database.name.clone(),
        collection: collection.name.clone(),
        table_ref: doc_part.table_ref.to_string(),
    });

    builder.set_context(ExecutionContext::MetaUpdate);
    builder.build()
}
