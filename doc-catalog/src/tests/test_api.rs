use crate::{
    connector::{Queryable, Sqlite},
    dialect::{self, Dialect},
    meta::{MetaCollection, MetaDatabase, MetaDocPart, TableRef},
    read::MetaDataReader,
    structure::StructureWriter,
    tables::{MetaTableKind, MetaTables},
    write::MetaDataWriter,
};
use std::sync::Arc;

/// An in-memory SQLite database with the catalog created in its default
/// schema.
pub(crate) struct TestApi {
    pub(crate) conn: Sqlite,
    pub(crate) tables: MetaTables,
    pub(crate) writer: MetaDataWriter,
    pub(crate) reader: MetaDataReader,
    pub(crate) structure: StructureWriter,
}

impl TestApi {
    pub(crate) async fn new() -> Self {
        Self::with_dialect(Arc::new(dialect::Sqlite::in_memory())).await
    }

    pub(crate) async fn with_dialect(dialect: Arc<dyn Dialect>) -> Self {
        let conn = Sqlite::new_in_memory().unwrap();
        let tables = MetaTables::default();
        let writer = MetaDataWriter::new(tables.clone(), dialect.clone());

        writer.create_catalog(&conn).await.unwrap();

        TestApi {
            conn,
            reader: MetaDataReader::new(tables.clone(), dialect.clone()),
            structure: StructureWriter::new(dialect),
            tables,
            writer,
        }
    }

    pub(crate) fn conn(&self) -> &dyn Queryable {
        &self.conn
    }

    /// Registers `db1.col1` with its root part, returning the three.
    pub(crate) async fn root_part(&self) -> (MetaDatabase, MetaCollection, MetaDocPart) {
        let (database, collection, doc_part) = fixture();

        self.writer.add_meta_database(self.conn(), &database).await.unwrap();
        self.writer
            .add_meta_collection(self.conn(), &database, &collection)
            .await
            .unwrap();
        self.writer
            .add_meta_doc_part(self.conn(), &database, &collection, &doc_part)
            .await
            .unwrap();

        (database, collection, doc_part)
    }

    pub(crate) async fn count(&self, kind: MetaTableKind) -> usize {
        let sql = format!(r#"SELECT * FROM "{}"."{}""#, self.tables.schema(), kind.table_name());
        self.conn.query_raw(&sql, &[]).await.unwrap().len()
    }
}

pub(crate) fn fixture() -> (MetaDatabase, MetaCollection, MetaDocPart) {
    (
        MetaDatabase::new("db1", "s_db1"),
        MetaCollection::new("col1", "c_col1"),
        MetaDocPart::new(TableRef::root(), "col1"),
    )
}
