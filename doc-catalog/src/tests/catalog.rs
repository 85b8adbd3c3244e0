use super::test_api::TestApi;
use crate::{
    error::ErrorKind,
    meta::{
        FieldIndexOrdering, FieldType, MetaCollection, MetaDocPart, MetaDocPartIndex, MetaField, MetaIndex,
        MetaScalar, TableRef,
    },
    read::StoredDocPart,
    sql_helper::ExecutionContext,
    tables::MetaTableKind,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn the_catalog_starts_empty() {
    let api = TestApi::new().await;

    for kind in MetaTableKind::ALL {
        assert_eq!(0, api.count(kind).await, "{}", kind.table_name());
    }

    assert!(api.reader.read_databases(api.conn()).await.unwrap().is_empty());
}

#[tokio::test]
async fn databases_and_collections_read_back() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;

    let other = MetaCollection::new("another", "c_another");
    api.writer
        .add_meta_collection(api.conn(), &database, &other)
        .await
        .unwrap();

    assert_eq!(vec![database.clone()], api.reader.read_databases(api.conn()).await.unwrap());
    assert_eq!(
        vec![other, collection],
        api.reader.read_collections(api.conn(), &database).await.unwrap()
    );
}

#[tokio::test]
async fn doc_parts_come_back_parents_first_with_their_counters() {
    let api = TestApi::new().await;
    let (database, collection, root) = api.root_part().await;

    let tags = MetaDocPart::new(TableRef::root().child("tags"), "a_col1_tags");
    api.writer
        .add_meta_doc_part(api.conn(), &database, &collection, &tags)
        .await
        .unwrap();

    let doc_parts = api.reader.read_doc_parts(api.conn(), &database, &collection).await.unwrap();

    assert_eq!(
        vec![
            StoredDocPart {
                doc_part: root,
                last_rid: 0
            },
            StoredDocPart {
                doc_part: tags,
                last_rid: 0
            },
        ],
        doc_parts
    );
}

#[tokio::test]
async fn a_field_is_added_and_deleted() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;
    let field = MetaField::new("name", "name_s", FieldType::String);

    api.writer
        .add_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap();

    assert_eq!(1, api.count(MetaTableKind::Field).await);
    assert_eq!(
        vec![field.clone()],
        api.reader
            .read_fields(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );

    api.writer
        .delete_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap();

    assert_eq!(0, api.count(MetaTableKind::Field).await);
}

#[tokio::test]
async fn one_name_may_have_a_field_per_type() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    let as_string = MetaField::new("age", "age_s", FieldType::String);
    let as_integer = MetaField::new("age", "age_i", FieldType::Integer);

    for field in [&as_string, &as_integer] {
        api.writer
            .add_meta_field(api.conn(), &database, &collection, &doc_part, field)
            .await
            .unwrap();
    }

    api.writer
        .delete_meta_field(api.conn(), &database, &collection, &doc_part, &as_string)
        .await
        .unwrap();

    assert_eq!(
        vec![as_integer],
        api.reader
            .read_fields(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn duplicate_rows_are_unique_violations() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;
    let field = MetaField::new("name", "name_s", FieldType::String);

    api.writer
        .add_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap();

    let err = api
        .writer
        .add_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap_err();

    assert!(err.is_unique_violation(), "{err}");
    assert_eq!(Some(ExecutionContext::MetaInsert), err.context());

    let err = api.writer.add_meta_database(api.conn(), &database).await.unwrap_err();
    assert!(err.is_unique_violation(), "{err}");
}

#[tokio::test]
async fn children_need_a_registered_parent() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;
    let unknown = MetaDocPart::new(TableRef::root().child("missing"), "col1_missing");
    let field = MetaField::new("x", "x_i", FieldType::Integer);

    let err = api
        .writer
        .add_meta_field(api.conn(), &database, &collection, &unknown, &field)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::ForeignKeyConstraintViolation { .. }), "{err}");
}

#[tokio::test]
async fn scalars_are_added_and_deleted() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;
    let tags = MetaDocPart::new(TableRef::root().child("tags"), "col1_tags");

    api.writer
        .add_meta_doc_part(api.conn(), &database, &collection, &tags)
        .await
        .unwrap();

    let strings = MetaScalar::new("v_s", FieldType::String);
    let doubles = MetaScalar::new("v_d", FieldType::Double);

    for scalar in [&strings, &doubles] {
        api.writer
            .add_meta_scalar(api.conn(), &database, &collection, &tags, scalar)
            .await
            .unwrap();
    }

    assert_eq!(
        vec![doubles.clone(), strings.clone()],
        api.reader
            .read_scalars(api.conn(), &database, &collection, &tags)
            .await
            .unwrap()
    );

    api.writer
        .delete_meta_scalar(api.conn(), &database, &collection, &tags, &doubles)
        .await
        .unwrap();

    assert_eq!(1, api.count(MetaTableKind::Scalar).await);
}

#[tokio::test]
async fn indexes_are_deleted_with_their_fields() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;

    let index = MetaIndex::new("by_name_and_tag", true)
        .with_field(TableRef::root(), "name", FieldIndexOrdering::Asc)
        .with_field(TableRef::root().child("tags"), "label", FieldIndexOrdering::Desc);

    api.writer
        .add_meta_index(api.conn(), &database, &collection, &index)
        .await
        .unwrap();

    for field in index.fields.iter().rev() {
        api.writer
            .add_meta_index_field(api.conn(), &database, &collection, &index, field)
            .await
            .unwrap();
    }

    assert_eq!(
        vec![index.clone()],
        api.reader.read_indexes(api.conn(), &database, &collection).await.unwrap()
    );

    api.writer
        .delete_meta_index(api.conn(), &database, &collection, &index)
        .await
        .unwrap();

    assert_eq!(0, api.count(MetaTableKind::IndexField).await);
    assert_eq!(0, api.count(MetaTableKind::Index).await);
}

#[tokio::test]
async fn doc_part_indexes_are_deleted_with_their_columns() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    let index = MetaDocPartIndex::new("col1_idx_name", false)
        .with_field("name_s", FieldType::String, FieldIndexOrdering::Asc)
        .with_field("age_i", FieldType::Integer, FieldIndexOrdering::Desc);

    api.writer
        .add_meta_doc_part_index(api.conn(), &database, &collection, &doc_part, &index)
        .await
        .unwrap();

    for field in &index.fields {
        api.writer
            .add_meta_field_index(api.conn(), &database, &collection, &doc_part, &index, field)
            .await
            .unwrap();
    }

    assert_eq!(
        vec![index.clone()],
        api.reader
            .read_doc_part_indexes(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );

    api.writer
        .delete_meta_doc_part_index(api.conn(), &database, &collection, &doc_part, &index)
        .await
        .unwrap();

    assert_eq!(0, api.count(MetaTableKind::FieldIndex).await);
    assert_eq!(0, api.count(MetaTableKind::DocPartIndex).await);
}

#[tokio::test]
async fn paths_match_exactly() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;

    let a = MetaDocPart::new(TableRef::from_segments(["a"]), "col1_a");
    let ab = MetaDocPart::new(TableRef::from_segments(["a", "b"]), "col1_a_b");

    for doc_part in [&a, &ab] {
        api.writer
            .add_meta_doc_part(api.conn(), &database, &collection, doc_part)
            .await
            .unwrap();
    }

    let field = MetaField::new("x", "x_s", FieldType::String);
    api.writer
        .add_meta_field(api.conn(), &database, &collection, &ab, &field)
        .await
        .unwrap();

    let on_a = api.reader.read_fields(api.conn(), &database, &collection, &a).await.unwrap();
    assert!(on_a.is_empty());

    api.writer
        .delete_meta_field(api.conn(), &database, &collection, &a, &field)
        .await
        .unwrap();
    assert_eq!(1, api.count(MetaTableKind::Field).await);

    api.writer
        .delete_meta_field(api.conn(), &database, &collection, &ab, &field)
        .await
        .unwrap();
    api.writer
        .delete_meta_doc_part(api.conn(), &database, &collection, &ab)
        .await
        .unwrap();

    let remaining: Vec<_> = api
        .reader
        .read_doc_parts(api.conn(), &database, &collection)
        .await
        .unwrap()
        .into_iter()
        .map(|stored| stored.doc_part.table_ref)
        .collect();

    assert_eq!(vec![TableRef::root(), TableRef::from_segments(["a"])], remaining);
}

#[tokio::test]
async fn a_whole_collection_is_removed_children_first() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;
    let field = MetaField::new("name", "name_s", FieldType::String);

    api.writer
        .add_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap();

    let err = api
        .writer
        .delete_meta_collection(api.conn(), &database, &collection)
        .await
        .unwrap_err();
    assert_eq!(Some(ExecutionContext::MetaDelete), err.context());

    api.writer
        .delete_meta_field(api.conn(), &database, &collection, &doc_part, &field)
        .await
        .unwrap();
    api.writer
        .delete_meta_doc_part(api.conn(), &database, &collection, &doc_part)
        .await
        .unwrap();
    api.writer
        .delete_meta_collection(api.conn(), &database, &collection)
        .await
        .unwrap();
    api.writer.delete_meta_database(api.conn(), &database).await.unwrap();

    for kind in MetaTableKind::ALL {
        assert_eq!(0, api.count(kind).await, "{}", kind.table_name());
    }
}
