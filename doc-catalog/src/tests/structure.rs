use super::test_api::TestApi;
use crate::{
    ast::Value,
    connector::Queryable,
    error::ErrorKind,
    meta::{FieldIndexOrdering, FieldType, MetaDocPart, MetaDocPartIndex, MetaField, MetaScalar, TableRef},
    sql_helper::ExecutionContext,
};
use pretty_assertions::assert_eq;

async fn index_names(api: &TestApi, schema: &str) -> Vec<String> {
    let sql = format!(r#"SELECT name FROM "{schema}".sqlite_master WHERE type = 'index' AND sql IS NOT NULL ORDER BY name"#);

    api.conn
        .query_raw(&sql, &[])
        .await
        .unwrap()
        .into_iter()
        .filter_map(|row| row.at(0).and_then(|v| v.as_str()).map(ToOwned::to_owned))
        .collect()
}

#[tokio::test]
async fn doc_part_tables_get_typed_columns() {
    let api = TestApi::new().await;
    let (database, _, root) = api.root_part().await;
    let tags = MetaDocPart::new(TableRef::root().child("tags"), "col1_tags");

    api.structure.create_schema(api.conn(), &database).await.unwrap();
    api.structure
        .create_doc_part_table(api.conn(), &database, &root)
        .await
        .unwrap();
    api.structure
        .create_doc_part_table(api.conn(), &database, &tags)
        .await
        .unwrap();

    let field = MetaField::new("name", "name_s", FieldType::String);
    api.structure
        .add_field_column(api.conn(), &database, &root, &field)
        .await
        .unwrap();

    let scalar = MetaScalar::new("v_i", FieldType::Integer);
    api.structure
        .add_scalar_column(api.conn(), &database, &tags, &scalar)
        .await
        .unwrap();

    api.conn
        .execute_raw(
            r#"INSERT INTO "s_db1"."col1" ("did", "name_s") VALUES (?, ?)"#,
            &[Value::Int32(1), Value::text("ada")],
        )
        .await
        .unwrap();

    api.conn
        .execute_raw(
            r#"INSERT INTO "s_db1"."col1_tags" ("did", "rid", "pid", "seq", "v_i") VALUES (?, ?, ?, ?, ?)"#,
            &[Value::Int32(1), Value::Int32(0), Value::Int32(1), Value::Int32(0), Value::Int32(7)],
        )
        .await
        .unwrap();

    let err = api
        .conn
        .execute_raw(r#"INSERT INTO "s_db1"."col1_tags" ("did", "rid") VALUES (?, ?)"#, &[Value::Int32(1), Value::Int32(1)])
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::NullConstraintViolation { .. }), "{err}");
}

#[tokio::test]
async fn indexes_are_created_and_dropped() {
    let api = TestApi::new().await;
    let (database, _, root) = api.root_part().await;

    api.structure.create_schema(api.conn(), &database).await.unwrap();
    api.structure
        .create_doc_part_table(api.conn(), &database, &root)
        .await
        .unwrap();
    let fields = [
        MetaField::new("name", "name_s", FieldType::String),
        MetaField::new("name", "name_i", FieldType::Integer),
    ];

    for field in &fields {
        api.structure
            .add_field_column(api.conn(), &database, &root, field)
            .await
            .unwrap();
    }

    let index = MetaDocPartIndex::new("col1_name_idx", true).with_field("name", FieldType::String, FieldIndexOrdering::Desc);

    api.structure
        .create_index(api.conn(), &database, &root, &fields, &index)
        .await
        .unwrap();

    assert_eq!(vec!["col1_name_idx".to_owned()], index_names(&api, "s_db1").await);

    let insert = r#"INSERT INTO "s_db1"."col1" ("did", "name_s") VALUES (?, ?)"#;
    api.conn
        .execute_raw(insert, &[Value::Int32(1), Value::text("ada")])
        .await
        .unwrap();

    let err = api
        .conn
        .execute_raw(insert, &[Value::Int32(2), Value::text("ada")])
        .await
        .unwrap_err();
    assert!(err.is_unique_violation(), "{err}");

    api.structure.drop_index(api.conn(), &database, &index).await.unwrap();

    assert!(index_names(&api, "s_db1").await.is_empty());
}

#[tokio::test]
async fn index_entries_need_a_field_of_their_type() {
    let api = TestApi::new().await;
    let (database, _, root) = api.root_part().await;

    api.structure.create_schema(api.conn(), &database).await.unwrap();
    api.structure
        .create_doc_part_table(api.conn(), &database, &root)
        .await
        .unwrap();

    let fields = [MetaField::new("name", "name_s", FieldType::String)];
    api.structure
        .add_field_column(api.conn(), &database, &root, &fields[0])
        .await
        .unwrap();

    let index = MetaDocPartIndex::new("col1_name_idx", false).with_field("name", FieldType::Integer, FieldIndexOrdering::Asc);

    let err = api
        .structure
        .create_index(api.conn(), &database, &root, &fields, &index)
        .await
        .unwrap_err();

    assert!(err.is_build_error(), "{err}");
    assert!(index_names(&api, "s_db1").await.is_empty());
}

#[tokio::test]
async fn dropped_schemas_are_gone() {
    let api = TestApi::new().await;
    let (database, _, root) = api.root_part().await;

    api.structure.create_schema(api.conn(), &database).await.unwrap();
    api.structure
        .create_doc_part_table(api.conn(), &database, &root)
        .await
        .unwrap();
    api.structure.drop_schema(api.conn(), &database).await.unwrap();

    let err = api.conn.query_raw(r#"SELECT * FROM "s_db1"."col1""#, &[]).await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TableDoesNotExist { .. }), "{err}");

    let err = api.structure.drop_schema(api.conn(), &database).await.unwrap_err();
    assert_eq!(Some(ExecutionContext::DropSchema), err.context());
}

#[tokio::test]
async fn tables_need_their_schema() {
    let api = TestApi::new().await;
    let (database, _, root) = api.root_part().await;

    let err = api
        .structure
        .create_doc_part_table(api.conn(), &database, &root)
        .await
        .unwrap_err();

    assert_eq!(Some(ExecutionContext::CreateTable), err.context());
    assert!(err.is_execution_error());
}
