use super::{interleaved::Interleaved, locking::LockingRead, test_api::TestApi};
use crate::{
    connector::Queryable,
    dialect,
    error::ErrorKind,
    meta::{MetaDocPart, TableRef},
    sql_helper::ExecutionContext,
    tables::MetaTableKind,
};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tracing_test::traced_test;

#[tokio::test]
async fn counters_start_at_zero_and_advance() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    let first = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 3)
        .await
        .unwrap();
    let second = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 2)
        .await
        .unwrap();

    assert_eq!((0, 3), (first, second));
    assert_eq!(
        5,
        api.reader
            .last_rid(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn locking_reads_allocate_the_same_ranges() {
    let api = TestApi::with_dialect(Arc::new(LockingRead(dialect::Sqlite::in_memory()))).await;
    let (database, collection, doc_part) = api.root_part().await;

    let mut firsts = Vec::new();

    for count in [3, 2, 1] {
        firsts.push(
            api.writer
                .allocate_rids(api.conn(), &database, &collection, &doc_part, count)
                .await
                .unwrap(),
        );
    }

    assert_eq!(vec![0, 3, 5], firsts);
}

#[tokio::test]
async fn parts_have_their_own_counters() {
    let api = TestApi::new().await;
    let (database, collection, root) = api.root_part().await;
    let tags = MetaDocPart::new(TableRef::root().child("tags"), "col1_tags");

    api.writer
        .add_meta_doc_part(api.conn(), &database, &collection, &tags)
        .await
        .unwrap();

    api.writer
        .allocate_rids(api.conn(), &database, &collection, &root, 10)
        .await
        .unwrap();

    let first = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &tags, 4)
        .await
        .unwrap();

    assert_eq!(0, first);
    assert_eq!(
        10,
        api.reader
            .last_rid(api.conn(), &database, &collection, &root)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn joined_allocations_hand_out_disjoint_ranges() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    let allocations = (1..=8).map(|count| {
        let (api, database, collection, doc_part) = (&api, &database, &collection, &doc_part);

        async move {
            let first = api
                .writer
                .allocate_rids(api.conn(), database, collection, doc_part, count)
                .await
                .unwrap();

            first..first + count
        }
    });

    let mut ranges = join_all(allocations).await;
    ranges.sort_by_key(|range| range.start);

    let mut next = 0;

    for range in ranges {
        assert_eq!(next, range.start);
        next = range.end;
    }

    assert_eq!(36, next);
}

#[tokio::test]
#[traced_test]
async fn a_counter_moved_between_read_and_update_is_a_race() {
    let api = TestApi::with_dialect(Arc::new(LockingRead(dialect::Sqlite::in_memory()))).await;
    let (database, collection, doc_part) = api.root_part().await;

    let other_writer = format!(
        r#"UPDATE "{}"."{}" SET "last_rid" = "last_rid" + 5"#,
        api.tables.schema(),
        MetaTableKind::DocPart.table_name()
    );
    let conn = Interleaved::new(api.conn(), other_writer);

    let err = api
        .writer
        .allocate_rids(&conn, &database, &collection, &doc_part, 3)
        .await
        .unwrap_err();

    assert!(err.is_allocation_race(), "{err}");
    assert_eq!(Some(ExecutionContext::MetaUpdate), err.context());
    assert!(logs_contain("rid counter changed under a row lock"));

    // The other writer's range stays, and the next allocation starts after it.
    let first = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 3)
        .await
        .unwrap();

    assert_eq!(5, first);
}

#[tokio::test]
async fn counters_never_pass_the_largest_rid() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    let near_the_end = format!(
        r#"UPDATE "{}"."{}" SET "last_rid" = {}"#,
        api.tables.schema(),
        MetaTableKind::DocPart.table_name(),
        i32::MAX - 4
    );
    api.conn.raw_cmd(&near_the_end).await.unwrap();

    let err = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 5)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)), "{err}");

    assert_eq!(
        i32::MAX - 4,
        api.reader
            .last_rid(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );

    let first = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 4)
        .await
        .unwrap();

    assert_eq!(i32::MAX - 4, first);
    assert_eq!(
        i32::MAX,
        api.reader
            .last_rid(api.conn(), &database, &collection, &doc_part)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn unknown_parts_have_no_counter() {
    let api = TestApi::new().await;
    let (database, collection, _) = api.root_part().await;
    let unknown = MetaDocPart::new(TableRef::root().child("nope"), "col1_nope");

    let err = api
        .writer
        .allocate_rids(api.conn(), &database, &collection, &unknown, 1)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::DocPartNotFound { .. }), "{err}");
    assert_eq!(Some(ExecutionContext::MetaUpdate), err.context());

    let err = api
        .reader
        .last_rid(api.conn(), &database, &collection, &unknown)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::DocPartNotFound { .. }), "{err}");
}

#[tokio::test]
#[traced_test]
async fn allocations_are_traced() {
    let api = TestApi::new().await;
    let (database, collection, doc_part) = api.root_part().await;

    api.writer
        .allocate_rids(api.conn(), &database, &collection, &doc_part, 2)
        .await
        .unwrap();

    assert!(logs_contain("allocated rids"));
}
