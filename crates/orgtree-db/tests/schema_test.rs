//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct CounterRow {
    value: i64,
}

async fn counter_value(db: &Surreal<surrealdb::engine::local::Db>) -> i64 {
    let mut result = db
        .query("SELECT * FROM id_counter:organization")
        .await
        .unwrap();
    let rows: Vec<CounterRow> = result.take(0).unwrap();
    rows.first().map(|r| r.value).unwrap()
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    orgtree_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(
        info_str.contains("organization"),
        "missing organization table"
    );
    assert!(info_str.contains("id_counter"), "missing id_counter table");
    assert!(info_str.contains("_migration"), "missing _migration table");

    assert_eq!(counter_value(&db).await, 0);
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    orgtree_db::run_migrations(&db).await.unwrap();
    db.query("UPDATE id_counter:organization SET value += 3")
        .await
        .unwrap()
        .check()
        .unwrap();
    orgtree_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");

    // The seed must not run again and reset handed-out ids.
    assert_eq!(counter_value(&db).await, 3);
}

#[tokio::test]
async fn lifecycle_timestamps_default_to_none() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    orgtree_db::run_migrations(&db).await.unwrap();

    db.query("CREATE organization:1 SET name = 'Root'")
        .await
        .unwrap()
        .check()
        .unwrap();

    let mut result = db
        .query(
            "SELECT * FROM organization \
             WHERE parent_id IS NONE AND deleted_at IS NONE AND disabled_at IS NONE",
        )
        .await
        .unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn schema_rejects_non_integer_parent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    orgtree_db::run_migrations(&db).await.unwrap();

    let result = db
        .query("CREATE organization:1 SET name = 'Child', parent_id = 'not-a-number'")
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "string parent_id should be rejected");
}
