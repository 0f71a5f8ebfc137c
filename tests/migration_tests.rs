//! Schema migration tests: reversibility of the owner-column step and the
//! all-or-nothing behavior when existing rows have no resolvable owner.

use sea_orm::ConnectionTrait;
use sea_orm_migration::MigratorTrait;

use potluck::config::SecurityConfig;
use potluck::db::{NewRecipe, Store, migrator::Migrator};

fn fast_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn migrated_store(name: &str) -> Store {
    let db_path = std::env::temp_dir().join(format!(
        "potluck-migration-test-{}-{}.db",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&db_path);

    Store::with_security(&format!("sqlite:{}", db_path.display()), fast_security())
        .await
        .expect("failed to open test store")
}

const OWNERLESS_INSERT: &str = "INSERT INTO recipes (title, instructions) VALUES \
    ('Toast', 'Put bread in the toaster, wait two minutes, butter generously.')";

#[tokio::test]
async fn fresh_database_has_all_migrations_applied() {
    let store = migrated_store("fresh").await;

    let applied = Migrator::get_applied_migrations(&store.conn).await.unwrap();
    let pending = Migrator::get_pending_migrations(&store.conn).await.unwrap();

    assert_eq!(applied.len(), 2);
    assert!(pending.is_empty());
}

#[tokio::test]
async fn downgrade_drops_owner_column_and_constraint() {
    let store = migrated_store("downgrade").await;

    // With the owner column in place, an ownerless insert is rejected.
    assert!(store.conn.execute_unprepared(OWNERLESS_INSERT).await.is_err());

    Migrator::down(&store.conn, Some(1)).await.unwrap();

    // Back to the pre-owner schema: ownerless rows are legal again.
    store.conn.execute_unprepared(OWNERLESS_INSERT).await.unwrap();
}

#[tokio::test]
async fn downgrade_then_upgrade_round_trips_on_clean_tables() {
    let store = migrated_store("round-trip").await;

    Migrator::down(&store.conn, Some(1)).await.unwrap();
    Migrator::up(&store.conn, None).await.unwrap();

    // Owner column and constraint are back.
    assert!(store.conn.execute_unprepared(OWNERLESS_INSERT).await.is_err());

    let user = store.create_user("alice", "pw", None, None).await.unwrap();
    store
        .create_recipe(NewRecipe {
            title: "Toast".to_string(),
            instructions: "Put bread in the toaster, wait two minutes, butter generously."
                .to_string(),
            minutes_to_complete: Some(5),
            user_id: user.id,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn upgrade_aborts_entirely_when_rows_have_no_owner() {
    let store = migrated_store("abort-on-orphans").await;

    Migrator::down(&store.conn, Some(1)).await.unwrap();
    store.conn.execute_unprepared(OWNERLESS_INSERT).await.unwrap();

    // The orphan row cannot satisfy the NOT NULL owner column; the whole
    // step must roll back rather than leave a half-migrated table.
    assert!(Migrator::up(&store.conn, None).await.is_err());

    // Old schema intact: ownerless inserts still work and no rebuild
    // leftovers are lying around.
    store.conn.execute_unprepared(OWNERLESS_INSERT).await.unwrap();
    assert!(
        store
            .conn
            .execute_unprepared("SELECT id FROM recipes_old")
            .await
            .is_err()
    );

    // After the orphans are resolved the upgrade goes through.
    store.conn.execute_unprepared("DELETE FROM recipes").await.unwrap();
    Migrator::up(&store.conn, None).await.unwrap();
    assert!(store.conn.execute_unprepared(OWNERLESS_INSERT).await.is_err());
}
