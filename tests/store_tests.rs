//! Integration tests for the user/recipe store, run against a throwaway
//! SQLite database through the public `Store` API.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use potluck::config::SecurityConfig;
use potluck::db::{NewRecipe, Store, StoreError};
use potluck::entities::{prelude::Users, users};
use potluck::models::UserResponse;

fn fast_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn test_store(name: &str) -> Store {
    let db_path = std::env::temp_dir().join(format!(
        "potluck-store-test-{}-{}.db",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&db_path);

    Store::with_security(&format!("sqlite:{}", db_path.display()), fast_security())
        .await
        .expect("failed to open test store")
}

fn pasta_instructions() -> String {
    "Boil water for 10 minutes, add pasta, stir every two minutes.".to_string()
}

fn new_recipe(user_id: i32, title: &str) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        instructions: pasta_instructions(),
        minutes_to_complete: Some(15),
        user_id,
    }
}

#[tokio::test]
async fn create_and_fetch_user() {
    let store = test_store("create-fetch-user").await;

    let user = store
        .create_user("alice", "s3cret", Some("https://img.test/a.png"), Some("home cook"))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.bio.as_deref(), Some("home cook"));

    let by_id = store.get_user(user.id).await.unwrap().unwrap();
    let by_name = store.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_id, user);
    assert_eq!(by_name, user);

    assert!(store.get_user_by_username("bob").await.unwrap().is_none());
    store.ping().await.unwrap();
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let store = test_store("duplicate-username").await;

    store.create_user("alice", "one", None, None).await.unwrap();
    let err = store
        .create_user("alice", "two", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::UniqueViolation(_)), "{err:?}");
}

#[tokio::test]
async fn authenticate_matches_exact_plaintext_only() {
    let store = test_store("authenticate").await;
    store
        .create_user("alice", "correct horse", None, None)
        .await
        .unwrap();

    assert!(store.authenticate("alice", "correct horse").await.unwrap());
    assert!(!store.authenticate("alice", "wrong horse").await.unwrap());
    assert!(!store.authenticate("alice", "").await.unwrap());
    assert!(!store.authenticate("nobody", "correct horse").await.unwrap());

    // The stored hash itself must not pass as a password. The hash is not
    // reachable through the public surface, so dig it out of the raw table.
    let row = Users::find()
        .filter(users::Column::Username.eq("alice"))
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    assert!(row.password_hash.starts_with("$argon2id$"));
    assert!(!store.authenticate("alice", &row.password_hash).await.unwrap());
}

#[tokio::test]
async fn set_password_rotates_credential() {
    let store = test_store("set-password").await;
    store.create_user("alice", "old", None, None).await.unwrap();

    store.set_user_password("alice", "new").await.unwrap();

    assert!(!store.authenticate("alice", "old").await.unwrap());
    assert!(store.authenticate("alice", "new").await.unwrap());

    let err = store.set_user_password("nobody", "pw").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn short_instructions_rejected_on_create() {
    let store = test_store("short-instructions").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();

    let mut recipe = new_recipe(user.id, "Pasta");
    recipe.instructions = "Boil water.".to_string();
    let err = store.create_recipe(recipe).await.unwrap_err();
    assert!(
        matches!(err, StoreError::Validation { field: "instructions", min: 50 }),
        "{err:?}"
    );

    // Boundary: 49 characters fails, 50 passes.
    let mut recipe = new_recipe(user.id, "Pasta");
    recipe.instructions = "a".repeat(49);
    assert!(store.create_recipe(recipe).await.is_err());

    let mut recipe = new_recipe(user.id, "Pasta");
    recipe.instructions = "a".repeat(50);
    assert!(store.create_recipe(recipe).await.is_ok());
}

#[tokio::test]
async fn valid_instructions_read_back_exactly() {
    let store = test_store("instructions-roundtrip").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();

    let created = store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();
    let fetched = store.get_recipe(created.id).await.unwrap().unwrap();

    assert_eq!(fetched.instructions, pasta_instructions());
    assert_eq!(fetched.minutes_to_complete, Some(15));
}

#[tokio::test]
async fn rejected_update_leaves_previous_value_in_place() {
    let store = test_store("rejected-update").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();
    let recipe = store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();

    let err = store
        .update_recipe_instructions(recipe.id, "Too short.")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }), "{err:?}");

    let unchanged = store.get_recipe(recipe.id).await.unwrap().unwrap();
    assert_eq!(unchanged.instructions, pasta_instructions());

    let longer = "Boil water, salt it generously, cook the pasta until al dente.";
    let updated = store
        .update_recipe_instructions(recipe.id, longer)
        .await
        .unwrap();
    assert_eq!(updated.instructions, longer);
}

#[tokio::test]
async fn recipe_requires_existing_owner() {
    let store = test_store("dangling-owner").await;

    let err = store.create_recipe(new_recipe(9999, "Orphan")).await.unwrap_err();
    assert!(matches!(err, StoreError::ForeignKeyViolation(_)), "{err:?}");
}

#[tokio::test]
async fn deleting_owner_with_recipes_is_rejected() {
    let store = test_store("delete-owner").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();
    let recipe = store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();

    let err = store.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, StoreError::ForeignKeyViolation(_)), "{err:?}");

    // Once the recipes are gone the user can be removed.
    store.delete_recipe(recipe.id).await.unwrap();
    store.delete_user(user.id).await.unwrap();
    assert!(store.get_user(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn recipes_back_reference_is_a_live_view() {
    let store = test_store("live-view").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();

    assert!(store.recipes_for_user(user.id).await.unwrap().is_empty());

    let first = store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();
    store.create_recipe(new_recipe(user.id, "Soup")).await.unwrap();

    let recipes = store.recipes_for_user(user.id).await.unwrap();
    assert_eq!(recipes.len(), 2);
    assert!(recipes.iter().all(|r| r.user_id == user.id));

    store.delete_recipe(first.id).await.unwrap();
    let recipes = store.recipes_for_user(user.id).await.unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, "Soup");
}

#[tokio::test]
async fn recipe_owner_resolves_through_relation() {
    let store = test_store("owner-lookup").await;
    let alice = store.create_user("alice", "pw", None, None).await.unwrap();
    store.create_user("bob", "pw", None, None).await.unwrap();

    let recipe = store.create_recipe(new_recipe(alice.id, "Pasta")).await.unwrap();

    let owner = store.recipe_owner(recipe.id).await.unwrap().unwrap();
    assert_eq!(owner, alice);

    assert!(store.recipe_owner(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn update_recipe_title_and_minutes() {
    let store = test_store("update-recipe").await;
    let user = store.create_user("alice", "pw", None, None).await.unwrap();
    let recipe = store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();

    let updated = store
        .update_recipe(recipe.id, Some("Spaghetti"), Some(25))
        .await
        .unwrap();
    assert_eq!(updated.title, "Spaghetti");
    assert_eq!(updated.minutes_to_complete, Some(25));
    // Untouched field survives.
    assert_eq!(updated.instructions, pasta_instructions());

    let err = store.update_recipe(9999, Some("X"), None).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn update_user_profile_fields() {
    let store = test_store("update-profile").await;
    store.create_user("alice", "pw", None, None).await.unwrap();

    let updated = store
        .update_user_profile("alice", Some("https://img.test/new.png"), Some("baker"))
        .await
        .unwrap();
    assert_eq!(updated.image_url.as_deref(), Some("https://img.test/new.png"));
    assert_eq!(updated.bio.as_deref(), Some("baker"));
}

#[tokio::test]
async fn user_response_serializes_allow_listed_fields_only() {
    let store = test_store("serialization").await;
    let user = store
        .create_user("alice", "s3cret", Some("https://img.test/a.png"), Some("bio"))
        .await
        .unwrap();
    store.create_recipe(new_recipe(user.id, "Pasta")).await.unwrap();

    let response: UserResponse = store.user_response("alice").await.unwrap().unwrap();
    let value = serde_json::to_value(&response).unwrap();

    let mut user_keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    user_keys.sort_unstable();
    assert_eq!(user_keys, vec!["id", "recipes", "username"], "{value}");

    let recipe = &value["recipes"][0];
    let mut recipe_keys: Vec<&str> = recipe.as_object().unwrap().keys().map(String::as_str).collect();
    recipe_keys.sort_unstable();
    assert_eq!(
        recipe_keys,
        vec!["id", "instructions", "minutes_to_complete", "title"]
    );

    let raw = serde_json::to_string(&response).unwrap();
    assert!(!raw.contains("argon2"));
    assert!(!raw.contains("password"));
    assert!(!raw.contains("s3cret"));
}
