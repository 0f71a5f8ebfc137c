use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::UserResponse;

pub mod error;
pub mod migrator;
pub mod repositories;

pub use error::StoreError;
pub use repositories::recipe::{NewRecipe, Recipe};
pub use repositories::user::User;

/// Connection owner and facade over the user and recipe repositories.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    /// Connect and bring the schema up to date.
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, SecurityConfig::default(), 5, 1).await
    }

    pub async fn with_security(db_url: &str, security: SecurityConfig) -> Result<Self> {
        Self::with_pool_options(db_url, security, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        security: SecurityConfig,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let conn = Self::open_connection(db_url, max_connections, min_connections).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    /// Connect without touching the schema. The migrate subcommands use this
    /// so that `down` does not race an automatic `up`.
    pub async fn connect(db_url: &str, security: SecurityConfig) -> Result<Self> {
        let conn = Self::open_connection(db_url, 5, 1).await?;
        Ok(Self { conn, security })
    }

    async fn open_connection(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<DatabaseConnection> {
        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        Ok(Database::connect(opt).await?)
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.security.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    // ========== User Operations ==========

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        image_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, StoreError> {
        self.user_repo()
            .create(username, password, image_url, bio)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        self.user_repo().authenticate(username, password).await
    }

    pub async fn set_user_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        self.user_repo().set_password(username, new_password).await
    }

    pub async fn update_user_profile(
        &self,
        username: &str,
        image_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, StoreError> {
        self.user_repo()
            .update_profile(username, image_url, bio)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<(), StoreError> {
        self.user_repo().delete(id).await
    }

    // ========== Recipe Operations ==========

    pub async fn create_recipe(&self, new: NewRecipe) -> Result<Recipe, StoreError> {
        self.recipe_repo().create(new).await
    }

    pub async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        self.recipe_repo().get(id).await
    }

    pub async fn recipes_for_user(&self, user_id: i32) -> Result<Vec<Recipe>, StoreError> {
        self.recipe_repo().list_for_user(user_id).await
    }

    pub async fn recipe_owner(&self, recipe_id: i32) -> Result<Option<User>, StoreError> {
        self.recipe_repo().owner(recipe_id).await
    }

    pub async fn update_recipe_instructions(
        &self,
        id: i32,
        instructions: &str,
    ) -> Result<Recipe, StoreError> {
        self.recipe_repo().update_instructions(id, instructions).await
    }

    pub async fn update_recipe(
        &self,
        id: i32,
        title: Option<&str>,
        minutes_to_complete: Option<i32>,
    ) -> Result<Recipe, StoreError> {
        self.recipe_repo()
            .update(id, title, minutes_to_complete)
            .await
    }

    pub async fn delete_recipe(&self, id: i32) -> Result<(), StoreError> {
        self.recipe_repo().delete(id).await
    }

    // ========== Boundary DTOs ==========

    /// Assemble the wire shape for a user: the allow-listed fields plus the
    /// live set of owned recipes.
    pub async fn user_response(&self, username: &str) -> Result<Option<UserResponse>, StoreError> {
        let Some(user) = self.get_user_by_username(username).await? else {
            return Ok(None);
        };

        let recipes = self.recipes_for_user(user.id).await?;
        Ok(Some(UserResponse::new(user, recipes)))
    }
}
