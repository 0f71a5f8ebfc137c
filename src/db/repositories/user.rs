use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;
use tracing::info;

use crate::auth::Credential;
use crate::config::SecurityConfig;
use crate::db::StoreError;
use crate::entities::{prelude::*, users};

/// User data returned from the repository. The password hash stays behind
/// the storage boundary: it is not a field here and there is no accessor
/// for it anywhere on the public surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            image_url: model.image_url,
            bio: model.bio,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
    security: SecurityConfig,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: SecurityConfig) -> Self {
        Self { conn, security }
    }

    /// Create a user. The password is hashed before anything touches the
    /// database; the row is never written without a hash.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        image_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, StoreError> {
        let credential = self.derive_credential(password).await?;

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(credential.into_stored()),
            image_url: Set(image_url.map(ToString::to_string)),
            bio: Set(bio.map(ToString::to_string)),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await.map_err(StoreError::from)?;
        info!("Created user {} (id {})", model.username, model.id);

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        Ok(user.map(User::from))
    }

    /// Verify a password for a user. Side-effect free; unknown usernames
    /// verify as false. Runs under `spawn_blocking` because Argon2
    /// verification is CPU-intensive and would block the async runtime.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        let Some(user) = user else {
            return Ok(false);
        };

        let credential = Credential::from_stored(user.password_hash);
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || credential.verify(&password))
            .await
            .map_err(|e| StoreError::Credential(format!("verification task panicked: {e}")))?;

        Ok(is_valid)
    }

    /// Replace a user's password with a freshly derived hash.
    pub async fn set_password(&self, username: &str, new_password: &str) -> Result<(), StoreError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let credential = self.derive_credential(new_password).await?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(credential.into_stored());
        active.update(&self.conn).await.map_err(StoreError::from)?;

        info!("Updated password for user {}", username);
        Ok(())
    }

    pub async fn update_profile(
        &self,
        username: &str,
        image_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, StoreError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(url) = image_url {
            active.image_url = Set(Some(url.to_string()));
        }
        if let Some(bio) = bio {
            active.bio = Set(Some(bio.to_string()));
        }

        let model = active.update(&self.conn).await.map_err(StoreError::from)?;
        Ok(User::from(model))
    }

    /// Delete a user. Rejected by the foreign key while the user still owns
    /// recipes (restrict, no cascade declared).
    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let res = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(StoreError::from)?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("user", id));
        }

        info!("Deleted user {}", id);
        Ok(())
    }

    async fn derive_credential(&self, password: &str) -> Result<Credential, StoreError> {
        let password = password.to_string();
        let security = self.security.clone();

        // Argon2 derivation is CPU-intensive; keep it off the async runtime.
        task::spawn_blocking(move || Credential::derive(&password, &security))
            .await
            .map_err(|e| StoreError::Credential(format!("hashing task panicked: {e}")))?
            .map_err(|e| StoreError::Credential(e.to_string()))
    }
}
