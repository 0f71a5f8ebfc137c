use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::db::StoreError;
use crate::db::repositories::user::User;
use crate::entities::{prelude::*, recipes};
use crate::validation::validate_instructions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i32,
}

impl From<recipes::Model> for Recipe {
    fn from(model: recipes::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            instructions: model.instructions,
            minutes_to_complete: model.minutes_to_complete,
            user_id: model.user_id,
        }
    }
}

/// Input for recipe creation. `user_id` is required: a recipe cannot be
/// persisted without an owner.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i32,
}

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a recipe. Instructions are validated before the active model
    /// is built; a dangling `user_id` is rejected by the foreign key.
    pub async fn create(&self, new: NewRecipe) -> Result<Recipe, StoreError> {
        validate_instructions(&new.instructions)?;

        let active = recipes::ActiveModel {
            title: Set(new.title),
            instructions: Set(new.instructions),
            minutes_to_complete: Set(new.minutes_to_complete),
            user_id: Set(new.user_id),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await.map_err(StoreError::from)?;
        info!(
            "Created recipe {} (id {}) for user {}",
            model.title, model.id, model.user_id
        );

        Ok(Recipe::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        let recipe = Recipes::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        Ok(recipe.map(Recipe::from))
    }

    /// All recipes owned by a user. A fresh query each call: this is the
    /// live back-reference, not a snapshot held on the user.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Recipe>, StoreError> {
        let rows = Recipes::find()
            .filter(recipes::Column::UserId.eq(user_id))
            .order_by_asc(recipes::Column::Id)
            .all(&self.conn)
            .await
            .map_err(StoreError::from)?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Owning user, resolved by primary key through the belongs-to relation.
    pub async fn owner(&self, recipe_id: i32) -> Result<Option<User>, StoreError> {
        let recipe = Recipes::find_by_id(recipe_id)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        let user = recipe
            .find_related(Users)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?;

        Ok(user.map(User::from))
    }

    /// Replace the instructions, re-validating on write. On rejection the
    /// stored value is untouched.
    pub async fn update_instructions(
        &self,
        id: i32,
        instructions: &str,
    ) -> Result<Recipe, StoreError> {
        validate_instructions(instructions)?;

        let recipe = Recipes::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::not_found("recipe", id))?;

        let mut active: recipes::ActiveModel = recipe.into();
        active.instructions = Set(instructions.to_string());

        let model = active.update(&self.conn).await.map_err(StoreError::from)?;
        Ok(Recipe::from(model))
    }

    /// Update title and/or completion time. `None` leaves a field unchanged.
    pub async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        minutes_to_complete: Option<i32>,
    ) -> Result<Recipe, StoreError> {
        let recipe = Recipes::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::not_found("recipe", id))?;

        let mut active: recipes::ActiveModel = recipe.into();
        if let Some(title) = title {
            active.title = Set(title.to_string());
        }
        if let Some(minutes) = minutes_to_complete {
            active.minutes_to_complete = Set(Some(minutes));
        }

        let model = active.update(&self.conn).await.map_err(StoreError::from)?;
        Ok(Recipe::from(model))
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let res = Recipes::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(StoreError::from)?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("recipe", id));
        }

        info!("Deleted recipe {}", id);
        Ok(())
    }
}
