use serde::Serialize;

use crate::db::repositories::recipe::Recipe;

/// Wire shape for a recipe. The owner id is intentionally absent: clients
/// reach recipes through their owner.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
        }
    }
}
