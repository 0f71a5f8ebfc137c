use serde::Serialize;

use crate::db::repositories::recipe::Recipe;
use crate::db::repositories::user::User;
use crate::models::recipe::RecipeResponse;

/// Wire shape for a user: an explicit allow-list of fields, constructed at
/// the boundary. The password hash cannot appear here; the input type does
/// not carry it.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub recipes: Vec<RecipeResponse>,
}

impl UserResponse {
    #[must_use]
    pub fn new(user: User, recipes: Vec<Recipe>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            recipes: recipes.into_iter().map(RecipeResponse::from).collect(),
        }
    }
}
