pub mod recipe;
pub mod user;

pub use recipe::RecipeResponse;
pub use user::UserResponse;
