pub use super::recipes::Entity as Recipes;
pub use super::users::Entity as Users;
