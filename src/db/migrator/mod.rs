use sea_orm_migration::prelude::*;

mod m20250401_create_users_and_recipes;
mod m20250403_add_recipe_owner;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_create_users_and_recipes::Migration),
            Box::new(m20250403_add_recipe_owner::Migration),
        ]
    }
}
