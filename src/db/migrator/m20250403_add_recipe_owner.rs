use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::TransactionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot attach a foreign key with ALTER TABLE, so the table
        // is rebuilt. The whole rebuild runs in one transaction: recipe rows
        // with no resolvable owner fail the NOT NULL copy and roll the entire
        // step back, never leaving a column without its constraint.
        let txn = manager.get_connection().begin().await?;

        txn.execute_unprepared("ALTER TABLE recipes RENAME TO recipes_old")
            .await?;

        txn.execute_unprepared(
            r"
            CREATE TABLE recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                title TEXT NOT NULL,
                instructions TEXT NOT NULL,
                minutes_to_complete INTEGER,
                user_id INTEGER NOT NULL,
                CONSTRAINT fk_recipes_user_id_users
                    FOREIGN KEY (user_id) REFERENCES users (id)
                    ON DELETE RESTRICT ON UPDATE NO ACTION
            )
        ",
        )
        .await?;

        txn.execute_unprepared(
            r"
            INSERT INTO recipes (id, title, instructions, minutes_to_complete, user_id)
            SELECT id, title, instructions, minutes_to_complete, NULL
            FROM recipes_old
        ",
        )
        .await?;

        txn.execute_unprepared("DROP TABLE recipes_old").await?;

        txn.commit().await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Exact inverse: drop the constraint and the column together, via the
        // same rebuild pattern.
        let txn = manager.get_connection().begin().await?;

        txn.execute_unprepared("ALTER TABLE recipes RENAME TO recipes_old")
            .await?;

        txn.execute_unprepared(
            r"
            CREATE TABLE recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                title TEXT NOT NULL,
                instructions TEXT NOT NULL,
                minutes_to_complete INTEGER
            )
        ",
        )
        .await?;

        txn.execute_unprepared(
            r"
            INSERT INTO recipes (id, title, instructions, minutes_to_complete)
            SELECT id, title, instructions, minutes_to_complete
            FROM recipes_old
        ",
        )
        .await?;

        txn.execute_unprepared("DROP TABLE recipes_old").await?;

        txn.commit().await?;

        Ok(())
    }
}
