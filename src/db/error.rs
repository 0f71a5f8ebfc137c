use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures surfaced by the data layer.
///
/// Constraint violations are classified from the driver error so callers can
/// translate them to user-facing responses without string matching. Nothing
/// here is retried internally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field} must be at least {min} characters long")]
    Validation { field: &'static str, min: usize },

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("not-null constraint violated: {0}")]
    NotNullViolation(String),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::UniqueViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation(msg),
            _ => {
                // SQLite reports missing required columns as a plain
                // constraint error without a dedicated code in SqlErr, and
                // ON DELETE RESTRICT violations with extended code 1811
                // (SQLITE_CONSTRAINT_TRIGGER), which SqlErr also misses.
                let msg = err.to_string();
                if msg.contains("FOREIGN KEY constraint failed") {
                    Self::ForeignKeyViolation(msg)
                } else if msg.contains("NOT NULL constraint failed") {
                    Self::NotNullViolation(msg)
                } else {
                    Self::Database(err)
                }
            }
        }
    }
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
