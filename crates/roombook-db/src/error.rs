use rusqlite::ErrorCode;
use thiserror::Error;

use roombook_engine::StoreError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("corrupt timestamp '{value}' in {column}")]
    CorruptTimestamp { column: &'static str, value: String },
}

impl DbError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
        )
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_constraint_violation() {
            StoreError::Constraint(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}
