use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A unique constraint rejected the write.
    #[error("{0}")]
    Duplicate(String),

    #[error("capacity {capacity} is lower than the {active} active members")]
    CapacityBelowMembers { capacity: i32, active: i64 },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }

    /// Map a unique-constraint violation to `Duplicate`, keep anything else as `Db`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(format!("{what} already exists"))
            }
            _ => StoreError::Db(err),
        }
    }
}
