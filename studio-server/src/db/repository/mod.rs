//! Repository Module
//!
//! CRUD and conditional-update primitives over the SQLite pool. One file per
//! table. Multi-step booking operations run inside a single transaction; the
//! primitives that participate take `&mut SqliteConnection` so the caller
//! decides the transaction scope, plain reads take the pool.

pub mod measurement;
pub mod member;
pub mod reservation;
pub mod session;
pub mod tenant;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
