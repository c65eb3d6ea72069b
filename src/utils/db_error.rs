//! Translation of SQLx errors into [`StorageError`].

use crate::domain::repositories::StorageError;

/// Maps a SQLx error to the record store taxonomy.
///
/// Unique violations keep the constraint name so callers can tell an alias
/// collision from a duplicate original URL.
pub fn map_sqlx_error(e: sqlx::Error) -> StorageError {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        return StorageError::Conflict {
            constraint: db_err.constraint().map(str::to_string),
        };
    }

    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StorageError::Unavailable(e.to_string()),
        other => StorageError::Database(other.to_string()),
    }
}
