//! Classification of SQLx errors into repository errors.

use crate::domain::repositories::RepositoryError;

/// Unique index on `urls.original_url`.
pub const ORIGINAL_URL_CONSTRAINT: &str = "urls_original_url_key";

/// Unique index on `urls.sequence_id`.
pub const SEQUENCE_ID_CONSTRAINT: &str = "urls_sequence_id_key";

/// Which unique constraint a failed insert ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueViolation {
    OriginalUrl,
    SequenceId,
}

/// Maps a constraint name reported by PostgreSQL to the violated key.
pub fn unique_violation_for(constraint: Option<&str>) -> Option<UniqueViolation> {
    match constraint {
        Some(ORIGINAL_URL_CONSTRAINT) => Some(UniqueViolation::OriginalUrl),
        Some(SEQUENCE_ID_CONSTRAINT) => Some(UniqueViolation::SequenceId),
        _ => None,
    }
}

/// Returns the violated unique key if `e` is a unique violation on `urls`.
pub fn unique_violation(e: &sqlx::Error) -> Option<UniqueViolation> {
    let db_err = e.as_database_error()?;

    if !db_err.is_unique_violation() {
        return None;
    }

    unique_violation_for(db_err.constraint())
}

/// Converts any SQLx error that is not an expected duplicate into
/// [`RepositoryError::Unavailable`].
pub fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Unavailable(e.to_string())
}
