//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{RepositoryError, UrlRepository};
use crate::utils::db_error::{UniqueViolation, map_sqlx_error, unique_violation};

/// Row shape of the `urls` table.
#[derive(Debug, FromRow)]
struct UrlRow {
    original_url: String,
    sequence_id: i64,
}

impl TryFrom<UrlRow> for UrlRecord {
    type Error = RepositoryError;

    fn try_from(row: UrlRow) -> Result<Self, Self::Error> {
        Ok(UrlRecord::new(row.original_url, to_sequence_id(row.sequence_id)?))
    }
}

/// `BIGINT` → sequence id. Negative values mean the table is corrupted.
fn to_sequence_id(value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::Corrupted(format!("negative sequence_id {value}")))
}

/// PostgreSQL repository for URL records.
///
/// Both unique keys are enforced by the indexes created in
/// `migrations/`. Inserts never check beforehand; a losing concurrent insert
/// is reported through the unique violation PostgreSQL raises.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, UrlRow>(
            "SELECT original_url, sequence_id FROM urls WHERE original_url = $1",
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        row.map(UrlRecord::try_from).transpose()
    }

    async fn find_by_sequence_id(
        &self,
        sequence_id: u64,
    ) -> Result<Option<UrlRecord>, RepositoryError> {
        // Ids past BIGINT range were never stored.
        let Ok(sequence_id) = i64::try_from(sequence_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UrlRow>(
            "SELECT original_url, sequence_id FROM urls WHERE sequence_id = $1",
        )
        .bind(sequence_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        row.map(UrlRecord::try_from).transpose()
    }

    async fn find_max_sequence_id(&self) -> Result<Option<u64>, RepositoryError> {
        let max = sqlx::query_scalar::<_, i64>(
            "SELECT sequence_id FROM urls ORDER BY sequence_id DESC LIMIT 1",
        )
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        max.map(to_sequence_id).transpose()
    }

    async fn insert_unique(&self, new_record: NewUrlRecord) -> Result<UrlRecord, RepositoryError> {
        let sequence_id = i64::try_from(new_record.sequence_id).map_err(|_| {
            RepositoryError::Corrupted(format!(
                "sequence id {} exceeds BIGINT range",
                new_record.sequence_id
            ))
        })?;

        let result = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (original_url, sequence_id)
            VALUES ($1, $2)
            RETURNING original_url, sequence_id
            "#,
        )
        .bind(&new_record.original_url)
        .bind(sequence_id)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => UrlRecord::try_from(row),
            Err(e) => match unique_violation(&e) {
                Some(UniqueViolation::SequenceId) => {
                    debug!("Insert lost race on sequence_id {}", new_record.sequence_id);
                    Err(RepositoryError::DuplicateSequenceId(new_record.sequence_id))
                }
                Some(UniqueViolation::OriginalUrl) => {
                    debug!("Insert lost race on url {}", new_record.original_url);
                    Err(RepositoryError::DuplicateOriginalUrl(new_record.original_url))
                }
                None => Err(map_sqlx_error(e)),
            },
        }
    }
}
