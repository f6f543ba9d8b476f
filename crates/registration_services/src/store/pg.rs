use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkin_core::Identifier;
use sqlx::{PgPool, Row};

use super::CheckinStore;
use crate::types::{CheckinRecord, RejectionRecord, StoreError};

/// PostgreSQL-backed store over the `checkins` and `rejections` tables.
///
/// Uniqueness comes from the tables' primary keys; inserts use
/// `ON CONFLICT DO NOTHING` and inspect the affected row count.
#[derive(Debug, Clone)]
pub struct PgCheckinStore {
    pool: PgPool,
}

impl PgCheckinStore {
    /// Creates a new instance of `PgCheckinStore` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckinStore for PgCheckinStore {
    async fn insert_checkin(&self, record: &CheckinRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO checkins (identifier, registered_at)
            VALUES ($1, $2)
            ON CONFLICT (identifier) DO NOTHING
            "#,
        )
        .bind(record.identifier.as_str())
        .bind(record.registered_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_rejection(&self, record: &RejectionRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO rejections (identifier, reason, rejected_by, rejected_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (identifier) DO NOTHING
            "#,
        )
        .bind(record.identifier.as_str())
        .bind(&record.reason)
        .bind(record.rejected_by.as_deref())
        .bind(record.rejected_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_rejection(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<RejectionRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT identifier, reason, rejected_by, rejected_at
            FROM rejections
            WHERE identifier = $1
            "#,
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(RejectionRecord {
                identifier: Identifier::parse(row.get::<&str, _>("identifier"))?,
                reason: row.get("reason"),
                rejected_by: row.get("rejected_by"),
                rejected_at: row.get::<DateTime<Utc>, _>("rejected_at"),
            })),
            None => Ok(None),
        }
    }

    async fn list_checkins(&self) -> Result<Vec<CheckinRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT identifier, registered_at
            FROM checkins
            ORDER BY identifier COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CheckinRecord {
                    identifier: Identifier::parse(row.get::<&str, _>("identifier"))?,
                    registered_at: row.get("registered_at"),
                })
            })
            .collect()
    }

    async fn clear_checkins(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM checkins")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
