//! Insert-only repository for extracted instrument records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use luthier_core::{Error, PersistableRecord, RecordSink, Result};

use crate::pool::warn_if_saturated;

/// Rows sharing a fingerprint, as listed for duplicate review.
#[derive(Debug, Clone, Serialize)]
pub struct SeedInstrumentSummary {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub source: String,
    pub created_at_utc: DateTime<Utc>,
}

/// PostgreSQL repository for the `seed_instruments` table.
#[derive(Clone)]
pub struct PgSeedInstrumentRepository {
    pool: Pool<Postgres>,
}

impl PgSeedInstrumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Number of stored rows carrying `fingerprint`.
    pub async fn count_by_fingerprint(&self, fingerprint: &str) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM seed_instruments WHERE dedup_fingerprint = $1",
        )
        .bind(fingerprint)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("count"))
    }

    /// Rows carrying `fingerprint`, oldest first.
    pub async fn list_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<SeedInstrumentSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, brand, model, year, source, created_at_utc
            FROM seed_instruments
            WHERE dedup_fingerprint = $1
            ORDER BY created_at_utc ASC, id ASC
            "#,
        )
        .bind(fingerprint)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| SeedInstrumentSummary {
                id: row.get("id"),
                brand: row.get("brand"),
                model: row.get("model"),
                year: row.get("year"),
                source: row.get("source"),
                created_at_utc: row.get("created_at_utc"),
            })
            .collect())
    }
}

#[async_trait]
impl RecordSink for PgSeedInstrumentRepository {
    async fn insert(&self, record: &PersistableRecord) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let finish_options: Vec<String> = record.finish_options.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO seed_instruments (
                id, brand, model, year, year_range, serial_number, finish, category,
                production_status, context, famous_owner, nickname, notable_events,
                ownership_history, modification_history, body_style, instrument_type,
                finish_options, specifications, story, images, extraction_confidence,
                fields_requiring_verification, dedup_fingerprint, source
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(id)
        .bind(&record.brand)
        .bind(&record.model)
        .bind(record.year)
        .bind(&record.year_range)
        .bind(&record.serial_number)
        .bind(&record.finish)
        .bind(&record.category)
        .bind(record.production_status.map(|s| s.as_str()))
        .bind(&record.context)
        .bind(&record.famous_owner)
        .bind(&record.nickname)
        .bind(&record.notable_events)
        .bind(&record.ownership_history)
        .bind(&record.modification_history)
        .bind(&record.body_style)
        .bind(&record.instrument_type)
        .bind(&finish_options)
        .bind(Json(&record.specifications))
        .bind(&record.story)
        .bind(&record.images)
        .bind(record.extraction_confidence.as_str())
        .bind(&record.fields_requiring_verification)
        .bind(&record.dedup_fingerprint)
        .bind(&record.source)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn_if_saturated(&self.pool);
            Error::Database(e)
        })?;

        debug!(
            subsystem = "db",
            component = "seed_instruments",
            op = "insert",
            fingerprint = %record.dedup_fingerprint,
            spec_count = record.specifications.len(),
            %id,
            "Instrument record inserted"
        );
        Ok(id)
    }
}
