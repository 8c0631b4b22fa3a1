//! Completed-record persistence. The table is append-only — there is no
//! update path, matching the write-once semantics of the in-memory log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use haz_core::ShipmentRef;

use crate::state::CompletedRecord;

/// Insert a completion snapshot.
pub async fn insert(pool: &PgPool, record: &CompletedRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO completed (reference, secondary_ref, operator, company, signed_by,
                                delivered_at, pod_path, document_path)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.reference.as_str())
    .bind(&record.secondary_ref)
    .bind(&record.operator)
    .bind(&record.company)
    .bind(&record.signed_by)
    .bind(record.delivered_at)
    .bind(&record.pod_path)
    .bind(&record.document_path)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every completed record for startup hydration, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<CompletedRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CompletedRow>(
        "SELECT reference, secondary_ref, operator, company, signed_by, delivered_at,
                pod_path, document_path
         FROM completed ORDER BY delivered_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CompletedRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CompletedRow {
    reference: String,
    secondary_ref: Option<String>,
    operator: String,
    company: String,
    signed_by: String,
    delivered_at: DateTime<Utc>,
    pod_path: String,
    document_path: Option<String>,
}

impl CompletedRow {
    fn into_record(self) -> Result<CompletedRecord, sqlx::Error> {
        Ok(CompletedRecord {
            reference: ShipmentRef::new(&self.reference).map_err(|e| {
                sqlx::Error::Decode(format!("corrupt completed row reference: {e}").into())
            })?,
            secondary_ref: self.secondary_ref,
            operator: self.operator,
            company: self.company,
            signed_by: self.signed_by,
            delivered_at: self.delivered_at,
            pod_path: self.pod_path,
            document_path: self.document_path,
        })
    }
}
