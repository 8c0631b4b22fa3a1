//! Shipment persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `shipments` table,
//! keyed by waybill reference. Lifecycle legality is enforced at the store
//! layer, not in SQL; the `version` column simply mirrors the in-memory
//! change counter.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use haz_core::{Branch, DriverCode, Route, ShipmentRef};

use crate::state::ShipmentRecord;

/// Insert a newly booked shipment.
pub async fn insert(pool: &PgPool, record: &ShipmentRecord) -> Result<(), sqlx::Error> {
    let route = serde_json::to_value(&record.route)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize route: {e}")))?;
    let recipients = serde_json::to_value(&record.recipients)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize recipients: {e}")))?;

    sqlx::query(
        "INSERT INTO shipments (reference, secondary_ref, branch, company, operator, status,
                                route, driver, transporter, recipients, thread_anchor, version,
                                created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(record.reference.as_str())
    .bind(&record.secondary_ref)
    .bind(record.branch.as_str())
    .bind(&record.company)
    .bind(&record.operator)
    .bind(record.status.as_str())
    .bind(&route)
    .bind(record.driver.as_ref().map(|d| d.as_str()))
    .bind(&record.transporter)
    .bind(&recipients)
    .bind(&record.thread_anchor)
    .bind(record.version as i64)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirror a mutated record: status, driver, transporter, thread anchor,
/// version. Stale writers lose on the version guard rather than clobbering
/// a newer row.
pub async fn update_after_mutation(
    pool: &PgPool,
    record: &ShipmentRecord,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE shipments
         SET status = $1, driver = $2, transporter = $3, thread_anchor = $4,
             version = $5, updated_at = $6
         WHERE reference = $7 AND version < $5",
    )
    .bind(record.status.as_str())
    .bind(record.driver.as_ref().map(|d| d.as_str()))
    .bind(&record.transporter)
    .bind(&record.thread_anchor)
    .bind(record.version as i64)
    .bind(record.updated_at)
    .bind(record.reference.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load every shipment row for startup hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ShipmentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ShipmentRow>(
        "SELECT reference, secondary_ref, branch, company, operator, status, route, driver,
                transporter, recipients, thread_anchor, version, created_at, updated_at
         FROM shipments ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ShipmentRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ShipmentRow {
    reference: String,
    secondary_ref: Option<String>,
    branch: String,
    company: String,
    operator: String,
    status: String,
    route: serde_json::Value,
    driver: Option<String>,
    transporter: Option<String>,
    recipients: serde_json::Value,
    thread_anchor: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShipmentRow {
    fn into_record(self) -> Result<ShipmentRecord, sqlx::Error> {
        let corrupt = |what: &str, detail: String| {
            sqlx::Error::Decode(format!("corrupt shipment row {what}: {detail}").into())
        };
        Ok(ShipmentRecord {
            reference: ShipmentRef::new(&self.reference)
                .map_err(|e| corrupt("reference", e.to_string()))?,
            secondary_ref: self.secondary_ref,
            branch: Branch::from_str(&self.branch)
                .map_err(|e| corrupt("branch", e.to_string()))?,
            company: self.company,
            operator: self.operator,
            status: serde_json::from_value(serde_json::Value::String(self.status.clone()))
                .map_err(|e| corrupt("status", e.to_string()))?,
            route: serde_json::from_value::<Route>(self.route)
                .map_err(|e| corrupt("route", e.to_string()))?,
            driver: self
                .driver
                .map(DriverCode::new)
                .transpose()
                .map_err(|e| corrupt("driver", e.to_string()))?,
            transporter: self.transporter,
            recipients: serde_json::from_value(self.recipients)
                .map_err(|e| corrupt("recipients", e.to_string()))?,
            thread_anchor: self.thread_anchor,
            version: self.version as u64,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use haz_state::ShipmentStatus;

    #[test]
    fn status_column_roundtrips_through_serde() {
        // The status column stores the serde snake_case form; make sure
        // as_str and Deserialize agree for every variant.
        for status in [
            ShipmentStatus::Pending,
            ShipmentStatus::Assigned,
            ShipmentStatus::InProgress,
            ShipmentStatus::Delivered,
        ] {
            let parsed: ShipmentStatus = serde_json::from_value(serde_json::Value::String(
                status.as_str().to_string(),
            ))
            .unwrap();
            assert_eq!(parsed, status);
        }
    }
}
