use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::repair_order::{
    RepairOrder, RepairOrderId, RepairOrderStatus, FIRST_RO_NUMBER,
};
use bayline_core::domain::{CustomerId, VehicleId};
use bayline_core::errors::DomainError;

use super::{parse_opt_timestamp, parse_timestamp, StoreError};

/// Next visible order number: one past the highest ever issued, including
/// soft-deleted orders, so numbers are never reused.
pub async fn next_ro_number(conn: &mut SqliteConnection) -> Result<i64, StoreError> {
    let highest: Option<i64> = sqlx::query_scalar("SELECT MAX(ro_number) FROM repair_order")
        .fetch_one(&mut *conn)
        .await?;
    Ok(highest.map_or(FIRST_RO_NUMBER, |number| number + 1))
}

pub async fn insert(conn: &mut SqliteConnection, ro: &RepairOrder) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO repair_order (
            id, ro_number, customer_id, vehicle_id, status, concern,
            opened_at, closed_at, deleted_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&ro.id.0)
    .bind(ro.ro_number)
    .bind(&ro.customer_id.0)
    .bind(&ro.vehicle_id.0)
    .bind(ro.status.as_str())
    .bind(ro.concern.as_deref())
    .bind(ro.opened_at.to_rfc3339())
    .bind(ro.closed_at.map(|value| value.to_rfc3339()))
    .bind(ro.deleted_at.map(|value| value.to_rfc3339()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, ro: &RepairOrder) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE repair_order
         SET status = ?, concern = ?, closed_at = ?, deleted_at = ?
         WHERE id = ?",
    )
    .bind(ro.status.as_str())
    .bind(ro.concern.as_deref())
    .bind(ro.closed_at.map(|value| value.to_rfc3339()))
    .bind(ro.deleted_at.map(|value| value.to_rfc3339()))
    .bind(&ro.id.0)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch(
    conn: &mut SqliteConnection,
    id: &RepairOrderId,
) -> Result<RepairOrder, StoreError> {
    let row = sqlx::query(
        "SELECT id, ro_number, customer_id, vehicle_id, status, concern,
                opened_at, closed_at, deleted_at
         FROM repair_order
         WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => repair_order_from_row(row),
        None => Err(DomainError::not_found("repair_order", &id.0).into()),
    }
}

/// Active (non-archived) orders, newest number first.
pub async fn list_active(conn: &mut SqliteConnection) -> Result<Vec<RepairOrder>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, ro_number, customer_id, vehicle_id, status, concern,
                opened_at, closed_at, deleted_at
         FROM repair_order
         WHERE deleted_at IS NULL
         ORDER BY ro_number DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(repair_order_from_row).collect()
}

fn repair_order_from_row(row: SqliteRow) -> Result<RepairOrder, StoreError> {
    let status_raw: String = row.get("status");
    let status = RepairOrderStatus::parse(&status_raw)
        .map_err(|_| StoreError::Decode(format!("unknown repair order status `{status_raw}`")))?;

    Ok(RepairOrder {
        id: RepairOrderId(row.get("id")),
        ro_number: row.get("ro_number"),
        customer_id: CustomerId(row.get("customer_id")),
        vehicle_id: VehicleId(row.get("vehicle_id")),
        status,
        concern: row.get("concern"),
        opened_at: parse_timestamp("opened_at", row.get("opened_at"))?,
        closed_at: parse_opt_timestamp("closed_at", row.get("closed_at"))?,
        deleted_at: parse_opt_timestamp("deleted_at", row.get("deleted_at"))?,
    })
}
