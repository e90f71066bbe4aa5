use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::audit::AuditEvent;
use bayline_core::domain::repair_order::RepairOrderId;

use super::{parse_timestamp, StoreError};

/// Append one event to the repair order's history. There is no update or
/// delete path; the table is insert-only by construction.
pub async fn append(conn: &mut SqliteConnection, event: &AuditEvent) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO ro_event (id, ro_id, event_type, old_value, new_value, recorded_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.id)
    .bind(&event.ro_id.0)
    .bind(&event.event_type)
    .bind(event.old_value.as_deref())
    .bind(event.new_value.as_deref())
    .bind(event.recorded_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn append_all(
    conn: &mut SqliteConnection,
    events: &[AuditEvent],
) -> Result<(), StoreError> {
    for event in events {
        append(&mut *conn, event).await?;
    }
    Ok(())
}

pub async fn list_for_ro(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<Vec<AuditEvent>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, ro_id, event_type, old_value, new_value, recorded_at
         FROM ro_event
         WHERE ro_id = ?
         ORDER BY recorded_at ASC, id ASC",
    )
    .bind(&ro_id.0)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(event_from_row).collect()
}

fn event_from_row(row: SqliteRow) -> Result<AuditEvent, StoreError> {
    Ok(AuditEvent {
        id: row.get("id"),
        ro_id: RepairOrderId(row.get("ro_id")),
        event_type: row.get("event_type"),
        old_value: row.get("old_value"),
        new_value: row.get("new_value"),
        recorded_at: parse_timestamp("recorded_at", row.get("recorded_at"))?,
    })
}
