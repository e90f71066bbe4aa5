use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::technician::{Technician, TechnicianId};
use bayline_core::errors::DomainError;

use super::{parse_decimal, parse_timestamp, StoreError};

pub async fn insert(conn: &mut SqliteConnection, tech: &Technician) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO technician (id, name, total_hours, created_at) VALUES (?, ?, ?, ?)")
        .bind(&tech.id.0)
        .bind(&tech.name)
        .bind(tech.total_hours.to_string())
        .bind(tech.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn fetch(
    conn: &mut SqliteConnection,
    id: &TechnicianId,
) -> Result<Technician, StoreError> {
    let row = sqlx::query("SELECT id, name, total_hours, created_at FROM technician WHERE id = ?")
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => technician_from_row(row),
        None => Err(DomainError::not_found("technician", &id.0).into()),
    }
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Technician>, StoreError> {
    let rows = sqlx::query("SELECT id, name, total_hours, created_at FROM technician ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter().map(technician_from_row).collect()
}

/// Read-modify-write so the accumulated hours stay exact decimal text.
pub async fn credit_hours(
    conn: &mut SqliteConnection,
    id: &TechnicianId,
    hours: Decimal,
) -> Result<Technician, StoreError> {
    let tech = fetch(&mut *conn, id).await?.credited(hours);

    sqlx::query("UPDATE technician SET total_hours = ? WHERE id = ?")
        .bind(tech.total_hours.to_string())
        .bind(&tech.id.0)
        .execute(&mut *conn)
        .await?;

    Ok(tech)
}

fn technician_from_row(row: SqliteRow) -> Result<Technician, StoreError> {
    Ok(Technician {
        id: TechnicianId(row.get("id")),
        name: row.get("name"),
        total_hours: parse_decimal("total_hours", row.get("total_hours"))?,
        created_at: parse_timestamp("created_at", row.get("created_at"))?,
    })
}
