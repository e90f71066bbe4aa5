use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::document::DocumentId;
use bayline_core::domain::job::JobId;
use bayline_core::domain::line_item::{ItemType, LineItem, LineItemId};
use bayline_core::errors::DomainError;

use super::{parse_decimal, parse_opt_decimal, parse_timestamp, StoreError};

pub async fn insert(conn: &mut SqliteConnection, item: &LineItem) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO line_item (
            id, document_id, job_id, item_type, description, qty, unit_price,
            taxable, labor_hours, cost, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.id.0)
    .bind(&item.document_id.0)
    .bind(item.job_id.as_ref().map(|job| job.0.as_str()))
    .bind(item.item_type.as_str())
    .bind(&item.description)
    .bind(item.qty.to_string())
    .bind(item.unit_price.to_string())
    .bind(item.taxable)
    .bind(item.labor_hours.map(|value| value.to_string()))
    .bind(item.cost.map(|value| value.to_string()))
    .bind(item.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, item: &LineItem) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE line_item
         SET job_id = ?, description = ?, qty = ?, unit_price = ?,
             taxable = ?, labor_hours = ?, cost = ?
         WHERE id = ?",
    )
    .bind(item.job_id.as_ref().map(|job| job.0.as_str()))
    .bind(&item.description)
    .bind(item.qty.to_string())
    .bind(item.unit_price.to_string())
    .bind(item.taxable)
    .bind(item.labor_hours.map(|value| value.to_string()))
    .bind(item.cost.map(|value| value.to_string()))
    .bind(&item.id.0)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: &LineItemId) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM line_item WHERE id = ?").bind(&id.0).execute(&mut *conn).await?;
    Ok(())
}

pub async fn delete_for_document(
    conn: &mut SqliteConnection,
    document_id: &DocumentId,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM line_item WHERE document_id = ?")
        .bind(&document_id.0)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Drop the job tag from every item pointing at a deleted job. The items
/// themselves survive in the unassigned bucket.
pub async fn unassign_job(conn: &mut SqliteConnection, job_id: &JobId) -> Result<(), StoreError> {
    sqlx::query("UPDATE line_item SET job_id = NULL WHERE job_id = ?")
        .bind(&job_id.0)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn fetch(conn: &mut SqliteConnection, id: &LineItemId) -> Result<LineItem, StoreError> {
    let row = sqlx::query(
        "SELECT id, document_id, job_id, item_type, description, qty, unit_price,
                taxable, labor_hours, cost, created_at
         FROM line_item
         WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => line_item_from_row(row),
        None => Err(DomainError::not_found("line_item", &id.0).into()),
    }
}

pub async fn list_for_document(
    conn: &mut SqliteConnection,
    document_id: &DocumentId,
) -> Result<Vec<LineItem>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, document_id, job_id, item_type, description, qty, unit_price,
                taxable, labor_hours, cost, created_at
         FROM line_item
         WHERE document_id = ?
         ORDER BY created_at ASC, id ASC",
    )
    .bind(&document_id.0)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(line_item_from_row).collect()
}

fn line_item_from_row(row: SqliteRow) -> Result<LineItem, StoreError> {
    let item_type_raw: String = row.get("item_type");
    let item_type = ItemType::parse(&item_type_raw)
        .map_err(|_| StoreError::Decode(format!("unknown item type `{item_type_raw}`")))?;

    Ok(LineItem {
        id: LineItemId(row.get("id")),
        document_id: DocumentId(row.get("document_id")),
        job_id: row.get::<Option<String>, _>("job_id").map(JobId),
        item_type,
        description: row.get("description"),
        qty: parse_decimal("qty", row.get("qty"))?,
        unit_price: parse_decimal("unit_price", row.get("unit_price"))?,
        taxable: row.get("taxable"),
        labor_hours: parse_opt_decimal("labor_hours", row.get("labor_hours"))?,
        cost: parse_opt_decimal("cost", row.get("cost"))?,
        created_at: parse_timestamp("created_at", row.get("created_at"))?,
    })
}
