use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::document::{DocType, Document, DocumentId, DocumentStatus};
use bayline_core::domain::repair_order::RepairOrderId;
use bayline_core::errors::DomainError;
use bayline_core::pricing::DocumentTotals;

use super::{parse_decimal, parse_opt_timestamp, parse_timestamp, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, ro_id, doc_type, version, status, subtotal, tax, total,
        sent_at, locked_at, share_token, created_at
 FROM document";

pub async fn insert(conn: &mut SqliteConnection, document: &Document) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO document (
            id, ro_id, doc_type, version, status, subtotal, tax, total,
            sent_at, locked_at, share_token, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&document.id.0)
    .bind(&document.ro_id.0)
    .bind(document.doc_type.as_str())
    .bind(document.version)
    .bind(document.status.as_str())
    .bind(document.subtotal.to_string())
    .bind(document.tax.to_string())
    .bind(document.total.to_string())
    .bind(document.sent_at.map(|value| value.to_rfc3339()))
    .bind(document.locked_at.map(|value| value.to_rfc3339()))
    .bind(document.share_token.as_deref())
    .bind(document.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, document: &Document) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE document
         SET status = ?, subtotal = ?, tax = ?, total = ?,
             sent_at = ?, locked_at = ?, share_token = ?
         WHERE id = ?",
    )
    .bind(document.status.as_str())
    .bind(document.subtotal.to_string())
    .bind(document.tax.to_string())
    .bind(document.total.to_string())
    .bind(document.sent_at.map(|value| value.to_rfc3339()))
    .bind(document.locked_at.map(|value| value.to_rfc3339()))
    .bind(document.share_token.as_deref())
    .bind(&document.id.0)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update_totals(
    conn: &mut SqliteConnection,
    id: &DocumentId,
    totals: &DocumentTotals,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE document SET subtotal = ?, tax = ?, total = ? WHERE id = ?")
        .bind(totals.subtotal.to_string())
        .bind(totals.tax.to_string())
        .bind(totals.total.to_string())
        .bind(&id.0)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn fetch(conn: &mut SqliteConnection, id: &DocumentId) -> Result<Document, StoreError> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => document_from_row(row),
        None => Err(DomainError::not_found("document", &id.0).into()),
    }
}

/// The working copy for one (repair order, doc type) pair: highest version.
pub async fn fetch_for_ro(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
    doc_type: DocType,
) -> Result<Option<Document>, StoreError> {
    let row = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE ro_id = ? AND doc_type = ? ORDER BY version DESC LIMIT 1"
    ))
    .bind(&ro_id.0)
    .bind(doc_type.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(document_from_row).transpose()
}

pub async fn fetch_by_share_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Document, StoreError> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE share_token = ?"))
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => document_from_row(row),
        None => Err(DomainError::not_found("document", token).into()),
    }
}

pub async fn share_token_exists(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<bool, StoreError> {
    let row = sqlx::query("SELECT 1 FROM document WHERE share_token = ?")
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.is_some())
}

pub async fn list_for_ro(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<Vec<Document>, StoreError> {
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE ro_id = ? ORDER BY doc_type ASC, version DESC"
    ))
    .bind(&ro_id.0)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(document_from_row).collect()
}

fn document_from_row(row: SqliteRow) -> Result<Document, StoreError> {
    let doc_type_raw: String = row.get("doc_type");
    let doc_type = DocType::parse(&doc_type_raw)
        .map_err(|_| StoreError::Decode(format!("unknown doc type `{doc_type_raw}`")))?;
    let status_raw: String = row.get("status");
    let status = DocumentStatus::parse(&status_raw)
        .map_err(|_| StoreError::Decode(format!("unknown document status `{status_raw}`")))?;

    Ok(Document {
        id: DocumentId(row.get("id")),
        ro_id: RepairOrderId(row.get("ro_id")),
        doc_type,
        version: row.get("version"),
        status,
        subtotal: parse_decimal("subtotal", row.get("subtotal"))?,
        tax: parse_decimal("tax", row.get("tax"))?,
        total: parse_decimal("total", row.get("total"))?,
        sent_at: parse_opt_timestamp("sent_at", row.get("sent_at"))?,
        locked_at: parse_opt_timestamp("locked_at", row.get("locked_at"))?,
        share_token: row.get("share_token"),
        created_at: parse_timestamp("created_at", row.get("created_at"))?,
    })
}
