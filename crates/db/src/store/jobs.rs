use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::job::{Job, JobId, JobStatus};
use bayline_core::domain::repair_order::RepairOrderId;
use bayline_core::domain::technician::TechnicianId;
use bayline_core::errors::DomainError;

use super::{parse_opt_timestamp, parse_timestamp, StoreError};

pub async fn insert(conn: &mut SqliteConnection, job: &Job) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO job (id, ro_id, title, status, sort_order, tech_id, completed_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&job.id.0)
    .bind(&job.ro_id.0)
    .bind(&job.title)
    .bind(job.status.as_str())
    .bind(job.sort_order)
    .bind(job.tech_id.as_ref().map(|tech| tech.0.as_str()))
    .bind(job.completed_at.map(|value| value.to_rfc3339()))
    .bind(job.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, job: &Job) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE job
         SET title = ?, status = ?, sort_order = ?, tech_id = ?, completed_at = ?
         WHERE id = ?",
    )
    .bind(&job.title)
    .bind(job.status.as_str())
    .bind(job.sort_order)
    .bind(job.tech_id.as_ref().map(|tech| tech.0.as_str()))
    .bind(job.completed_at.map(|value| value.to_rfc3339()))
    .bind(&job.id.0)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: &JobId) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM job WHERE id = ?").bind(&id.0).execute(&mut *conn).await?;
    Ok(())
}

pub async fn fetch(conn: &mut SqliteConnection, id: &JobId) -> Result<Job, StoreError> {
    let row = sqlx::query(
        "SELECT id, ro_id, title, status, sort_order, tech_id, completed_at, created_at
         FROM job
         WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => job_from_row(row),
        None => Err(DomainError::not_found("job", &id.0).into()),
    }
}

pub async fn list_for_ro(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<Vec<Job>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, ro_id, title, status, sort_order, tech_id, completed_at, created_at
         FROM job
         WHERE ro_id = ?
         ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(&ro_id.0)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(job_from_row).collect()
}

/// Next free slot at the end of the order's job list. MAX-based so deleting
/// a job in the middle never hands its slot to a newcomer.
pub async fn next_sort_order(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<i64, StoreError> {
    let next: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(sort_order) + 1, 0) FROM job WHERE ro_id = ?")
            .bind(&ro_id.0)
            .fetch_one(&mut *conn)
            .await?;
    Ok(next)
}

pub async fn count_for_ro(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM job WHERE ro_id = ?")
        .bind(&ro_id.0)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Jobs on the order, excluding one, that are not yet completed. Drives the
/// last-job-closes-the-order cascade.
pub async fn count_open_siblings(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
    exclude: &JobId,
) -> Result<usize, StoreError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM job WHERE ro_id = ? AND id != ? AND status != 'completed'",
    )
    .bind(&ro_id.0)
    .bind(&exclude.0)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count as usize)
}

/// Ids of declined jobs on the order; their line items are excluded from
/// document totals.
pub async fn declined_job_ids(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
) -> Result<Vec<JobId>, StoreError> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT id FROM job WHERE ro_id = ? AND status = 'declined'")
            .bind(&ro_id.0)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(JobId).collect())
}

fn job_from_row(row: SqliteRow) -> Result<Job, StoreError> {
    let status_raw: String = row.get("status");
    let status = JobStatus::parse(&status_raw)
        .map_err(|_| StoreError::Decode(format!("unknown job status `{status_raw}`")))?;

    Ok(Job {
        id: JobId(row.get("id")),
        ro_id: RepairOrderId(row.get("ro_id")),
        title: row.get("title"),
        status,
        sort_order: row.get("sort_order"),
        tech_id: row.get::<Option<String>, _>("tech_id").map(TechnicianId),
        completed_at: parse_opt_timestamp("completed_at", row.get("completed_at"))?,
        created_at: parse_timestamp("created_at", row.get("created_at"))?,
    })
}
