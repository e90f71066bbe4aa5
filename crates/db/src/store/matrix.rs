use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use bayline_core::domain::matrix::{LaborMatrixTier, PartsMatrixTier, TierId};

use super::{parse_decimal, parse_opt_decimal, StoreError};

pub async fn insert_labor_tier(
    conn: &mut SqliteConnection,
    tier: &LaborMatrixTier,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO labor_matrix_tier (id, min_hours, max_hours, rate_per_hour)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&tier.id.0)
    .bind(tier.min_hours.to_string())
    .bind(tier.max_hours.map(|value| value.to_string()))
    .bind(tier.rate_per_hour.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn insert_parts_tier(
    conn: &mut SqliteConnection,
    tier: &PartsMatrixTier,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO parts_matrix_tier (id, min_cost, max_cost, multiplier)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&tier.id.0)
    .bind(tier.min_cost.to_string())
    .bind(tier.max_cost.map(|value| value.to_string()))
    .bind(tier.multiplier.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn list_labor_tiers(
    conn: &mut SqliteConnection,
) -> Result<Vec<LaborMatrixTier>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, min_hours, max_hours, rate_per_hour
         FROM labor_matrix_tier
         ORDER BY CAST(min_hours AS REAL) ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(labor_tier_from_row).collect()
}

pub async fn list_parts_tiers(
    conn: &mut SqliteConnection,
) -> Result<Vec<PartsMatrixTier>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, min_cost, max_cost, multiplier
         FROM parts_matrix_tier
         ORDER BY CAST(min_cost AS REAL) ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(parts_tier_from_row).collect()
}

/// Delete a tier by id from whichever table holds it. Returns false when
/// neither table does.
pub async fn delete_tier(conn: &mut SqliteConnection, id: &TierId) -> Result<bool, StoreError> {
    let labor = sqlx::query("DELETE FROM labor_matrix_tier WHERE id = ?")
        .bind(&id.0)
        .execute(&mut *conn)
        .await?;
    if labor.rows_affected() > 0 {
        return Ok(true);
    }

    let parts = sqlx::query("DELETE FROM parts_matrix_tier WHERE id = ?")
        .bind(&id.0)
        .execute(&mut *conn)
        .await?;
    Ok(parts.rows_affected() > 0)
}

fn labor_tier_from_row(row: SqliteRow) -> Result<LaborMatrixTier, StoreError> {
    Ok(LaborMatrixTier {
        id: TierId(row.get("id")),
        min_hours: parse_decimal("min_hours", row.get("min_hours"))?,
        max_hours: parse_opt_decimal("max_hours", row.get("max_hours"))?,
        rate_per_hour: parse_decimal("rate_per_hour", row.get("rate_per_hour"))?,
    })
}

fn parts_tier_from_row(row: SqliteRow) -> Result<PartsMatrixTier, StoreError> {
    Ok(PartsMatrixTier {
        id: TierId(row.get("id")),
        min_cost: parse_decimal("min_cost", row.get("min_cost"))?,
        max_cost: parse_opt_decimal("max_cost", row.get("max_cost"))?,
        multiplier: parse_decimal("multiplier", row.get("multiplier"))?,
    })
}
