use sqlx::Executor;

use crate::connection::DbPool;
use crate::store::StoreError;

pub const SEED_CUSTOMER_ID: &str = "cust-walkin-001";
pub const SEED_VEHICLE_ID: &str = "veh-accord-001";
pub const SEED_TECHNICIAN_IDS: &[&str] = &["tech-001", "tech-002"];
pub const SEED_LABOR_TIER_IDS: &[&str] = &["lt-001", "lt-002", "lt-003"];
pub const SEED_PARTS_TIER_IDS: &[&str] = &["pt-001", "pt-002", "pt-003"];

/// Deterministic development and test seed: a walk-in customer with one
/// vehicle, two technicians, and a three-tier matrix on each pricing axis.
/// Loading is idempotent.
pub struct SeedDataset;

impl SeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/seed_data.sql");

    pub async fn load(pool: &DbPool) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Check every seeded row is present.
    pub async fn verify(pool: &DbPool) -> Result<bool, StoreError> {
        let customer: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM customer WHERE id = ?")
                .bind(SEED_CUSTOMER_ID)
                .fetch_one(pool)
                .await?;
        let vehicle: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM vehicle WHERE id = ?")
            .bind(SEED_VEHICLE_ID)
            .fetch_one(pool)
            .await?;
        let technicians: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM technician WHERE id IN ('tech-001', 'tech-002')")
                .fetch_one(pool)
                .await?;
        let labor_tiers: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM labor_matrix_tier")
            .fetch_one(pool)
            .await?;
        let parts_tiers: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM parts_matrix_tier")
            .fetch_one(pool)
            .await?;

        Ok(customer == 1
            && vehicle == 1
            && technicians == SEED_TECHNICIAN_IDS.len() as i64
            && labor_tiers >= SEED_LABOR_TIER_IDS.len() as i64
            && parts_tiers >= SEED_PARTS_TIER_IDS.len() as i64)
    }
}
