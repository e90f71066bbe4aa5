use rust_decimal::Decimal;
use serde::Serialize;

use bayline_core::domain::matrix::{LaborMatrixTier, PartsMatrixTier, TierId};
use bayline_core::domain::new_id;
use bayline_core::errors::DomainError;

use super::ShopService;
use crate::store::{self, StoreError};

#[derive(Debug, Serialize)]
pub struct MatrixTiers {
    pub labor: Vec<LaborMatrixTier>,
    pub parts: Vec<PartsMatrixTier>,
}

impl ShopService {
    pub async fn add_labor_tier(
        &self,
        min_hours: Decimal,
        max_hours: Option<Decimal>,
        rate_per_hour: Decimal,
    ) -> Result<LaborMatrixTier, StoreError> {
        let tier = LaborMatrixTier { id: TierId(new_id()), min_hours, max_hours, rate_per_hour };
        let mut conn = self.pool.acquire().await?;
        store::matrix::insert_labor_tier(&mut conn, &tier).await?;
        Ok(tier)
    }

    pub async fn add_parts_tier(
        &self,
        min_cost: Decimal,
        max_cost: Option<Decimal>,
        multiplier: Decimal,
    ) -> Result<PartsMatrixTier, StoreError> {
        let tier = PartsMatrixTier { id: TierId(new_id()), min_cost, max_cost, multiplier };
        let mut conn = self.pool.acquire().await?;
        store::matrix::insert_parts_tier(&mut conn, &tier).await?;
        Ok(tier)
    }

    pub async fn list_matrix_tiers(&self) -> Result<MatrixTiers, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(MatrixTiers {
            labor: store::matrix::list_labor_tiers(&mut conn).await?,
            parts: store::matrix::list_parts_tiers(&mut conn).await?,
        })
    }

    /// Delete a tier from whichever matrix owns it.
    pub async fn delete_matrix_tier(&self, id: &TierId) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        if store::matrix::delete_tier(&mut conn, id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("matrix_tier", &id.0).into())
        }
    }
}
