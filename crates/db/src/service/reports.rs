use chrono::Utc;

use bayline_core::domain::document::DocumentId;
use bayline_core::domain::new_id;
use bayline_core::domain::technician::{Technician, TechnicianId};
use bayline_core::pricing::{totals, ProfitSummary};

use super::ShopService;
use crate::store::{self, StoreError};

impl ShopService {
    /// Revenue, cost, and margin over one document's line items. Works on
    /// frozen documents too; reporting never mutates.
    pub async fn document_profit(&self, id: &DocumentId) -> Result<ProfitSummary, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let document = store::documents::fetch(&mut conn, id).await?;
        let items = store::line_items::list_for_document(&mut conn, &document.id).await?;
        Ok(totals::profit_summary(&items))
    }

    pub async fn add_technician(&self, name: &str) -> Result<Technician, StoreError> {
        let tech = Technician {
            id: TechnicianId(new_id()),
            name: name.to_string(),
            total_hours: rust_decimal::Decimal::ZERO,
            created_at: Utc::now(),
        };
        let mut conn = self.pool.acquire().await?;
        store::technicians::insert(&mut conn, &tech).await?;
        Ok(tech)
    }

    pub async fn list_technicians(&self) -> Result<Vec<Technician>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        store::technicians::list(&mut conn).await
    }

    pub async fn get_technician(&self, id: &TechnicianId) -> Result<Technician, StoreError> {
        let mut conn = self.pool.acquire().await?;
        store::technicians::fetch(&mut conn, id).await
    }
}
