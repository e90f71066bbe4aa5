use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bayline_core::domain::document::DocumentId;
use bayline_core::domain::job::JobId;
use bayline_core::domain::line_item::{ItemType, LineItem, LineItemId};
use bayline_core::domain::new_id;
use bayline_core::errors::DomainError;
use bayline_core::pricing::{price_line_item, LineItemRequest, PricedLineItem};

use super::ShopService;
use crate::store::{self, StoreError};

/// Partial update for a line item. Outer `None` leaves a field alone; the
/// nested option on clearable fields distinguishes "set to null" from
/// "don't touch".
#[derive(Clone, Debug, Default)]
pub struct LineItemPatch {
    pub description: Option<String>,
    pub job_id: Option<Option<JobId>>,
    pub qty: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub taxable: Option<bool>,
    pub labor_hours: Option<Option<Decimal>>,
    pub cost: Option<Option<Decimal>>,
}

impl ShopService {
    /// Price and add one line item to an unlocked document, then recompute
    /// its totals.
    pub async fn add_line_item(
        &self,
        document_id: &DocumentId,
        item_type: &str,
        request: LineItemRequest,
    ) -> Result<LineItem, StoreError> {
        let item_type = ItemType::parse(item_type)?;

        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, document_id).await?;
        if document.is_frozen() {
            return Err(DomainError::DocumentLocked(document.id.0).into());
        }

        let matrix = self.load_matrix(&mut tx).await?;
        let priced = price_line_item(item_type, request, &matrix)?;
        let item = materialize_item(priced, document.id.clone(), Utc::now());
        store::line_items::insert(&mut tx, &item).await?;
        self.recalc_and_store(&mut tx, &document).await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Field-level edit of an existing item. No repricing happens here; the
    /// caller's values are stored as given and totals are recomputed.
    pub async fn update_line_item(
        &self,
        id: &LineItemId,
        patch: LineItemPatch,
    ) -> Result<LineItem, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut item = store::line_items::fetch(&mut tx, id).await?;
        let document = store::documents::fetch(&mut tx, &item.document_id).await?;
        if document.is_frozen() {
            return Err(DomainError::DocumentLocked(document.id.0).into());
        }

        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(job_id) = patch.job_id {
            item.job_id = job_id;
        }
        if let Some(qty) = patch.qty {
            item.qty = qty;
        }
        if let Some(unit_price) = patch.unit_price {
            item.unit_price = unit_price;
        }
        if let Some(taxable) = patch.taxable {
            item.taxable = taxable;
        }
        if let Some(labor_hours) = patch.labor_hours {
            item.labor_hours = labor_hours;
        }
        if let Some(cost) = patch.cost {
            item.cost = cost;
        }

        store::line_items::update(&mut tx, &item).await?;
        self.recalc_and_store(&mut tx, &document).await?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn delete_line_item(&self, id: &LineItemId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let item = store::line_items::fetch(&mut tx, id).await?;
        let document = store::documents::fetch(&mut tx, &item.document_id).await?;
        if document.is_frozen() {
            return Err(DomainError::DocumentLocked(document.id.0).into());
        }

        store::line_items::delete(&mut tx, &item.id).await?;
        self.recalc_and_store(&mut tx, &document).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_line_items(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<LineItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        store::line_items::list_for_document(&mut conn, document_id).await
    }
}

/// Give a priced item its identity and timestamp for persistence.
pub(crate) fn materialize_item(
    priced: PricedLineItem,
    document_id: DocumentId,
    now: DateTime<Utc>,
) -> LineItem {
    LineItem {
        id: LineItemId(new_id()),
        document_id,
        job_id: priced.job_id,
        item_type: priced.item_type,
        description: priced.description,
        qty: priced.qty,
        unit_price: priced.unit_price,
        taxable: priced.taxable,
        labor_hours: priced.labor_hours,
        cost: priced.cost,
        created_at: now,
    }
}
