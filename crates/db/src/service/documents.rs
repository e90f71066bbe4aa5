use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;

use bayline_core::domain::document::{DocType, Document, DocumentId, DocumentStatus};
use bayline_core::domain::new_id;
use bayline_core::domain::repair_order::{RepairOrder, RepairOrderId, RepairOrderStatus};
use bayline_core::lifecycle::document as doc_lifecycle;
use bayline_core::lifecycle::DocumentEffect;
use bayline_core::pricing::DocumentTotals;
use bayline_core::promotion::{self, PromotionPlan};
use bayline_core::share::mint_share_token;
use rust_decimal::Decimal;

use super::line_items::materialize_item;
use super::ShopService;
use crate::store::{self, StoreError};

/// Both documents touched by an approval: the approved estimate and the
/// invoice its line items were promoted onto.
#[derive(Debug, Serialize)]
pub struct ApprovedEstimate {
    pub estimate: Document,
    pub invoice: Document,
}

impl ShopService {
    /// The working estimate or invoice for a repair order, created as an
    /// empty draft on first access.
    pub async fn get_or_create_document(
        &self,
        ro_id: &RepairOrderId,
        doc_type: DocType,
    ) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Existence check keeps creation lazy.
        store::repair_orders::fetch(&mut tx, ro_id).await?;
        let document = get_or_create(&mut tx, ro_id, doc_type).await?;
        tx.commit().await?;
        Ok(document)
    }

    /// Recompute one document's totals from its line items. `None` means
    /// the document is frozen and was left as-is.
    pub async fn recalculate_document(
        &self,
        id: &DocumentId,
    ) -> Result<Option<DocumentTotals>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;
        let result = self.recalc_and_store(&mut tx, &document).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Freeze a document's financials after a final recompute.
    pub async fn lock_document(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;
        self.recalc_and_store(&mut tx, &document).await?;
        let document = store::documents::fetch(&mut tx, id).await?;
        let ro = store::repair_orders::fetch(&mut tx, &document.ro_id).await?;

        let (next, effects, events) = doc_lifecycle::lock(&document, ro.status, Utc::now());
        store::documents::update(&mut tx, &next).await?;
        store::audit::append_all(&mut tx, &events).await?;
        self.apply_document_effects(&mut tx, ro, effects).await?;

        tx.commit().await?;
        tracing::info!(document = %next.id.0, doc_type = %next.doc_type, "document locked");
        Ok(next)
    }

    /// Hand out (or re-use) a customer-facing share token for a document.
    pub async fn share_document(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;
        let ro = store::repair_orders::fetch(&mut tx, &document.ro_id).await?;

        // Mint until the candidate is unused. The token space makes a second
        // pass vanishingly unlikely.
        let mut candidate = mint_share_token();
        while store::documents::share_token_exists(&mut tx, &candidate).await? {
            candidate = mint_share_token();
        }

        let (next, effects, events) =
            doc_lifecycle::share(&document, candidate, ro.status, Utc::now());
        store::documents::update(&mut tx, &next).await?;
        store::audit::append_all(&mut tx, &events).await?;
        self.apply_document_effects(&mut tx, ro, effects).await?;

        tx.commit().await?;
        Ok(next)
    }

    /// Customer approval: the estimate's items are promoted onto the
    /// invoice (unless the invoice is frozen) and work begins. Both
    /// documents come back so the caller sees the promoted invoice without
    /// a second round trip.
    pub async fn approve_estimate(&self, id: &DocumentId) -> Result<ApprovedEstimate, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;
        let ro = store::repair_orders::fetch(&mut tx, &document.ro_id).await?;

        let (next, effects, event) = doc_lifecycle::approve(&document, Utc::now())?;
        store::documents::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;
        let invoice = match self.apply_document_effects(&mut tx, ro, effects).await? {
            Some(invoice) => invoice,
            None => get_or_create(&mut tx, &next.ro_id, DocType::Invoice).await?,
        };

        tx.commit().await?;
        tracing::info!(document = %next.id.0, "estimate approved");
        Ok(ApprovedEstimate { estimate: next, invoice })
    }

    pub async fn decline_estimate(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;

        let (next, event) = doc_lifecycle::decline(&document, Utc::now())?;
        store::documents::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(next)
    }

    pub async fn mark_invoice_paid(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch(&mut tx, id).await?;

        let (next, event) = doc_lifecycle::mark_paid(&document, Utc::now())?;
        store::documents::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;

        tx.commit().await?;
        tracing::info!(document = %next.id.0, "invoice paid");
        Ok(next)
    }

    /// Returns the promoted invoice when the effects included a promotion.
    async fn apply_document_effects(
        &self,
        conn: &mut SqliteConnection,
        ro: RepairOrder,
        effects: Vec<DocumentEffect>,
    ) -> Result<Option<Document>, StoreError> {
        let mut current = ro;
        let mut promoted = None;
        for effect in effects {
            match effect {
                DocumentEffect::MarkEstimateSent => {
                    if current.status == RepairOrderStatus::Open {
                        current.status = RepairOrderStatus::EstimateSent;
                        store::repair_orders::update(&mut *conn, &current).await?;
                    }
                }
                DocumentEffect::SetRepairOrderWorkInProgress => {
                    current.status = RepairOrderStatus::WorkInProgress;
                    store::repair_orders::update(&mut *conn, &current).await?;
                }
                DocumentEffect::PromoteInvoice => {
                    promoted = self.promote_invoice(&mut *conn, &current.id).await?;
                }
            }
        }
        Ok(promoted)
    }

    /// Full overwrite of the invoice from the current estimate, then a
    /// recompute. A frozen invoice is returned as it stands; the replacement
    /// step is skipped.
    async fn promote_invoice(
        &self,
        conn: &mut SqliteConnection,
        ro_id: &RepairOrderId,
    ) -> Result<Option<Document>, StoreError> {
        let Some(estimate) =
            store::documents::fetch_for_ro(&mut *conn, ro_id, DocType::Estimate).await?
        else {
            return Ok(None);
        };
        let estimate_items =
            store::line_items::list_for_document(&mut *conn, &estimate.id).await?;
        let invoice = get_or_create(&mut *conn, ro_id, DocType::Invoice).await?;

        match promotion::plan(&estimate_items, &invoice) {
            PromotionPlan::Skip => Ok(Some(invoice)),
            PromotionPlan::Replace(copies) => {
                store::line_items::delete_for_document(&mut *conn, &invoice.id).await?;
                let now = Utc::now();
                for priced in copies {
                    let item = materialize_item(priced, invoice.id.clone(), now);
                    store::line_items::insert(&mut *conn, &item).await?;
                }
                self.recalc_and_store(&mut *conn, &invoice).await?;
                // Re-read so the caller sees the recomputed totals.
                Ok(Some(store::documents::fetch(&mut *conn, &invoice.id).await?))
            }
        }
    }
}

pub(crate) async fn get_or_create(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
    doc_type: DocType,
) -> Result<Document, StoreError> {
    if let Some(existing) = store::documents::fetch_for_ro(&mut *conn, ro_id, doc_type).await? {
        return Ok(existing);
    }

    let document = Document {
        id: DocumentId(new_id()),
        ro_id: ro_id.clone(),
        doc_type,
        version: 1,
        status: DocumentStatus::Draft,
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
        sent_at: None,
        locked_at: None,
        share_token: None,
        created_at: Utc::now(),
    };
    store::documents::insert(&mut *conn, &document).await?;
    Ok(document)
}
