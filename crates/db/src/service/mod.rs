//! Transactional operations over the shop database.
//!
//! Each public method opens one transaction, runs the relevant pure
//! transition from `bayline_core`, applies its side effects and audit
//! events, and commits. Readers get whatever the last committed
//! transaction left behind.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqliteConnection;

use bayline_core::config::PricingConfig;
use bayline_core::domain::document::Document;
use bayline_core::domain::job::JobId;
use bayline_core::domain::repair_order::{RepairOrder, RepairOrderStatus};
use bayline_core::lifecycle::JobEffect;
use bayline_core::pricing::{totals, DocumentTotals, MatrixResolver};
use bayline_core::AuditEvent;

use crate::connection::DbPool;
use crate::store::{self, StoreError};

mod documents;
mod jobs;
mod line_items;
mod matrix;
mod repair_orders;
mod reports;
mod share;

pub use documents::ApprovedEstimate;
pub use line_items::LineItemPatch;
pub use matrix::MatrixTiers;
pub use repair_orders::RepairOrderDetail;
pub use share::SharedDocument;

pub struct ShopService {
    pool: DbPool,
    pricing: PricingConfig,
}

impl ShopService {
    pub fn new(pool: DbPool, pricing: PricingConfig) -> Self {
        Self { pool, pricing }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) async fn load_matrix(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<MatrixResolver, StoreError> {
        let labor = store::matrix::list_labor_tiers(&mut *conn).await?;
        let parts = store::matrix::list_parts_tiers(&mut *conn).await?;
        Ok(MatrixResolver::new(labor, parts, &self.pricing))
    }

    /// Recompute and persist totals for one document. Frozen documents are
    /// left untouched and report `None`.
    pub(crate) async fn recalc_and_store(
        &self,
        conn: &mut SqliteConnection,
        document: &Document,
    ) -> Result<Option<DocumentTotals>, StoreError> {
        let items = store::line_items::list_for_document(&mut *conn, &document.id).await?;
        let declined: HashSet<JobId> = store::jobs::declined_job_ids(&mut *conn, &document.ro_id)
            .await?
            .into_iter()
            .collect();

        match totals::recalculate(document, &items, &declined, self.pricing.tax_rate) {
            Some(result) => {
                store::documents::update_totals(&mut *conn, &document.id, &result).await?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Recompute every unlocked document on a repair order, after a change
    /// that shifts which items count (job declined, job deleted).
    pub(crate) async fn recalc_ro_documents(
        &self,
        conn: &mut SqliteConnection,
        ro_id: &bayline_core::RepairOrderId,
    ) -> Result<(), StoreError> {
        let documents = store::documents::list_for_ro(&mut *conn, ro_id).await?;
        for document in &documents {
            self.recalc_and_store(&mut *conn, document).await?;
        }
        Ok(())
    }

    /// Pull a waiting repair order into `work_in_progress`. Orders already
    /// in progress or beyond are left alone.
    pub(crate) async fn promote_repair_order(
        &self,
        conn: &mut SqliteConnection,
        ro: RepairOrder,
    ) -> Result<RepairOrder, StoreError> {
        if !matches!(ro.status, RepairOrderStatus::Open | RepairOrderStatus::EstimateSent) {
            return Ok(ro);
        }

        let mut next = ro;
        next.status = RepairOrderStatus::WorkInProgress;
        store::repair_orders::update(&mut *conn, &next).await?;
        Ok(next)
    }

    /// Close a repair order because its last open job completed. Idempotent:
    /// an already closed order emits no second `ro_completed` event.
    pub(crate) async fn close_repair_order(
        &self,
        conn: &mut SqliteConnection,
        ro: RepairOrder,
    ) -> Result<RepairOrder, StoreError> {
        if ro.status == RepairOrderStatus::Closed {
            return Ok(ro);
        }

        let now = Utc::now();
        let mut next = ro;
        next.status = RepairOrderStatus::Closed;
        next.closed_at = Some(now);
        store::repair_orders::update(&mut *conn, &next).await?;

        let event = AuditEvent::new(
            next.id.clone(),
            "ro_completed",
            None,
            Some(now.to_rfc3339()),
            now,
        );
        store::audit::append(&mut *conn, &event).await?;

        tracing::info!(ro_number = next.ro_number, "repair order closed");
        Ok(next)
    }

    pub(crate) async fn apply_job_effects(
        &self,
        conn: &mut SqliteConnection,
        ro: RepairOrder,
        effects: Vec<JobEffect>,
    ) -> Result<RepairOrder, StoreError> {
        let mut current = ro;
        for effect in effects {
            current = match effect {
                JobEffect::PromoteRepairOrder => {
                    self.promote_repair_order(&mut *conn, current).await?
                }
                JobEffect::CloseRepairOrder => self.close_repair_order(&mut *conn, current).await?,
                JobEffect::CreditTechnician { tech_id, hours } => {
                    store::technicians::credit_hours(&mut *conn, &tech_id, hours).await?;
                    current
                }
            };
        }
        Ok(current)
    }
}
