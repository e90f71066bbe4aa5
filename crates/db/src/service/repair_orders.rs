use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;

use bayline_core::audit::AuditEvent;
use bayline_core::domain::job::{Job, JobId, JobStatus};
use bayline_core::domain::repair_order::{RepairOrder, RepairOrderId, RepairOrderStatus};
use bayline_core::domain::{new_id, CustomerId, VehicleId};
use bayline_core::lifecycle::repair_order as ro_lifecycle;
use bayline_core::Document;

use super::ShopService;
use crate::store::{self, StoreError};

/// Everything a caller needs to render one repair order.
#[derive(Debug, Serialize)]
pub struct RepairOrderDetail {
    pub repair_order: RepairOrder,
    pub jobs: Vec<Job>,
    pub documents: Vec<Document>,
    pub events: Vec<AuditEvent>,
}

impl ShopService {
    /// Open a new repair order. The order gets the next sequential number,
    /// a starter job named after the stated concern, and a `created` event.
    pub async fn create_repair_order(
        &self,
        customer_id: CustomerId,
        vehicle_id: VehicleId,
        concern: Option<String>,
    ) -> Result<RepairOrder, StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let ro = RepairOrder {
            id: RepairOrderId(new_id()),
            ro_number: store::repair_orders::next_ro_number(&mut tx).await?,
            customer_id,
            vehicle_id,
            status: RepairOrderStatus::Open,
            concern,
            opened_at: now,
            closed_at: None,
            deleted_at: None,
        };
        store::repair_orders::insert(&mut tx, &ro).await?;
        ensure_default_job(&mut tx, &ro).await?;

        let event = AuditEvent::new(
            ro.id.clone(),
            "created",
            None,
            Some(ro.ro_number.to_string()),
            now,
        );
        store::audit::append(&mut tx, &event).await?;

        tx.commit().await?;
        tracing::info!(ro_number = ro.ro_number, "repair order created");
        Ok(ro)
    }

    pub async fn list_repair_orders(&self) -> Result<Vec<RepairOrder>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        store::repair_orders::list_active(&mut conn).await
    }

    pub async fn repair_order_detail(
        &self,
        id: &RepairOrderId,
    ) -> Result<RepairOrderDetail, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let repair_order = store::repair_orders::fetch(&mut conn, id).await?;
        let jobs = store::jobs::list_for_ro(&mut conn, id).await?;
        let documents = store::documents::list_for_ro(&mut conn, id).await?;
        let events = store::audit::list_for_ro(&mut conn, id).await?;
        Ok(RepairOrderDetail { repair_order, jobs, documents, events })
    }

    /// Manual status override. Any status in the repair order's vocabulary
    /// is accepted; an unknown value is rejected before anything is written.
    pub async fn set_repair_order_status(
        &self,
        id: &RepairOrderId,
        status: &str,
    ) -> Result<RepairOrder, StoreError> {
        let new_status = RepairOrderStatus::parse(status)?;

        let mut tx = self.pool.begin().await?;
        let ro = store::repair_orders::fetch(&mut tx, id).await?;
        let (next, event) = ro_lifecycle::set_status(&ro, new_status, Utc::now());
        store::repair_orders::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;
        tx.commit().await?;

        Ok(next)
    }

    /// Archive a repair order. Already archived orders come back unchanged.
    pub async fn delete_repair_order(
        &self,
        id: &RepairOrderId,
    ) -> Result<RepairOrder, StoreError> {
        let mut tx = self.pool.begin().await?;
        let ro = store::repair_orders::fetch(&mut tx, id).await?;

        let Some((next, event)) = ro_lifecycle::soft_delete(&ro, Utc::now()) else {
            return Ok(ro);
        };
        store::repair_orders::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;
        tx.commit().await?;

        Ok(next)
    }

    pub async fn audit_trail(&self, id: &RepairOrderId) -> Result<Vec<AuditEvent>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        store::audit::list_for_ro(&mut conn, id).await
    }
}

/// Every repair order carries at least one job; the starter takes the
/// customer's concern as its title when one was given.
pub(crate) async fn ensure_default_job(
    conn: &mut SqliteConnection,
    ro: &RepairOrder,
) -> Result<(), StoreError> {
    if store::jobs::count_for_ro(&mut *conn, &ro.id).await? > 0 {
        return Ok(());
    }

    let job = Job {
        id: JobId(new_id()),
        ro_id: ro.id.clone(),
        title: ro.concern.clone().unwrap_or_else(|| "Job 1".to_string()),
        status: JobStatus::Pending,
        sort_order: 0,
        tech_id: None,
        completed_at: None,
        created_at: Utc::now(),
    };
    store::jobs::insert(&mut *conn, &job).await
}
