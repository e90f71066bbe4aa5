use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use bayline_core::audit::AuditEvent;
use bayline_core::domain::job::{Job, JobId, JobStatus};
use bayline_core::domain::new_id;
use bayline_core::domain::repair_order::RepairOrderId;
use bayline_core::domain::technician::TechnicianId;
use bayline_core::lifecycle::job as job_lifecycle;
use bayline_core::lifecycle::JobContext;
use bayline_core::pricing::totals;
use bayline_core::DocType;

use super::ShopService;
use crate::store::{self, StoreError};

impl ShopService {
    pub async fn add_job(
        &self,
        ro_id: &RepairOrderId,
        title: &str,
    ) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;
        let ro = store::repair_orders::fetch(&mut tx, ro_id).await?;
        let now = Utc::now();

        let job = Job {
            id: JobId(new_id()),
            ro_id: ro.id.clone(),
            title: title.to_string(),
            status: JobStatus::Pending,
            sort_order: store::jobs::next_sort_order(&mut tx, &ro.id).await?,
            tech_id: None,
            completed_at: None,
            created_at: now,
        };
        store::jobs::insert(&mut tx, &job).await?;

        let event =
            AuditEvent::new(ro.id.clone(), "job_added", None, Some(title.to_string()), now);
        store::audit::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(job)
    }

    pub async fn rename_job(&self, id: &JobId, title: &str) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut job = store::jobs::fetch(&mut tx, id).await?;
        let old_title = std::mem::replace(&mut job.title, title.to_string());
        store::jobs::update(&mut tx, &job).await?;

        let event = AuditEvent::new(
            job.ro_id.clone(),
            "job_renamed",
            Some(old_title),
            Some(title.to_string()),
            Utc::now(),
        );
        store::audit::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(job)
    }

    /// Remove a job. Its line items survive in the unassigned bucket, so
    /// totals on unlocked documents are recomputed afterwards.
    pub async fn delete_job(&self, id: &JobId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let job = store::jobs::fetch(&mut tx, id).await?;

        store::line_items::unassign_job(&mut tx, &job.id).await?;
        store::jobs::delete(&mut tx, &job.id).await?;

        let event = AuditEvent::new(
            job.ro_id.clone(),
            "job_deleted",
            Some(job.title.clone()),
            None,
            Utc::now(),
        );
        store::audit::append(&mut tx, &event).await?;

        self.recalc_ro_documents(&mut tx, &job.ro_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Manual job status change, with its cascades: approval or starting
    /// work pulls the repair order along, completing the last open job
    /// closes it, and a decline shifts document totals.
    pub async fn set_job_status(&self, id: &JobId, status: &str) -> Result<Job, StoreError> {
        let new_status = JobStatus::parse(status)?;

        let mut tx = self.pool.begin().await?;
        let job = store::jobs::fetch(&mut tx, id).await?;
        let ro = store::repair_orders::fetch(&mut tx, &job.ro_id).await?;
        let ctx = JobContext {
            ro_status: ro.status,
            open_sibling_jobs: store::jobs::count_open_siblings(&mut tx, &ro.id, &job.id).await?,
        };

        let (next, effects, event) = job_lifecycle::set_status(&job, new_status, &ctx, Utc::now());
        store::jobs::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;
        self.apply_job_effects(&mut tx, ro, effects).await?;
        self.recalc_ro_documents(&mut tx, &next.ro_id).await?;

        tx.commit().await?;
        Ok(next)
    }

    /// Mark a job's work as done. The technician, when named, is credited
    /// with the billed hours: an explicit figure, or the labor hours
    /// recorded on the estimate for this job.
    pub async fn complete_job(
        &self,
        id: &JobId,
        tech_id: Option<TechnicianId>,
        hours: Option<Decimal>,
    ) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;
        let job = store::jobs::fetch(&mut tx, id).await?;
        let ro = store::repair_orders::fetch(&mut tx, &job.ro_id).await?;

        let billed_hours = match hours {
            Some(value) => value,
            None => estimate_labor_hours(&mut tx, &ro.id, &job.id).await?,
        };
        let ctx = JobContext {
            ro_status: ro.status,
            open_sibling_jobs: store::jobs::count_open_siblings(&mut tx, &ro.id, &job.id).await?,
        };

        let (next, effects, events) =
            job_lifecycle::complete(&job, tech_id, billed_hours, &ctx, Utc::now());
        store::jobs::update(&mut tx, &next).await?;
        store::audit::append_all(&mut tx, &events).await?;
        self.apply_job_effects(&mut tx, ro, effects).await?;

        tx.commit().await?;
        tracing::debug!(job = %next.id.0, hours = %billed_hours, "job completed");
        Ok(next)
    }
}

/// Billed hours fall back to the labor recorded on the estimate, the
/// document that captured the approved scope.
async fn estimate_labor_hours(
    conn: &mut SqliteConnection,
    ro_id: &RepairOrderId,
    job_id: &JobId,
) -> Result<Decimal, StoreError> {
    let Some(estimate) =
        store::documents::fetch_for_ro(&mut *conn, ro_id, DocType::Estimate).await?
    else {
        return Ok(Decimal::ZERO);
    };
    let items = store::line_items::list_for_document(&mut *conn, &estimate.id).await?;
    Ok(totals::labor_hours_for_job(&items, job_id))
}
