use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::audit::AuditEvent;
use crate::domain::job::{Job, JobStatus};
use crate::domain::repair_order::RepairOrderStatus;
use crate::domain::technician::TechnicianId;
use crate::errors::DomainError;

/// What the transition needs to know about the surrounding repair order.
/// `open_sibling_jobs` counts jobs on the same order, excluding this one,
/// that are not yet completed.
#[derive(Clone, Copy, Debug)]
pub struct JobContext {
    pub ro_status: RepairOrderStatus,
    pub open_sibling_jobs: usize,
}

/// Side effects the caller must apply in the same transaction as the job
/// update itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobEffect {
    /// Move the repair order to `work_in_progress`.
    PromoteRepairOrder,
    /// Every job on the order is now complete; close the order.
    CloseRepairOrder,
    /// Add billed hours to a technician's running total.
    CreditTechnician { tech_id: TechnicianId, hours: Decimal },
}

/// Manual status change on a job. Approving or starting work pulls a
/// still-open repair order along into `work_in_progress`; completing the
/// last open job closes the order.
pub fn set_status(
    job: &Job,
    new_status: JobStatus,
    ctx: &JobContext,
    now: DateTime<Utc>,
) -> (Job, Vec<JobEffect>, AuditEvent) {
    let mut next = job.clone();
    let old_status = job.status;
    next.status = new_status;

    if new_status == JobStatus::Completed && next.completed_at.is_none() {
        next.completed_at = Some(now);
    }

    let mut effects = Vec::new();
    if matches!(new_status, JobStatus::Approved | JobStatus::WorkInProgress)
        && matches!(ctx.ro_status, RepairOrderStatus::Open | RepairOrderStatus::EstimateSent)
    {
        effects.push(JobEffect::PromoteRepairOrder);
    }
    if new_status == JobStatus::Completed && ctx.open_sibling_jobs == 0 {
        effects.push(JobEffect::CloseRepairOrder);
    }

    let event = AuditEvent::new(
        job.ro_id.clone(),
        "job_status",
        Some(format!("{}:{}", job.title, old_status.as_str())),
        Some(format!("{}:{}", job.title, new_status.as_str())),
        now,
    );

    (next, effects, event)
}

/// Complete a job as part of the work-done flow, optionally assigning the
/// technician who did it and crediting them with the billed hours. Already
/// completed jobs are not re-stamped or re-credited, but the close check
/// still runs so a straggling order can catch up.
pub fn complete(
    job: &Job,
    tech_id: Option<TechnicianId>,
    billed_hours: Decimal,
    ctx: &JobContext,
    now: DateTime<Utc>,
) -> (Job, Vec<JobEffect>, Vec<AuditEvent>) {
    let mut next = job.clone();
    let mut effects = Vec::new();
    let mut events = Vec::new();

    if let Some(ref tech) = tech_id {
        next.tech_id = Some(tech.clone());
    }

    if !job.status.is_completed() {
        next.status = JobStatus::Completed;
        next.completed_at = Some(now);
        events.push(AuditEvent::new(
            job.ro_id.clone(),
            "job_completed",
            None,
            Some(job.title.clone()),
            now,
        ));

        if let Some(tech) = tech_id {
            if billed_hours > Decimal::ZERO {
                effects.push(JobEffect::CreditTechnician { tech_id: tech, hours: billed_hours });
            }
        }
    }

    if ctx.open_sibling_jobs == 0 {
        effects.push(JobEffect::CloseRepairOrder);
    }

    (next, effects, events)
}

/// Status change through a share link. Customers may only approve or
/// decline; anything else is rejected before touching the job.
pub fn share_set_status(
    job: &Job,
    new_status: JobStatus,
    ctx: &JobContext,
    now: DateTime<Utc>,
) -> Result<(Job, Vec<JobEffect>, AuditEvent), DomainError> {
    if !matches!(new_status, JobStatus::Approved | JobStatus::Declined) {
        return Err(DomainError::InvalidTransition {
            entity: "job",
            value: new_status.as_str().to_string(),
        });
    }
    Ok(set_status(job, new_status, ctx, now))
}
