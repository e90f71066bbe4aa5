use chrono::Utc;
use serde::Serialize;

use bayline_core::domain::document::DocType;
use bayline_core::domain::job::{Job, JobId, JobStatus};
use bayline_core::domain::line_item::LineItem;
use bayline_core::errors::DomainError;
use bayline_core::lifecycle::job as job_lifecycle;
use bayline_core::lifecycle::JobContext;
use bayline_core::Document;

use super::ShopService;
use crate::store::{self, StoreError};

/// Customer-facing view of a shared document.
#[derive(Debug, Serialize)]
pub struct SharedDocument {
    pub document: Document,
    pub jobs: Vec<Job>,
    pub items: Vec<LineItem>,
}

impl ShopService {
    /// Resolve a share token to its document, jobs, and items. An unknown
    /// token reads the same as a missing document.
    pub async fn shared_document(&self, token: &str) -> Result<SharedDocument, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let document = store::documents::fetch_by_share_token(&mut conn, token).await?;
        let jobs = store::jobs::list_for_ro(&mut conn, &document.ro_id).await?;
        let items = store::line_items::list_for_document(&mut conn, &document.id).await?;
        Ok(SharedDocument { document, jobs, items })
    }

    /// Job approval or decline through a share link. Only estimate tokens
    /// carry this authority; an invoice link is read-only. The token also
    /// scopes which jobs are reachable; a job from another repair order is
    /// not found.
    pub async fn share_set_job_status(
        &self,
        token: &str,
        job_id: &JobId,
        status: &str,
    ) -> Result<Job, StoreError> {
        let new_status = JobStatus::parse(status)?;

        let mut tx = self.pool.begin().await?;
        let document = store::documents::fetch_by_share_token(&mut tx, token).await?;
        if document.doc_type != DocType::Estimate {
            return Err(DomainError::WrongDocType {
                expected: DocType::Estimate,
                actual: document.doc_type,
            }
            .into());
        }
        let job = store::jobs::fetch(&mut tx, job_id).await?;
        if job.ro_id != document.ro_id {
            return Err(DomainError::not_found("job", &job_id.0).into());
        }
        let ro = store::repair_orders::fetch(&mut tx, &job.ro_id).await?;
        let ctx = JobContext {
            ro_status: ro.status,
            open_sibling_jobs: store::jobs::count_open_siblings(&mut tx, &ro.id, &job.id).await?,
        };

        let (next, effects, event) =
            job_lifecycle::share_set_status(&job, new_status, &ctx, Utc::now())?;
        store::jobs::update(&mut tx, &next).await?;
        store::audit::append(&mut tx, &event).await?;
        self.apply_job_effects(&mut tx, ro, effects).await?;
        self.recalc_ro_documents(&mut tx, &next.ro_id).await?;

        tx.commit().await?;
        Ok(next)
    }
}
