use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::repair_order::RepairOrderId;
use crate::domain::technician::TechnicianId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Approved,
    WorkInProgress,
    Completed,
    Declined,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::WorkInProgress => "work_in_progress",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "work_in_progress" => Ok(Self::WorkInProgress),
            "completed" => Ok(Self::Completed),
            "declined" => Ok(Self::Declined),
            other => {
                Err(DomainError::InvalidTransition { entity: "job", value: other.to_string() })
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A billable unit of work within a repair order. Every repair order owns at
/// least one job; a default "Job 1" is materialized lazily on first access.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub ro_id: RepairOrderId,
    pub title: String,
    pub status: JobStatus,
    pub sort_order: i64,
    pub tech_id: Option<TechnicianId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::JobStatus;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            JobStatus::Pending,
            JobStatus::Approved,
            JobStatus::WorkInProgress,
            JobStatus::Completed,
            JobStatus::Declined,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn only_completed_counts_as_completed() {
        assert!(JobStatus::Completed.is_completed());
        assert!(!JobStatus::Declined.is_completed());
        assert!(!JobStatus::Pending.is_completed());
    }
}
