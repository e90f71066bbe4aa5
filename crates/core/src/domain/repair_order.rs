use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CustomerId, VehicleId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepairOrderId(pub String);

/// Numbers start at 1001 and are allocated as `max(existing) + 1`.
pub const FIRST_RO_NUMBER: i64 = 1001;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairOrderStatus {
    Open,
    EstimateSent,
    WorkInProgress,
    Closed,
    Canceled,
}

impl RepairOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::EstimateSent => "estimate_sent",
            Self::WorkInProgress => "work_in_progress",
            Self::Closed => "closed",
            Self::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "open" => Ok(Self::Open),
            "estimate_sent" => Ok(Self::EstimateSent),
            "work_in_progress" => Ok(Self::WorkInProgress),
            "closed" => Ok(Self::Closed),
            "canceled" => Ok(Self::Canceled),
            other => Err(DomainError::InvalidTransition {
                entity: "repair_order",
                value: other.to_string(),
            }),
        }
    }
}

/// Top-level ticket for one vehicle visit. Soft deletion (`deleted_at`) is
/// orthogonal to status: archived orders keep their history and stay
/// addressable by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepairOrder {
    pub id: RepairOrderId,
    pub ro_number: i64,
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub status: RepairOrderStatus,
    pub concern: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RepairOrder {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
