use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::repair_order::RepairOrderId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Estimate,
    Invoice,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Invoice => "invoice",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "estimate" => Ok(Self::Estimate),
            "invoice" => Ok(Self::Invoice),
            other => {
                Err(DomainError::InvalidTransition { entity: "document", value: other.to_string() })
            }
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Approved,
    Declined,
    Locked,
    Paid,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Locked => "locked",
            Self::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            "locked" => Ok(Self::Locked),
            "paid" => Ok(Self::Paid),
            other => {
                Err(DomainError::InvalidTransition { entity: "document", value: other.to_string() })
            }
        }
    }
}

/// A priced snapshot (estimate or invoice) of a repair order's line items.
/// Exactly one version-1 document per (repair order, doc type) pair is the
/// working copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub ro_id: RepairOrderId,
    pub doc_type: DocType,
    pub version: i64,
    pub status: DocumentStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub sent_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Frozen documents never have their money fields or line items touched
    /// again. A lock timestamp freezes a document even if the status column
    /// disagrees.
    pub fn is_frozen(&self) -> bool {
        matches!(self.status, DocumentStatus::Locked | DocumentStatus::Paid)
            || self.locked_at.is_some()
    }
}
