use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentId;
use crate::domain::job::JobId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Labor,
    Part,
    Fee,
    Discount,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Part => "part",
            Self::Fee => "fee",
            Self::Discount => "discount",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "labor" => Ok(Self::Labor),
            "part" => Ok(Self::Part),
            "fee" => Ok(Self::Fee),
            "discount" => Ok(Self::Discount),
            other => Err(DomainError::ValidationFailed {
                item_type: other.to_string(),
                field: "item_type",
            }),
        }
    }
}

/// One billable entry on a document. `job_id = None` is the unassigned
/// bucket: still counted in totals unless its job is declined (impossible by
/// definition for unassigned items).
///
/// For labor items `qty` mirrors `labor_hours`; the two stay separate fields
/// because profit-per-hour reporting reads `labor_hours` independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub document_id: DocumentId,
    pub job_id: Option<JobId>,
    pub item_type: ItemType,
    pub description: String,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub taxable: bool,
    pub labor_hours: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    /// Signed contribution to the document subtotal. Discounts always
    /// contribute a non-positive amount, whatever sign was stored.
    pub fn amount(&self) -> Decimal {
        let amount = self.qty * self.unit_price;
        match self.item_type {
            ItemType::Discount => -amount.abs(),
            _ => amount,
        }
    }
}
