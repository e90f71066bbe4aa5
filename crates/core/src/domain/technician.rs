use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnicianId(pub String);

/// `total_hours` only ever accumulates: job completion credits estimate
/// labor hours and nothing in the engine decrements them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub name: String,
    pub total_hours: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Technician {
    pub fn credited(mut self, hours: Decimal) -> Self {
        if hours > Decimal::ZERO {
            self.total_hours += hours;
        }
        self
    }
}
