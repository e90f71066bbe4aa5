use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierId(pub String);

/// Labor pricing rule: hours in `[min_hours, max_hours]` bill at
/// `rate_per_hour`. `max_hours = None` leaves the range unbounded above.
///
/// Ranges are kept non-overlapping by operator convention only; overlap is
/// not validated and resolution is first-match in ascending `min_hours`
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaborMatrixTier {
    pub id: TierId,
    pub min_hours: Decimal,
    pub max_hours: Option<Decimal>,
    pub rate_per_hour: Decimal,
}

/// Parts pricing rule: cost in `[min_cost, max_cost]` marks up by
/// `multiplier`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartsMatrixTier {
    pub id: TierId,
    pub min_cost: Decimal,
    pub max_cost: Option<Decimal>,
    pub multiplier: Decimal,
}
