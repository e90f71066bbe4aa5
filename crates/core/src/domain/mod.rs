pub mod document;
pub mod job;
pub mod line_item;
pub mod matrix;
pub mod repair_order;
pub mod technician;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customers are managed by an external CRUD surface; the engine only holds
/// the reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Vehicles are managed by an external CRUD surface; the engine only holds
/// the reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub String);

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
