pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod share;

pub use audit::AuditEvent;
pub use config::{AppConfig, ConfigOverrides, LoadOptions, PricingConfig};
pub use domain::document::{DocType, Document, DocumentId, DocumentStatus};
pub use domain::job::{Job, JobId, JobStatus};
pub use domain::line_item::{ItemType, LineItem, LineItemId};
pub use domain::repair_order::{RepairOrder, RepairOrderId, RepairOrderStatus};
pub use domain::technician::{Technician, TechnicianId};
pub use errors::DomainError;
pub use lifecycle::{DocumentEffect, JobContext, JobEffect};
pub use pricing::{
    price_line_item, DocumentTotals, LineItemRequest, MatrixResolver, PricedLineItem,
    ProfitSummary,
};
pub use promotion::PromotionPlan;
pub use share::mint_share_token;
