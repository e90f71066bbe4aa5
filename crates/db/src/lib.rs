pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod service;
pub mod store;

pub use connection::{connect, DbPool};
pub use fixtures::SeedDataset;
pub use service::{
    ApprovedEstimate, LineItemPatch, MatrixTiers, RepairOrderDetail, SharedDocument, ShopService,
};
pub use store::StoreError;
