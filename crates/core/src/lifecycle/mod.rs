//! Pure lifecycle transitions.
//!
//! Each function takes the current snapshot of an entity plus whatever
//! context the decision needs, and returns the next snapshot together with
//! the side effects and audit events the caller must apply in the same
//! transaction. Nothing here touches storage.

pub mod document;
pub mod job;
pub mod repair_order;

pub use document::DocumentEffect;
pub use job::{JobContext, JobEffect};
