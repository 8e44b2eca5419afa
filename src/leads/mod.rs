//! Lead collection: store/reconciler plus the read-only projections
//! (search filter and dashboard statistics) computed from it.

pub mod filter;
pub mod stats;
pub mod store;

pub use filter::filter_leads;
pub use stats::{compute_stats, ActivityPoint, DashboardStats, FunnelStage};
pub use store::{Confirm, LeadStore, Operation, DELETE_PROMPT};
