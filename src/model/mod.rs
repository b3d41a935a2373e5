//! Core data model for Roster.
//!
//! Resources, staffing gaps, summary metrics, the shared validation
//! outcome type, and the snapshot handed to persistence.

mod gap;
mod metrics;
mod resource;
mod snapshot;
mod validation;

pub use gap::{GapDraft, GapPriority, GapStatus, ResourceGap};
pub use metrics::SummaryMetrics;
pub use resource::{Resource, SkillLevel};
pub use snapshot::Snapshot;
pub use validation::{ValidationOutcome, allocation_key};
