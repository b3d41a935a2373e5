//! Save snapshot: the unit handed to a persistence backend.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Resource, ResourceGap, SummaryMetrics};

/// The full alignment state captured at a save, with attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: Uuid,

    /// Operator who performed the save.
    pub saved_by: String,

    pub saved_at: Timestamp,

    pub resources: Vec<Resource>,

    pub gaps: Vec<ResourceGap>,

    pub metrics: SummaryMetrics,
}
