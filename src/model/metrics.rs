//! Summary metrics: the derived staffing snapshot.

use serde::{Deserialize, Serialize};

/// A derived snapshot, not independently authoritative.
///
/// The first two fields are recomputed from active resources at the save
/// boundary. The last two are externally supplied configuration and are
/// never derived from resource records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    /// Count of active (non-terminated) resources.
    pub total_resources_allocated: usize,

    /// Total FTE across active resources, rounded to two decimal places.
    pub headcount_conversion: f64,

    /// Target FTE for the application, from capacity planning.
    pub headcount_requirement: f64,

    /// Resources aligned to the application outside this tracking system.
    pub aligned_outside_count: u32,
}
