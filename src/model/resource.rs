//! Resource types: people aligned to the application.

use serde::{Deserialize, Serialize};

/// A person allocated to supporting the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Opaque identifier, unique within the store.
    pub id: String,

    /// Display name, "Last, First" convention.
    pub name: String,

    /// Profile image reference.
    pub image: String,

    /// The resource's manager, same name convention.
    pub manager: String,

    /// Line of business: a free-text organizational name.
    /// The first whitespace-delimited token acts as a coarse grouping key.
    pub lob: String,

    /// Finer-grained organizational detail under the LOB.
    pub lob_detail: String,

    /// Role on the application (Developer, Tester, ...).
    pub role: String,

    pub skill_level: SkillLevel,

    /// Percent of one full-time-equivalent committed to this application.
    ///
    /// Conceptually in [0, 100]. Out-of-range input is stored verbatim and
    /// reported by validation, never clamped.
    pub percent_allocated: i32,

    /// Terminated resources are kept for historical display and excluded
    /// from active aggregates. Never deleted.
    pub is_terminated: bool,
}

/// Capability tier. Ordered `Basic < Advanced < Expert`; the ordering
/// drives display grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
    Basic,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// All tiers in display order.
    pub const ALL: [SkillLevel; 3] = [SkillLevel::Basic, SkillLevel::Advanced, SkillLevel::Expert];

    pub fn label(self) -> &'static str {
        match self {
            SkillLevel::Basic => "Basic",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }
}
