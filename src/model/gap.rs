//! Staffing gap types: unmet requirements against the application.

use serde::{Deserialize, Serialize};

use super::resource::SkillLevel;

/// An unmet staffing requirement for a role at a skill tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGap {
    /// Opaque identifier, unique within the store.
    pub id: String,

    pub role: String,

    pub skill_level: SkillLevel,

    /// Positions the application needs filled.
    pub required_count: u32,

    /// Positions currently filled.
    pub current_count: u32,

    pub priority: GapPriority,

    pub status: GapStatus,
}

impl ResourceGap {
    /// Required minus current. Negative means the role is overfilled.
    pub fn gap(&self) -> i64 {
        i64::from(self.required_count) - i64::from(self.current_count)
    }

    /// Unfilled positions, clamped at zero. What the screens display.
    pub fn shortfall(&self) -> u32 {
        self.required_count.saturating_sub(self.current_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapPriority {
    High,
    Medium,
    Low,
}

impl GapPriority {
    pub fn label(self) -> &'static str {
        match self {
            GapPriority::High => "High",
            GapPriority::Medium => "Medium",
            GapPriority::Low => "Low",
        }
    }
}

/// Where a gap stands in its fill workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapStatus {
    Open,
    InProgress,
    Filled,
}

impl GapStatus {
    pub fn label(self) -> &'static str {
        match self {
            GapStatus::Open => "Open",
            GapStatus::InProgress => "In Progress",
            GapStatus::Filled => "Filled",
        }
    }

    /// The next status in the cycle Open → In Progress → Filled → Open.
    pub fn next(self) -> GapStatus {
        match self {
            GapStatus::Open => GapStatus::InProgress,
            GapStatus::InProgress => GapStatus::Filled,
            GapStatus::Filled => GapStatus::Open,
        }
    }
}

/// Input for creating a gap. The store assigns the id; new gaps start Open.
#[derive(Debug, Clone)]
pub struct GapDraft {
    pub role: String,
    pub skill_level: SkillLevel,
    pub required_count: u32,
    pub current_count: u32,
    pub priority: GapPriority,
}
