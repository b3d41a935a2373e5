//! Resource directory providers: where the store's initial records come from.
//!
//! The built-in fixture stands in for the enterprise resource directory
//! that a deployed console would load from. A JSON file provider supports
//! seeding from a real extract instead.
//!
//! Providers hand over well-formed records; field-level invariants are the
//! store's concern.

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{GapPriority, GapStatus, Resource, ResourceGap, SkillLevel};

/// Errors that can occur while loading a directory extract.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The records a provider seeds the store with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    pub resources: Vec<Resource>,
    pub gaps: Vec<ResourceGap>,
}

/// A source of initial resource and gap records.
pub trait ResourceDirectory {
    fn load(&self) -> Result<DirectorySeed, DirectoryError>;
}

/// The built-in seed roster.
pub struct FixtureDirectory;

impl ResourceDirectory for FixtureDirectory {
    fn load(&self) -> Result<DirectorySeed, DirectoryError> {
        Ok(DirectorySeed {
            resources: initial_resources(),
            gaps: initial_gaps(),
        })
    }
}

/// Loads a `DirectorySeed` from a JSON extract on disk.
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResourceDirectory for FileDirectory {
    fn load(&self) -> Result<DirectorySeed, DirectoryError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[allow(clippy::too_many_arguments)] // One call per seed row; a builder would bury the data.
fn resource(
    id: &str,
    name: &str,
    manager: &str,
    lob: &str,
    lob_detail: &str,
    role: &str,
    skill_level: SkillLevel,
    percent_allocated: i32,
    is_terminated: bool,
) -> Resource {
    let image = format!(
        "avatars/{}.png",
        name.replace(", ", "-").replace(' ', "-").to_lowercase()
    );
    Resource {
        id: id.to_string(),
        name: name.to_string(),
        image,
        manager: manager.to_string(),
        lob: lob.to_string(),
        lob_detail: lob_detail.to_string(),
        role: role.to_string(),
        skill_level,
        percent_allocated,
        is_terminated,
    }
}

/// The 13-person seed roster. Resources "6" and "8" are terminated and
/// carry residual allocations that must stay out of active aggregates.
pub fn initial_resources() -> Vec<Resource> {
    use SkillLevel::{Advanced, Basic, Expert};

    vec![
        resource(
            "1",
            "Sharma, Anita",
            "Rao, Prakash",
            "Consumer Banking Technology",
            "Deposits Core",
            "Tech Lead",
            Expert,
            100,
            false,
        ),
        resource(
            "2",
            "Kumar, Anil",
            "Rao, Prakash",
            "Consumer Banking Technology",
            "Deposits Core",
            "Developer",
            Advanced,
            100,
            false,
        ),
        resource(
            "3",
            "Chen, Wei",
            "Rao, Prakash",
            "Payments Technology",
            "Wire Transfers",
            "Developer",
            Basic,
            50,
            false,
        ),
        resource(
            "4",
            "Okafor, Chidi",
            "Mills, Janet",
            "Payments Technology",
            "ACH Origination",
            "Developer",
            Advanced,
            75,
            false,
        ),
        resource(
            "5",
            "Ivanova, Petra",
            "Mills, Janet",
            "Risk Technology",
            "Credit Decisioning",
            "Business Analyst",
            Expert,
            100,
            false,
        ),
        resource(
            "6",
            "Navarro, Luis",
            "Mills, Janet",
            "Risk Technology",
            "Credit Decisioning",
            "Developer",
            Basic,
            5,
            true,
        ),
        resource(
            "7",
            "Kumaraswamy, Devi",
            "Boyd, Alice",
            "Consumer Banking Technology",
            "Statements",
            "Tester",
            Advanced,
            60,
            false,
        ),
        resource(
            "8",
            "Fischer, Hans",
            "Boyd, Alice",
            "Treasury Technology",
            "Liquidity Reporting",
            "Developer",
            Expert,
            3,
            true,
        ),
        resource(
            "9",
            "Boyd, Marcus",
            "Boyd, Alice",
            "Treasury Technology",
            "Cash Forecasting",
            "Developer",
            Advanced,
            100,
            false,
        ),
        resource(
            "10",
            "Haddad, Leila",
            "Mills, Janet",
            "Payments Technology",
            "Real-Time Rails",
            "Tester",
            Basic,
            40,
            false,
        ),
        resource(
            "11",
            "Nguyen, Thao",
            "Rao, Prakash",
            "Consumer Banking Technology",
            "Onboarding",
            "Business Analyst",
            Basic,
            25,
            false,
        ),
        resource(
            "12",
            "Adeyemi, Folake",
            "Boyd, Alice",
            "Risk Technology",
            "Fraud Screening",
            "Developer",
            Advanced,
            80,
            false,
        ),
        resource(
            "13",
            "Rossi, Marco",
            "Mills, Janet",
            "Treasury Technology",
            "Liquidity Reporting",
            "Tech Lead",
            Expert,
            100,
            false,
        ),
    ]
}

/// The seed staffing gaps.
pub fn initial_gaps() -> Vec<ResourceGap> {
    vec![
        ResourceGap {
            id: "g1".to_string(),
            role: "Developer".to_string(),
            skill_level: SkillLevel::Expert,
            required_count: 2,
            current_count: 0,
            priority: GapPriority::High,
            status: GapStatus::Open,
        },
        ResourceGap {
            id: "g2".to_string(),
            role: "Tester".to_string(),
            skill_level: SkillLevel::Advanced,
            required_count: 1,
            current_count: 1,
            priority: GapPriority::Medium,
            status: GapStatus::InProgress,
        },
        ResourceGap {
            id: "g3".to_string(),
            role: "Business Analyst".to_string(),
            skill_level: SkillLevel::Basic,
            required_count: 1,
            current_count: 0,
            priority: GapPriority::Low,
            status: GapStatus::Open,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn fixture_seeds_thirteen_resources() {
        let seed = FixtureDirectory.load().unwrap();
        assert_eq!(seed.resources.len(), 13);
        assert_eq!(seed.gaps.len(), 3);
    }

    #[test]
    fn fixture_terminations_match_roster_history() {
        let seed = FixtureDirectory.load().unwrap();
        let terminated: Vec<&Resource> = seed
            .resources
            .iter()
            .filter(|r| r.is_terminated)
            .collect();

        assert_eq!(terminated.len(), 2);
        assert_eq!(terminated[0].id, "6");
        assert_eq!(terminated[0].percent_allocated, 5);
        assert_eq!(terminated[1].id, "8");
        assert_eq!(terminated[1].percent_allocated, 3);
    }

    #[test]
    fn fixture_ids_are_unique() {
        let seed = FixtureDirectory.load().unwrap();
        for (i, r) in seed.resources.iter().enumerate() {
            assert!(
                !seed.resources[i + 1..].iter().any(|other| other.id == r.id),
                "duplicate id {}",
                r.id
            );
        }
    }

    #[test]
    fn file_directory_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extract.json");

        let seed = FixtureDirectory.load().unwrap();
        let json = serde_json::to_string_pretty(&seed).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = FileDirectory::new(&path).load().unwrap();
        assert_eq!(loaded.resources, seed.resources);
        assert_eq!(loaded.gaps, seed.gaps);
    }

    #[test]
    fn file_directory_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = FileDirectory::new(dir.path().join("missing.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Io(_)));
    }
}
