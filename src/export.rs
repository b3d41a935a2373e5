//! Export: files representing the current resource set.
//!
//! Two shapes: a JSON export carrying the full records, and a CSV
//! capability matrix counting active resources by role and skill tier.

use std::{fs, io, path::Path};

use jiff::Timestamp;
use serde::Serialize;

use crate::model::{Resource, ResourceGap, SkillLevel, SummaryMetrics};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The JSON export payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceExport<'a> {
    exported_at: Timestamp,
    resources: &'a [Resource],
    gaps: &'a [ResourceGap],
    metrics: &'a SummaryMetrics,
}

/// Writes the full resource set as pretty-printed JSON.
pub fn write_resources_json(
    path: &Path,
    resources: &[Resource],
    gaps: &[ResourceGap],
    metrics: &SummaryMetrics,
) -> Result<(), ExportError> {
    let export = ResourceExport {
        exported_at: Timestamp::now(),
        resources,
        gaps,
        metrics,
    };
    let json = serde_json::to_string_pretty(&export)?;
    fs::write(path, json)?;
    Ok(())
}

/// One row of the capability matrix: active headcount for a role at each
/// tier.
#[derive(Debug, PartialEq, Eq)]
pub struct CapabilityRow {
    pub role: String,
    pub basic: u32,
    pub advanced: u32,
    pub expert: u32,
}

/// Counts active resources by role and skill tier. Terminated resources
/// carry no capability. Row order is first-seen role order.
pub fn capability_matrix(resources: &[Resource]) -> Vec<CapabilityRow> {
    let mut rows: Vec<CapabilityRow> = Vec::new();
    for r in resources.iter().filter(|r| !r.is_terminated) {
        let row = match rows.iter_mut().find(|row| row.role == r.role) {
            Some(row) => row,
            None => {
                rows.push(CapabilityRow {
                    role: r.role.clone(),
                    basic: 0,
                    advanced: 0,
                    expert: 0,
                });
                rows.last_mut().unwrap()
            }
        };
        match r.skill_level {
            SkillLevel::Basic => row.basic += 1,
            SkillLevel::Advanced => row.advanced += 1,
            SkillLevel::Expert => row.expert += 1,
        }
    }
    rows
}

/// Writes the capability matrix as CSV with a header row.
pub fn write_capability_csv(path: &Path, resources: &[Resource]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Role", "Basic", "Advanced", "Expert"])?;
    for row in capability_matrix(resources) {
        let counts = [
            row.basic.to_string(),
            row.advanced.to_string(),
            row.expert.to_string(),
        ];
        writer.write_record([
            row.role.as_str(),
            counts[0].as_str(),
            counts[1].as_str(),
            counts[2].as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::directory::{FixtureDirectory, ResourceDirectory};

    #[test]
    fn matrix_counts_active_resources_only() {
        let seed = FixtureDirectory.load().unwrap();
        let rows = capability_matrix(&seed.resources);

        // Terminated developers ("6" Basic, "8" Expert) are excluded.
        let developers = rows.iter().find(|r| r.role == "Developer").unwrap();
        assert_eq!(developers.basic, 1);
        assert_eq!(developers.advanced, 4);
        assert_eq!(developers.expert, 0);

        let leads = rows.iter().find(|r| r.role == "Tech Lead").unwrap();
        assert_eq!(leads.expert, 2);
    }

    #[test]
    fn matrix_rows_follow_first_seen_role_order() {
        let seed = FixtureDirectory.load().unwrap();
        let rows = capability_matrix(&seed.resources);
        let roles: Vec<&str> = rows.iter().map(|r| r.role.as_str()).collect();
        assert_eq!(
            roles,
            vec!["Tech Lead", "Developer", "Business Analyst", "Tester"]
        );
    }

    #[test]
    fn csv_has_header_and_one_row_per_role() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capability.csv");
        let seed = FixtureDirectory.load().unwrap();

        write_capability_csv(&path, &seed.resources).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Role,Basic,Advanced,Expert");
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().any(|l| l.starts_with("Developer,")));
    }

    #[test]
    fn json_export_writes_all_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resources.json");
        let seed = FixtureDirectory.load().unwrap();
        let metrics = SummaryMetrics {
            total_resources_allocated: 11,
            headcount_conversion: 8.30,
            headcount_requirement: 10.0,
            aligned_outside_count: 2,
        };

        write_resources_json(&path, &seed.resources, &seed.gaps, &metrics).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["resources"].as_array().unwrap().len(), 13);
        assert_eq!(json["gaps"].as_array().unwrap().len(), 3);
        assert_eq!(json["metrics"]["headcountConversion"], 8.30);
    }
}
