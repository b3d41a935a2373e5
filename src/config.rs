//! Roster configuration.
//!
//! Loaded from `~/.roster/config.toml`. A missing file falls back to
//! defaults so the console runs out of the box against the built-in
//! directory fixture; an invalid file is an error, never silently
//! ignored.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Target FTE for the application, supplied by capacity planning.
    pub headcount_requirement: f64,

    /// Resources aligned to the application outside this tracking system.
    pub aligned_outside_count: u32,

    /// Default operator recorded on snapshots.
    /// Used when `--as` and `ROSTER_OPERATOR` are absent.
    pub operator: String,

    /// Optional JSON directory extract to seed from instead of the
    /// built-in fixture.
    pub directory_file: Option<PathBuf>,

    /// Upper bound on one save round-trip, in milliseconds. A save that
    /// outlives this is reported as a retryable failure.
    pub save_timeout_ms: u64,

    /// Simulate persistence latency and flakiness in front of the
    /// snapshot store. Useful for demos and for exercising the retry
    /// path.
    pub simulate_save: bool,

    /// Base latency of the simulated round-trip, in milliseconds.
    pub simulated_latency_ms: u64,

    /// Probability in [0, 1] that a simulated save fails.
    pub simulated_failure_chance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headcount_requirement: 10.0,
            aligned_outside_count: 2,
            operator: String::new(),
            directory_file: None,
            save_timeout_ms: 10_000,
            simulate_save: false,
            simulated_latency_ms: 400,
            simulated_failure_chance: 0.1,
        }
    }
}

impl Config {
    /// Load config from `~/.roster/config.toml`, defaulting when the
    /// file is missing.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Err("could not determine home directory".to_string());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if !(0.0..=1.0).contains(&config.simulated_failure_chance) {
            return Err(format!(
                "simulated-failure-chance must be between 0 and 1 in {}",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.roster/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roster").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.headcount_requirement > 0.0);
        assert!(!config.simulate_save);
        assert!((0.0..=1.0).contains(&config.simulated_failure_chance));
    }

    #[test]
    fn kebab_case_keys_parse() {
        let config: Config = toml::from_str(
            r#"
            headcount-requirement = 12.5
            aligned-outside-count = 3
            operator = "jmills"
            simulate-save = true
            "#,
        )
        .unwrap();

        assert!((config.headcount_requirement - 12.5).abs() < f64::EPSILON);
        assert_eq!(config.aligned_outside_count, 3);
        assert_eq!(config.operator, "jmills");
        assert!(config.simulate_save);
        // Unspecified keys keep their defaults.
        assert_eq!(config.save_timeout_ms, 10_000);
    }
}
