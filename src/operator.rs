//! Operator resolution for snapshot attribution.
//!
//! Every save records who performed it. Rather than requiring `--as` on
//! every invocation, the operator resolves through a chain:
//!
//! 1. `--as <name>` — explicit per-invocation override
//! 2. `ROSTER_OPERATOR` env var — session level (set once per shell)
//! 3. `operator` in `~/.roster/config.toml` — global default
//!
//! This is attribution on the audit trail, not authentication.

use std::env;

use crate::config::Config;

/// Error message shown when the operator cannot be resolved.
pub const OPERATOR_REQUIRED: &str = "operator required: pass --as <name>, \
    set ROSTER_OPERATOR, or add `operator = \"...\"` to ~/.roster/config.toml";

/// Resolve the acting operator from the tiered resolution chain.
///
/// Checks in order: explicit `--as` value, `ROSTER_OPERATOR` env var, the
/// config default. Returns an error with [`OPERATOR_REQUIRED`] when none
/// of the sources yield a value.
pub fn resolve_operator(explicit: Option<&str>, config: &Config) -> Result<String, String> {
    // 1. Explicit --as flag.
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }

    // 2. ROSTER_OPERATOR environment variable.
    if let Ok(name) = env::var("ROSTER_OPERATOR")
        && !name.is_empty()
    {
        return Ok(name);
    }

    // 3. Config default.
    if !config.operator.is_empty() {
        return Ok(config.operator.clone());
    }

    Err(OPERATOR_REQUIRED.to_string())
}
