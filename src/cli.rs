//! CLI interface for Roster.
//!
//! `roster` with no subcommand opens the interactive console. Every
//! subcommand is non-interactive: arguments in, structured output out —
//! suited to scripts and capacity-planning spreadsheets.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::directory::{DirectorySeed, FileDirectory, FixtureDirectory, ResourceDirectory};
use crate::export;
use crate::model::SkillLevel;
use crate::store::{AlignmentStore, ResourceFilter};
use crate::tui;

/// Roster — align people to the application.
#[derive(Debug, Parser)]
#[command(name = "roster", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Operator recorded on saved snapshots (e.g. `--as jmills`).
    #[arg(long = "as", global = true)]
    operator: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

const WORKFLOW_HELP: &str = r"Workflow: reviewing alignment before a capacity meeting
  1. roster summary
  2. roster list --skill expert
  3. roster export --format csv --out capability.csv
  4. roster               (open the console, adjust allocations, save)

Filters compose:
  roster list --search kumar --skill advanced
  roster list --lob Treasury --terminated";

#[derive(Debug, Subcommand)]
enum Command {
    /// List resources, optionally filtered.
    ///
    /// Filters are independent and combine with AND.
    List {
        /// Case-insensitive substring match against name, role, or LOB.
        #[arg(long)]
        search: Option<String>,

        /// Exact skill tier.
        #[arg(long, value_enum)]
        skill: Option<SkillArg>,

        /// Substring match against LOB or LOB detail.
        #[arg(long)]
        lob: Option<String>,

        /// Show terminated resources instead of active ones.
        #[arg(long)]
        terminated: bool,
    },

    /// List staffing gaps.
    Gaps,

    /// Print summary metrics.
    Summary,

    /// Export the current resource set to a file.
    ///
    /// JSON carries the full records; CSV is the capability matrix
    /// (active headcount by role and skill tier).
    Export {
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Output path. Defaults to `resources.json` or `capability.csv`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check every resource's allocation and report errors.
    Validate,
}

/// CLI-facing skill tier, mapped to the domain `SkillLevel`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SkillArg {
    Basic,
    Advanced,
    Expert,
}

impl SkillArg {
    fn to_domain(self) -> SkillLevel {
        match self {
            Self::Basic => SkillLevel::Basic,
            Self::Advanced => SkillLevel::Advanced,
            Self::Expert => SkillLevel::Expert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();
    let seed = load_directory(config)?;

    match cli.command {
        None => tui::run(config, seed, cli.operator.as_deref()),
        Some(Command::List {
            search,
            skill,
            lob,
            terminated,
        }) => cmd_list(
            config,
            seed,
            search.as_deref(),
            skill.map(SkillArg::to_domain),
            lob,
            terminated,
        ),
        Some(Command::Gaps) => cmd_gaps(config, seed),
        Some(Command::Summary) => cmd_summary(config, seed),
        Some(Command::Export { format, out }) => cmd_export(config, seed, format, out),
        Some(Command::Validate) => cmd_validate(config, seed),
    }
}

/// Seed from the configured JSON extract when present, otherwise the
/// built-in fixture.
fn load_directory(config: &Config) -> Result<DirectorySeed, String> {
    match &config.directory_file {
        Some(path) => FileDirectory::new(path)
            .load()
            .map_err(|e| format!("failed to load directory {}: {e}", path.display())),
        None => FixtureDirectory
            .load()
            .map_err(|e| format!("failed to load directory fixture: {e}")),
    }
}

fn build_store(config: &Config, seed: DirectorySeed) -> AlignmentStore {
    AlignmentStore::new(
        seed,
        config.headcount_requirement,
        config.aligned_outside_count,
    )
}

fn cmd_list(
    config: &Config,
    seed: DirectorySeed,
    search: Option<&str>,
    skill: Option<SkillLevel>,
    lob: Option<String>,
    terminated: bool,
) -> Result<(), String> {
    let store = build_store(config, seed);

    let filter = ResourceFilter {
        search: search.unwrap_or_default().to_string(),
        skill_level: skill,
        lob,
    };
    let resources: Vec<_> = store
        .filtered_resources(&filter)
        .into_iter()
        .filter(|r| r.is_terminated == terminated)
        .collect();

    if resources.is_empty() {
        println!("No resources");
        return Ok(());
    }

    for r in &resources {
        let flag = if r.is_terminated { " [terminated]" } else { "" };
        println!(
            "{:>3}  {:<24} {:<18} {:<9} {:>4}%  {}{flag}",
            r.id,
            r.name,
            r.role,
            r.skill_level.label(),
            r.percent_allocated,
            r.lob,
        );
    }
    Ok(())
}

fn cmd_gaps(config: &Config, seed: DirectorySeed) -> Result<(), String> {
    let store = build_store(config, seed);
    let gaps = store.gaps();

    if gaps.is_empty() {
        println!("No staffing gaps");
        return Ok(());
    }

    for g in &gaps {
        // Overfilled roles read as surplus rather than a negative shortfall.
        let balance = if g.gap() < 0 {
            format!("surplus {}", -g.gap())
        } else {
            format!("short {}", g.shortfall())
        };
        println!(
            "{:>3}  {:<18} {:<9} filled {}/{} ({balance})  [{}] [{}]",
            g.id,
            g.role,
            g.skill_level.label(),
            g.current_count,
            g.required_count,
            g.priority.label(),
            g.status.label(),
        );
    }
    Ok(())
}

fn cmd_summary(config: &Config, seed: DirectorySeed) -> Result<(), String> {
    let store = build_store(config, seed);
    let metrics = store.metrics();

    println!("Resources allocated:   {}", metrics.total_resources_allocated);
    println!("Headcount conversion:  {:.2} FTE", metrics.headcount_conversion);
    println!("Headcount requirement: {:.2} FTE", metrics.headcount_requirement);
    println!("Aligned outside:       {}", metrics.aligned_outside_count);
    println!("Terminated on roster:  {}", store.terminated_resources().len());
    Ok(())
}

fn cmd_export(
    config: &Config,
    seed: DirectorySeed,
    format: FormatArg,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let store = build_store(config, seed);
    let resources = store.resources();

    match format {
        FormatArg::Json => {
            let path = out.unwrap_or_else(|| PathBuf::from("resources.json"));
            export::write_resources_json(&path, &resources, &store.gaps(), &store.metrics())
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Exported {} resources → {}", resources.len(), path.display());
        }
        FormatArg::Csv => {
            let path = out.unwrap_or_else(|| PathBuf::from("capability.csv"));
            export::write_capability_csv(&path, &resources)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Exported capability matrix → {}", path.display());
        }
    }
    Ok(())
}

fn cmd_validate(config: &Config, seed: DirectorySeed) -> Result<(), String> {
    let store = build_store(config, seed);
    let outcome = store.validate_all();

    if outcome.is_valid() {
        println!("All allocations within range");
        return Ok(());
    }

    for (key, message) in outcome.errors() {
        println!("{key}: {message}");
    }
    Err(format!("{} allocation error(s)", outcome.errors().len()))
}
