//! The alignment store: sole owner of resource, gap, and metrics state.
//!
//! Reads return snapshots; callers can never reach store internals through
//! a returned reference. Mutations mark the store dirty. Derived metrics
//! are recomputed at the save boundary, not on every edit, so aggregates
//! never churn per keystroke.

use std::collections::BTreeMap;

use jiff::Timestamp;
use uuid::Uuid;

use crate::directory::DirectorySeed;
use crate::model::{
    GapDraft, GapStatus, Resource, ResourceGap, SkillLevel, Snapshot, SummaryMetrics,
    ValidationOutcome, allocation_key,
};

/// Filter inputs for [`AlignmentStore::filtered_resources`].
///
/// The three predicates are independent and conjunctive. An empty search
/// and `None` filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Case-insensitive substring match against name, role, or LOB.
    pub search: String,

    /// Exact tier match.
    pub skill_level: Option<SkillLevel>,

    /// Substring containment against LOB or LOB detail.
    pub lob: Option<String>,
}

/// Canonical in-memory state for the resource alignment console.
pub struct AlignmentStore {
    resources: Vec<Resource>,
    gaps: Vec<ResourceGap>,
    metrics: SummaryMetrics,

    // Retained for full-cancel resets.
    seed: DirectorySeed,

    edit_mode: bool,
    dirty: bool,
    validation_errors: BTreeMap<String, String>,
    filter: ResourceFilter,
}

impl AlignmentStore {
    /// Builds a store from a directory seed and the externally supplied
    /// metric inputs. Derived metrics are computed once here so a freshly
    /// loaded console is self-consistent.
    pub fn new(seed: DirectorySeed, headcount_requirement: f64, aligned_outside_count: u32) -> Self {
        let mut store = Self {
            resources: seed.resources.clone(),
            gaps: seed.gaps.clone(),
            metrics: SummaryMetrics {
                total_resources_allocated: 0,
                headcount_conversion: 0.0,
                headcount_requirement,
                aligned_outside_count,
            },
            seed,
            edit_mode: false,
            dirty: false,
            validation_errors: BTreeMap::new(),
            filter: ResourceFilter::default(),
        };
        store.update_summary_metrics();
        store
    }

    // ── Reads ──

    /// All resources, in insertion order.
    pub fn resources(&self) -> Vec<Resource> {
        self.resources.clone()
    }

    /// All staffing gaps, in insertion order.
    pub fn gaps(&self) -> Vec<ResourceGap> {
        self.gaps.clone()
    }

    pub fn metrics(&self) -> SummaryMetrics {
        self.metrics.clone()
    }

    /// Resources passing every filter predicate, insertion order preserved.
    pub fn filtered_resources(&self, filter: &ResourceFilter) -> Vec<Resource> {
        let needle = filter.search.trim().to_lowercase();
        self.resources
            .iter()
            .filter(|r| {
                let matches_search = needle.is_empty()
                    || r.name.to_lowercase().contains(&needle)
                    || r.role.to_lowercase().contains(&needle)
                    || r.lob.to_lowercase().contains(&needle);
                let matches_skill = filter.skill_level.is_none_or(|tier| r.skill_level == tier);
                let matches_lob = filter
                    .lob
                    .as_deref()
                    .is_none_or(|lob| r.lob.contains(lob) || r.lob_detail.contains(lob));
                matches_search && matches_skill && matches_lob
            })
            .cloned()
            .collect()
    }

    /// First whitespace-delimited token of each LOB, deduplicated, in
    /// first-seen order. LOB strings are long organizational names; the
    /// first token is the coarse grouping key for distribution views.
    pub fn unique_lobs(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = Vec::new();
        for r in &self.resources {
            let Some(prefix) = r.lob.split_whitespace().next() else {
                continue;
            };
            if !prefixes.iter().any(|p| p == prefix) {
                prefixes.push(prefix.to_string());
            }
        }
        prefixes
    }

    pub fn active_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .filter(|r| !r.is_terminated)
            .cloned()
            .collect()
    }

    pub fn terminated_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .filter(|r| r.is_terminated)
            .cloned()
            .collect()
    }

    /// Total FTE across active resources, unrounded.
    pub fn total_headcount(&self) -> f64 {
        self.resources
            .iter()
            .filter(|r| !r.is_terminated)
            .map(|r| f64::from(r.percent_allocated) / 100.0)
            .sum()
    }

    // ── Validation ──

    /// Validates a single allocation value. At most one error, keyed
    /// `allocation-<id>`; when more than one check could fire, the last
    /// one recorded wins.
    pub fn validate_allocation(&self, id: &str, allocation: i32) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        let key = allocation_key(id);
        if allocation > 100 {
            outcome.record(&key, "Allocation cannot exceed 100%");
        }
        if allocation < 0 {
            outcome.record(&key, "Allocation cannot be negative");
        }
        outcome
    }

    /// Aggregates per-resource validation across the whole store.
    /// This is the save gate.
    pub fn validate_all(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        for r in &self.resources {
            outcome.merge(self.validate_allocation(&r.id, r.percent_allocated));
        }
        outcome
    }

    // ── Mutations ──

    /// Sets a resource's allocation unconditionally. Validation is the
    /// caller's responsibility, invoked separately, so the store always
    /// reflects the operator's literal input.
    ///
    /// An unknown id is a no-op: edit events may race list changes.
    pub fn update_allocation(&mut self, id: &str, allocation: i32) {
        if let Some(r) = self.resources.iter_mut().find(|r| r.id == id) {
            r.percent_allocated = allocation;
            self.dirty = true;
        }
    }

    /// Flips a resource's terminated flag. Same lenient-lookup policy as
    /// [`Self::update_allocation`].
    pub fn toggle_termination(&mut self, id: &str) {
        if let Some(r) = self.resources.iter_mut().find(|r| r.id == id) {
            r.is_terminated = !r.is_terminated;
            self.dirty = true;
        }
    }

    /// Merges or clears the recorded error for one resource's allocation
    /// field from a validation outcome.
    pub fn apply_allocation_validation(&mut self, id: &str, outcome: &ValidationOutcome) {
        let key = allocation_key(id);
        match outcome.message(&key) {
            Some(message) => {
                self.validation_errors.insert(key, message.to_string());
            }
            None => {
                self.validation_errors.remove(&key);
            }
        }
    }

    /// Recomputes the derived metric fields from current active resources.
    /// The externally supplied fields are left untouched.
    pub fn update_summary_metrics(&mut self) {
        self.metrics = self.computed_metrics();
    }

    /// Commits the edit session: all-or-nothing.
    ///
    /// On any validation failure the errors are recorded, nothing else
    /// changes, and `false` is returned. On success the metrics are
    /// recomputed, edit mode ends, the dirty flag and errors clear, and
    /// `true` is returned.
    pub fn save_changes(&mut self) -> bool {
        let outcome = self.validate_all();
        if !outcome.is_valid() {
            self.validation_errors = outcome.errors().clone();
            return false;
        }
        self.update_summary_metrics();
        self.edit_mode = false;
        self.dirty = false;
        self.validation_errors.clear();
        true
    }

    /// Discards every mutation and reseeds from the original directory
    /// load. Full-cancel semantics.
    pub fn reset(&mut self) {
        self.resources = self.seed.resources.clone();
        self.gaps = self.seed.gaps.clone();
        self.dirty = false;
        self.validation_errors.clear();
        self.update_summary_metrics();
    }

    /// Captures the current state for persistence, with fresh derived
    /// metrics, leaving the store untouched.
    pub fn snapshot(&self, operator: &str) -> Snapshot {
        Snapshot {
            id: Uuid::new_v4(),
            saved_by: operator.to_string(),
            saved_at: Timestamp::now(),
            resources: self.resources.clone(),
            gaps: self.gaps.clone(),
            metrics: self.computed_metrics(),
        }
    }

    // ── Gaps ──

    /// Validates a gap draft and commits it only when valid. New gaps get
    /// the next id and start Open.
    pub fn add_gap(&mut self, draft: &GapDraft) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        if draft.role.trim().is_empty() {
            outcome.record("gap-role", "Role is required");
        }
        if !outcome.is_valid() {
            return outcome;
        }

        // Gaps are never deleted, so length gives the next id.
        let id = format!("g{}", self.gaps.len() + 1);
        self.gaps.push(ResourceGap {
            id,
            role: draft.role.trim().to_string(),
            skill_level: draft.skill_level,
            required_count: draft.required_count,
            current_count: draft.current_count,
            priority: draft.priority,
            status: GapStatus::Open,
        });
        self.dirty = true;
        outcome
    }

    /// Moves a gap to a new workflow status. Same lenient-lookup policy
    /// as resource mutations.
    pub fn update_gap_status(&mut self, id: &str, status: GapStatus) {
        if let Some(gap) = self.gaps.iter_mut().find(|g| g.id == id) {
            gap.status = status;
            self.dirty = true;
        }
    }

    // ── Session state ──

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Enters or leaves edit mode. Leaving without a save is the discard
    /// transition: the dirty flag and recorded errors clear, but data
    /// mutations made during the session remain (use [`Self::reset`] to
    /// roll those back).
    pub fn set_edit_mode(&mut self, editing: bool) {
        self.edit_mode = editing;
        if !editing {
            self.dirty = false;
            self.validation_errors.clear();
        }
    }

    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        self.validation_errors.clone()
    }

    pub fn filter(&self) -> ResourceFilter {
        self.filter.clone()
    }

    pub fn set_search(&mut self, query: &str) {
        self.filter.search = query.to_string();
    }

    pub fn set_skill_filter(&mut self, skill_level: Option<SkillLevel>) {
        self.filter.skill_level = skill_level;
    }

    pub fn set_lob_filter(&mut self, lob: Option<String>) {
        self.filter.lob = lob;
    }

    fn computed_metrics(&self) -> SummaryMetrics {
        let active = self.resources.iter().filter(|r| !r.is_terminated).count();
        SummaryMetrics {
            total_resources_allocated: active,
            headcount_conversion: round2(self.total_headcount()),
            ..self.metrics.clone()
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::directory::{FixtureDirectory, ResourceDirectory};
    use crate::model::GapPriority;

    fn fixture_store() -> AlignmentStore {
        let seed = FixtureDirectory.load().unwrap();
        AlignmentStore::new(seed, 10.0, 2)
    }

    fn draft(role: &str) -> GapDraft {
        GapDraft {
            role: role.to_string(),
            skill_level: SkillLevel::Advanced,
            required_count: 2,
            current_count: 1,
            priority: GapPriority::Medium,
        }
    }

    #[test]
    fn partitions_are_disjoint_and_exhaustive() {
        let store = fixture_store();
        let active = store.active_resources();
        let terminated = store.terminated_resources();

        assert_eq!(active.len() + terminated.len(), store.resources().len());
        for r in &active {
            assert!(!terminated.iter().any(|t| t.id == r.id));
        }
        for r in &terminated {
            assert!(r.is_terminated);
        }
    }

    #[test]
    fn allocation_in_range_is_valid() {
        let store = fixture_store();
        for value in [0, 1, 50, 99, 100] {
            let outcome = store.validate_allocation("1", value);
            assert!(outcome.is_valid(), "{value} should be valid");
            assert!(outcome.errors().is_empty());
        }
    }

    #[test]
    fn allocation_out_of_range_yields_one_keyed_error() {
        let store = fixture_store();
        for value in [-1, 101] {
            let outcome = store.validate_allocation("4", value);
            assert!(!outcome.is_valid());
            assert_eq!(outcome.errors().len(), 1);
            assert!(outcome.message("allocation-4").is_some());
        }
    }

    #[test]
    fn reads_return_defensive_copies() {
        let store = fixture_store();
        let mut first = store.resources();
        let second = store.resources();

        assert_eq!(first, second);

        // Mutating a returned copy must not reach the store.
        first[0].percent_allocated = 7;
        assert_ne!(store.resources()[0].percent_allocated, 7);
    }

    #[test]
    fn update_allocation_is_mutate_first() {
        let mut store = fixture_store();

        store.update_allocation("1", 150);
        let stored = store
            .resources()
            .into_iter()
            .find(|r| r.id == "1")
            .unwrap();
        assert_eq!(stored.percent_allocated, 150);
        assert!(store.has_unsaved_changes());

        // Validation reports the stored out-of-range value separately.
        let outcome = store.validate_allocation("1", 150);
        assert_eq!(
            outcome.message("allocation-1"),
            Some("Allocation cannot exceed 100%")
        );
    }

    #[test]
    fn unknown_id_mutations_are_no_ops() {
        let mut store = fixture_store();
        let before = store.resources();

        store.update_allocation("999", 10);
        store.toggle_termination("999");
        store.update_gap_status("g999", GapStatus::Filled);

        assert_eq!(store.resources(), before);
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn toggle_termination_moves_between_partitions() {
        let mut store = fixture_store();
        assert!(store.terminated_resources().iter().any(|r| r.id == "6"));

        store.toggle_termination("6");

        assert!(store.active_resources().iter().any(|r| r.id == "6"));
        assert!(!store.terminated_resources().iter().any(|r| r.id == "6"));
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn fixture_headcount_matches_active_sum() {
        let mut store = fixture_store();

        // Eleven active resources; "6" (5%) and "8" (3%) are terminated
        // and excluded.
        assert!((store.total_headcount() - 8.30).abs() < 1e-9);

        store.update_summary_metrics();
        let metrics = store.metrics();
        assert_eq!(metrics.total_resources_allocated, 11);
        assert!((metrics.headcount_conversion - 8.30).abs() < 1e-9);
    }

    #[test]
    fn metrics_recompute_only_at_the_save_boundary() {
        let mut store = fixture_store();
        let before = store.metrics();

        store.set_edit_mode(true);
        store.update_allocation("3", 100);
        assert_eq!(store.metrics(), before);

        assert!(store.save_changes());
        let after = store.metrics();
        assert!((after.headcount_conversion - (before.headcount_conversion + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn save_is_all_or_nothing() {
        let mut store = fixture_store();
        store.set_edit_mode(true);
        store.update_allocation("2", 150);
        let metrics_before = store.metrics();

        assert!(!store.save_changes());
        assert!(store.is_edit_mode());
        assert_eq!(store.metrics(), metrics_before);
        assert_eq!(
            store.validation_errors().get("allocation-2").map(String::as_str),
            Some("Allocation cannot exceed 100%")
        );

        store.update_allocation("2", 90);
        assert!(store.save_changes());
        assert!(!store.is_edit_mode());
        assert!(!store.has_unsaved_changes());
        assert!(store.validation_errors().is_empty());
    }

    #[test]
    fn filtering_is_conjunctive() {
        let store = fixture_store();

        let hits = store.filtered_resources(&ResourceFilter {
            search: "kumar".to_string(),
            skill_level: Some(SkillLevel::Advanced),
            lob: None,
        });

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.name.to_lowercase().contains("kumar")));
        assert!(
            hits.iter()
                .all(|r| r.skill_level == SkillLevel::Advanced)
        );

        // Same search narrowed to a tier with no such name.
        let none = store.filtered_resources(&ResourceFilter {
            search: "kumar".to_string(),
            skill_level: Some(SkillLevel::Expert),
            lob: None,
        });
        assert!(none.is_empty());
    }

    #[test]
    fn search_matches_role_and_lob_too() {
        let store = fixture_store();

        let by_role = store.filtered_resources(&ResourceFilter {
            search: "tech lead".to_string(),
            ..ResourceFilter::default()
        });
        assert_eq!(by_role.len(), 2);

        let by_lob = store.filtered_resources(&ResourceFilter {
            search: "treasury".to_string(),
            ..ResourceFilter::default()
        });
        assert_eq!(by_lob.len(), 3);
    }

    #[test]
    fn lob_filter_checks_detail_as_well() {
        let store = fixture_store();

        let hits = store.filtered_resources(&ResourceFilter {
            lob: Some("Liquidity".to_string()),
            ..ResourceFilter::default()
        });
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_filter_matches_everything_in_order() {
        let store = fixture_store();
        let all = store.filtered_resources(&ResourceFilter::default());
        assert_eq!(all, store.resources());
    }

    #[test]
    fn unique_lobs_are_first_seen_prefixes() {
        let store = fixture_store();
        assert_eq!(
            store.unique_lobs(),
            vec!["Consumer", "Payments", "Risk", "Treasury"]
        );
    }

    #[test]
    fn leaving_edit_mode_discards_flags_but_not_data() {
        let mut store = fixture_store();
        store.set_edit_mode(true);
        store.update_allocation("1", 150);
        let outcome = store.validate_allocation("1", 150);
        store.apply_allocation_validation("1", &outcome);

        store.set_edit_mode(false);

        assert!(!store.is_edit_mode());
        assert!(!store.has_unsaved_changes());
        assert!(store.validation_errors().is_empty());
        // The mutation itself survives; only reset rolls data back.
        assert_eq!(
            store
                .resources()
                .into_iter()
                .find(|r| r.id == "1")
                .unwrap()
                .percent_allocated,
            150
        );
    }

    #[test]
    fn reset_restores_the_seed() {
        let mut store = fixture_store();
        store.set_edit_mode(true);
        store.update_allocation("1", 150);
        store.toggle_termination("2");
        store.add_gap(&draft("Developer"));

        store.reset();

        let seed = FixtureDirectory.load().unwrap();
        assert_eq!(store.resources(), seed.resources);
        assert_eq!(store.gaps(), seed.gaps);
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn apply_allocation_validation_merges_and_clears() {
        let mut store = fixture_store();

        let bad = store.validate_allocation("5", 120);
        store.apply_allocation_validation("5", &bad);
        assert!(store.validation_errors().contains_key("allocation-5"));

        let good = store.validate_allocation("5", 80);
        store.apply_allocation_validation("5", &good);
        assert!(!store.validation_errors().contains_key("allocation-5"));
    }

    #[test]
    fn add_gap_commits_only_when_valid() {
        let mut store = fixture_store();
        let before = store.gaps().len();

        let rejected = store.add_gap(&draft("   "));
        assert!(!rejected.is_valid());
        assert_eq!(store.gaps().len(), before);
        assert!(!store.has_unsaved_changes());

        let accepted = store.add_gap(&draft("Platform Engineer"));
        assert!(accepted.is_valid());
        let gaps = store.gaps();
        assert_eq!(gaps.len(), before + 1);
        let added = gaps.last().unwrap();
        assert_eq!(added.id, "g4");
        assert_eq!(added.status, GapStatus::Open);
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn update_gap_status_moves_workflow() {
        let mut store = fixture_store();

        store.update_gap_status("g1", GapStatus::InProgress);

        let gap = store.gaps().into_iter().find(|g| g.id == "g1").unwrap();
        assert_eq!(gap.status, GapStatus::InProgress);
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn snapshot_carries_fresh_metrics_without_mutating() {
        let mut store = fixture_store();
        store.update_allocation("3", 100);
        let stale = store.metrics();

        let snapshot = store.snapshot("jmills");

        assert_eq!(snapshot.saved_by, "jmills");
        assert_eq!(snapshot.resources.len(), 13);
        assert!(
            (snapshot.metrics.headcount_conversion - (stale.headcount_conversion + 0.5)).abs()
                < 1e-9
        );
        // The store's own metrics stay stale until the save boundary.
        assert_eq!(store.metrics(), stale);
    }
}
