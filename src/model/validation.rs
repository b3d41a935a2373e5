//! Validation outcome shared by the store and the presenter.

use std::collections::BTreeMap;

/// Result of validating one field or the whole store.
///
/// One message per field key. When multiple checks fire for the same key,
/// the last one recorded wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: BTreeMap<String, String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error for a field, replacing any earlier message.
    pub fn record(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    /// Folds another outcome in. Later messages win on key collisions.
    pub fn merge(&mut self, other: ValidationOutcome) {
        self.errors.extend(other.errors);
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }
}

/// Error-map key for a resource's allocation field.
pub fn allocation_key(id: &str) -> String {
    format!("allocation-{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_outcome_is_valid() {
        assert!(ValidationOutcome::default().is_valid());
    }

    #[test]
    fn last_message_wins_per_key() {
        let mut outcome = ValidationOutcome::default();
        outcome.record("allocation-1", "first");
        outcome.record("allocation-1", "second");

        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.message("allocation-1"), Some("second"));
    }

    #[test]
    fn merge_folds_errors_in() {
        let mut a = ValidationOutcome::default();
        a.record("allocation-1", "too high");
        let mut b = ValidationOutcome::default();
        b.record("allocation-2", "negative");

        a.merge(b);
        assert_eq!(a.errors().len(), 2);
    }

    #[test]
    fn allocation_key_embeds_id() {
        assert_eq!(allocation_key("7"), "allocation-7");
    }
}
