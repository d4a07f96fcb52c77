//! Pre-submission validators.
//!
//! Each validator is a pure function producing a [`ValidationReport`]:
//! blocking errors stop submission, warnings ride along on the result
//! so the agent always sees them. Validators are re-run on every
//! submit attempt; the records they inspect stay editable while the
//! application is in draft, so nothing here is cached.

pub mod funding;
pub mod party;
pub mod suitability;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    pub fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    pub fn is_blocking(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Trims a free-text optional down to a canonical form: whitespace-only
/// input becomes absent.
pub(crate) fn canonical_optional(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{canonical_optional, ValidationReport};

    #[test]
    fn report_merge_keeps_both_severities() {
        let mut left = ValidationReport::default();
        left.error("owner", "missing tax id");
        let mut right = ValidationReport::default();
        right.warn("premium", "surrender charge");

        left.merge(right);
        assert!(left.is_blocking());
        assert_eq!(left.errors.len(), 1);
        assert_eq!(left.warnings.len(), 1);
    }

    #[test]
    fn blank_optionals_become_absent() {
        assert_eq!(canonical_optional(&Some("  ".to_string())), None);
        assert_eq!(canonical_optional(&Some(" note ".to_string())), Some("note".to_string()));
        assert_eq!(canonical_optional(&None), None);
    }
}
