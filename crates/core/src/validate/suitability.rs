use crate::domain::premium::Premium;
use crate::domain::suitability::{SuitabilityRecord, YesNo};
use crate::validate::{canonical_optional, ValidationReport};

/// Validates the suitability questionnaire against the premium being
/// proposed. Missing answers and missing acknowledgments block; a `No`
/// on emergency funds is a documented-awareness warning so the agent
/// can proceed with eyes open.
pub fn validate_suitability(record: &SuitabilityRecord, premium: &Premium) -> ValidationReport {
    let mut report = ValidationReport::default();

    if record.investment_objective.is_none() {
        report.error("suitability.investment_objective", "investment objective is required");
    }
    if record.time_horizon.is_none() {
        report.error("suitability.time_horizon", "time horizon is required");
    }
    if record.risk_tolerance.is_none() {
        report.error("suitability.risk_tolerance", "risk tolerance is required");
    }
    if canonical_optional(&record.liquidity_needs).is_none() {
        report.error("suitability.liquidity_needs", "liquidity needs are required");
    }
    if record.emergency_funds.is_none() {
        report.error("suitability.emergency_funds", "emergency fund status is required");
    }
    if record.other_investments.is_none() {
        report.error("suitability.other_investments", "other-investments status is required");
    }
    if canonical_optional(&record.purpose).is_none() {
        report.error("suitability.purpose", "purpose of purchase is required");
    }
    if !record.understand_surrender_charges {
        report.error(
            "suitability.understand_surrender_charges",
            "client must acknowledge surrender charges before submission",
        );
    }
    if !record.acknowledge_product_disclosure {
        report.error(
            "suitability.acknowledge_product_disclosure",
            "client must acknowledge the product disclosure before submission",
        );
    }

    if record.emergency_funds == Some(YesNo::No) {
        report.warn(
            "suitability.emergency_funds",
            format!(
                "client reports no emergency funds while committing {} of premium",
                premium.initial_amount
            ),
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use crate::domain::suitability::YesNo;
    use crate::fixtures::{draft_application, suitability_record};
    use crate::validate::suitability::validate_suitability;

    #[test]
    fn complete_record_passes_clean() {
        let app = draft_application("APP-1");
        let report = validate_suitability(&suitability_record(), &app.premium);
        assert!(!report.is_blocking());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_acknowledgment_blocks_even_when_everything_else_is_valid() {
        let app = draft_application("APP-2");
        let mut record = suitability_record();
        record.understand_surrender_charges = false;

        let report = validate_suitability(&record, &app.premium);
        assert!(report.is_blocking());
        assert!(report
            .errors
            .iter()
            .any(|issue| issue.field == "suitability.understand_surrender_charges"));
    }

    #[test]
    fn no_emergency_funds_warns_but_does_not_block() {
        let app = draft_application("APP-3");
        let mut record = suitability_record();
        record.emergency_funds = Some(YesNo::No);

        let report = validate_suitability(&record, &app.premium);
        assert!(!report.is_blocking());
        assert!(report.warnings.iter().any(|issue| issue.message.contains("emergency funds")));
    }

    #[test]
    fn blank_purpose_counts_as_missing() {
        let app = draft_application("APP-4");
        let mut record = suitability_record();
        record.purpose = Some("   ".to_string());

        let report = validate_suitability(&record, &app.premium);
        assert!(report.errors.iter().any(|issue| issue.field == "suitability.purpose"));
    }
}
