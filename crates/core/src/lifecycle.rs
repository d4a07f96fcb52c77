//! Advance contract for externally-reported status.
//!
//! `submit` is the only way out of `Draft` and lives with the gateway
//! submission service; everything after `Submitted` moves through
//! [`advance`], which enforces a monotonic ordering over
//! [`ApplicationState::rank`]. Reported statuses at or behind the
//! current state are discarded as duplicates (carriers redeliver
//! events); reports that would require an illegal jump are rejected as
//! inconsistencies and never applied.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::application::{Application, ApplicationState};
use crate::domain::snapshot::CarrierStatusSnapshot;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("reported status {reported} is inconsistent with current state {current}")]
    Inconsistent { current: ApplicationState, reported: ApplicationState },
    #[error("carrier status `{0}` is not recognized")]
    UnknownStatus(String),
    #[error("application is still in draft; only submit may move it forward")]
    StillDraft,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceOutcome {
    /// The reported status moved the application forward.
    Applied { from: ApplicationState, to: ApplicationState },
    /// The report was a redelivery or arrived behind the current
    /// state. Silent success.
    Duplicate { state: ApplicationState },
}

/// Maps a carrier status string (poll response or webhook payload) to
/// the local lifecycle. Carriers are loose with vocabulary; the
/// synonyms here match what FireLight environments actually emit.
pub fn map_carrier_status(raw: &str) -> Option<ApplicationState> {
    match raw.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
        "SUBMITTED" | "RECEIVED" => Some(ApplicationState::Submitted),
        "PENDING" | "PENDING_REVIEW" => Some(ApplicationState::PendingReview),
        "IN_REVIEW" | "UNDER_REVIEW" | "REVIEWING" => Some(ApplicationState::InReview),
        "APPROVED" => Some(ApplicationState::Approved),
        "DECLINED" | "REJECTED" => Some(ApplicationState::Declined),
        "ISSUED" | "ACTIVE" | "INFORCE" | "IN_FORCE" => Some(ApplicationState::Issued),
        "CANCELLED" | "CANCELED" | "WITHDRAWN" => Some(ApplicationState::Cancelled),
        _ => None,
    }
}

/// Decides what an externally-reported state means relative to the
/// current one, without mutating anything.
pub fn plan_advance(
    current: ApplicationState,
    reported: ApplicationState,
) -> Result<AdvanceOutcome, LifecycleError> {
    if reported == ApplicationState::Cancelled {
        return if current.is_terminal() {
            Ok(AdvanceOutcome::Duplicate { state: current })
        } else {
            Ok(AdvanceOutcome::Applied { from: current, to: ApplicationState::Cancelled })
        };
    }

    if current == ApplicationState::Draft {
        // A carrier cannot know about an application we never sent.
        return if reported == ApplicationState::Draft {
            Ok(AdvanceOutcome::Duplicate { state: current })
        } else {
            Err(LifecycleError::StillDraft)
        };
    }

    if reported.rank() < current.rank() || reported == current {
        return Ok(AdvanceOutcome::Duplicate { state: current });
    }

    if current.is_terminal() {
        // Forward-looking report after a terminal state: the carrier
        // and we disagree about history.
        return Err(LifecycleError::Inconsistent { current, reported });
    }

    if reported.rank() == current.rank() {
        // Approved vs. Declined: same rank, different verdicts.
        return Err(LifecycleError::Inconsistent { current, reported });
    }

    Ok(AdvanceOutcome::Applied { from: current, to: reported })
}

/// Applies a carrier snapshot to the aggregate. Forward skips along
/// the review chain are legal (a missed `pending_review` event must
/// not wedge the application), so the state is written directly once
/// `plan_advance` accepts it.
pub fn advance(
    application: &mut Application,
    snapshot: &CarrierStatusSnapshot,
) -> Result<AdvanceOutcome, LifecycleError> {
    let reported = map_carrier_status(&snapshot.status)
        .ok_or_else(|| LifecycleError::UnknownStatus(snapshot.status.clone()))?;

    let outcome = plan_advance(application.state, reported)?;
    if let AdvanceOutcome::Applied { to, .. } = outcome {
        application.state = to;
        application.updated_at = snapshot.status_date;
        if to == ApplicationState::Issued {
            application.record_issue_details(
                snapshot.issued_contract.as_ref().map(|c| c.contract_number.clone()),
            );
        }
        if let Some(dtcc) = &snapshot.dtcc {
            application.dtcc_reference = Some(dtcc.reference.clone());
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::application::ApplicationState;
    use crate::domain::snapshot::{CarrierStatusSnapshot, DtccStatus, IssuedContract};
    use crate::fixtures::draft_application;
    use crate::lifecycle::{advance, map_carrier_status, plan_advance, AdvanceOutcome,
        LifecycleError};

    fn snapshot(id: &str, status: &str) -> CarrierStatusSnapshot {
        CarrierStatusSnapshot {
            application_id: crate::domain::application::ApplicationId(id.to_string()),
            status: status.to_string(),
            status_date: Utc::now(),
            notes: None,
            issued_contract: None,
            dtcc: None,
        }
    }

    #[test]
    fn advance_never_moves_state_backward() {
        let outcome = plan_advance(ApplicationState::InReview, ApplicationState::Submitted)
            .expect("behind-state report is a silent duplicate");
        assert_eq!(outcome, AdvanceOutcome::Duplicate { state: ApplicationState::InReview });
    }

    #[test]
    fn issued_report_while_draft_is_inconsistent() {
        let error = plan_advance(ApplicationState::Draft, ApplicationState::Issued)
            .expect_err("carrier cannot know about an unsent application");
        assert_eq!(error, LifecycleError::StillDraft);
    }

    #[test]
    fn declined_application_discards_in_review_report() {
        let outcome = plan_advance(ApplicationState::Declined, ApplicationState::InReview)
            .expect("terminal state discards stale report");
        assert_eq!(outcome, AdvanceOutcome::Duplicate { state: ApplicationState::Declined });
    }

    #[test]
    fn issued_report_after_decline_is_inconsistent() {
        let error = plan_advance(ApplicationState::Declined, ApplicationState::Issued)
            .expect_err("carrier and local history disagree");
        assert!(matches!(error, LifecycleError::Inconsistent { .. }));
    }

    #[test]
    fn approved_and_declined_reports_conflict() {
        let error = plan_advance(ApplicationState::Approved, ApplicationState::Declined)
            .expect_err("opposite verdicts at the same rank");
        assert!(matches!(error, LifecycleError::Inconsistent { .. }));
    }

    #[test]
    fn cancel_report_applies_from_any_non_terminal_state() {
        for current in [
            ApplicationState::Submitted,
            ApplicationState::PendingReview,
            ApplicationState::InReview,
            ApplicationState::Approved,
        ] {
            let outcome = plan_advance(current, ApplicationState::Cancelled).expect("cancel");
            assert_eq!(
                outcome,
                AdvanceOutcome::Applied { from: current, to: ApplicationState::Cancelled }
            );
        }
    }

    #[test]
    fn forward_skip_along_review_chain_is_applied() {
        let outcome = plan_advance(ApplicationState::Submitted, ApplicationState::Approved)
            .expect("missed intermediate events must not wedge the application");
        assert_eq!(
            outcome,
            AdvanceOutcome::Applied {
                from: ApplicationState::Submitted,
                to: ApplicationState::Approved
            }
        );
    }

    #[test]
    fn duplicate_delivery_is_silent_success() {
        let outcome = plan_advance(ApplicationState::InReview, ApplicationState::InReview)
            .expect("redelivered event");
        assert_eq!(outcome, AdvanceOutcome::Duplicate { state: ApplicationState::InReview });
    }

    #[test]
    fn carrier_vocabulary_maps_to_lifecycle() {
        assert_eq!(map_carrier_status("Under Review"), Some(ApplicationState::InReview));
        assert_eq!(map_carrier_status("INFORCE"), Some(ApplicationState::Issued));
        assert_eq!(map_carrier_status("canceled"), Some(ApplicationState::Cancelled));
        assert_eq!(map_carrier_status("SHREDDED"), None);
    }

    #[test]
    fn advance_records_contract_and_dtcc_details_on_issue() {
        let mut app = draft_application("APP-10");
        app.state = ApplicationState::Approved;

        let mut snap = snapshot("APP-10", "ISSUED");
        snap.issued_contract =
            Some(IssuedContract { contract_number: "CN-2031".to_string(), issue_date: None });
        snap.dtcc = Some(DtccStatus {
            reference: "DTCC-19".to_string(),
            status: Some("SETTLED".to_string()),
        });

        let outcome = advance(&mut app, &snap).expect("approved -> issued");
        assert!(matches!(outcome, AdvanceOutcome::Applied { to: ApplicationState::Issued, .. }));
        assert_eq!(app.contract_number.as_deref(), Some("CN-2031"));
        assert_eq!(app.dtcc_reference.as_deref(), Some("DTCC-19"));
    }

    #[test]
    fn unknown_status_string_is_an_error_not_a_guess() {
        let mut app = draft_application("APP-11");
        app.state = ApplicationState::Submitted;
        let error = advance(&mut app, &snapshot("APP-11", "VAPORIZED")).expect_err("unknown");
        assert_eq!(error, LifecycleError::UnknownStatus("VAPORIZED".to_string()));
        assert_eq!(app.state, ApplicationState::Submitted);
    }
}
