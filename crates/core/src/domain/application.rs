use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::party::{Annuitant, Beneficiary, Owner};
use crate::domain::premium::Premium;
use crate::domain::suitability::SuitabilityRecord;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationNumber(pub String);

impl std::fmt::Display for ConfirmationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Carrier/product the application is written against, supplied by the
/// upstream quote record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub carrier_code: String,
    pub product_code: String,
    pub plan_name: Option<String>,
}

/// Writing-agent identity, supplied by the upstream agent record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: String,
    pub name: String,
    pub email: Option<String>,
    pub license_number: String,
    pub npn: String,
}

/// Lifecycle of a submitted application. Closed set; every transition
/// goes through [`Application::transition_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    Draft,
    Submitted,
    PendingReview,
    InReview,
    Approved,
    Declined,
    Issued,
    Cancelled,
}

impl ApplicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::PendingReview => "pending_review",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Issued => "issued",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "pending_review" => Some(Self::PendingReview),
            "in_review" => Some(Self::InReview),
            "approved" => Some(Self::Approved),
            "declined" => Some(Self::Declined),
            "issued" => Some(Self::Issued),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Issued | Self::Cancelled)
    }

    /// Monotonic position in the forward lifecycle. `Approved` and
    /// `Declined` share a rank (they fork from review); `Cancelled`
    /// sits outside the ordering and short-circuits from any
    /// non-terminal state.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Submitted => 1,
            Self::PendingReview => 2,
            Self::InReview => 3,
            Self::Approved | Self::Declined => 4,
            Self::Issued => 5,
            Self::Cancelled => 6,
        }
    }
}

impl std::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root for an annuity submission. Created when a quote is
/// converted; mutated only through state transitions; never deleted
/// (cancellation is a terminal state, not a removal).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub product: ProductRef,
    pub annuitant: Annuitant,
    pub owner: Owner,
    pub joint_owner: Option<Owner>,
    pub beneficiaries: Vec<Beneficiary>,
    pub premium: Premium,
    pub suitability: SuitabilityRecord,
    pub agent: AgentInfo,
    pub state: ApplicationState,
    pub confirmation_number: Option<ConfirmationNumber>,
    pub gateway_application_id: Option<String>,
    pub contract_number: Option<String>,
    pub dtcc_reference: Option<String>,
    /// Set when a create call timed out and the true outcome is
    /// unknown. Cleared by manual reconciliation, never by retry.
    pub needs_reconciliation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn can_transition_to(&self, next: ApplicationState) -> bool {
        use ApplicationState::{
            Approved, Cancelled, Declined, Draft, InReview, Issued, PendingReview, Submitted,
        };

        matches!(
            (self.state, next),
            (Draft, Submitted)
                | (Submitted, PendingReview)
                | (Submitted, InReview)
                | (PendingReview, InReview)
                | (InReview, Approved)
                | (InReview, Declined)
                | (Approved, Issued)
        ) || (next == Cancelled && !self.state.is_terminal())
    }

    pub fn transition_to(&mut self, next: ApplicationState) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.state = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidStateTransition { from: self.state, to: next })
    }

    /// Records a successful carrier create call: confirmation number,
    /// gateway id, optional DTCC reference, and the move to
    /// `Submitted`. Call only after the gateway acknowledged the
    /// create; a failed or unknown-outcome call must leave the
    /// aggregate untouched.
    pub fn record_submission(
        &mut self,
        confirmation: ConfirmationNumber,
        gateway_application_id: String,
        dtcc_reference: Option<String>,
    ) -> Result<(), DomainError> {
        self.transition_to(ApplicationState::Submitted)?;
        self.confirmation_number = Some(confirmation);
        self.gateway_application_id = Some(gateway_application_id);
        self.dtcc_reference = dtcc_reference;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(ApplicationState::Cancelled)
    }

    /// Issued-contract number recorded from a carrier snapshot, kept
    /// separate from the state move so callers apply both together.
    pub fn record_issue_details(&mut self, contract_number: Option<String>) {
        if contract_number.is_some() {
            self.contract_number = contract_number;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::application::ApplicationState;
    use crate::fixtures::draft_application;

    #[test]
    fn draft_can_only_move_to_submitted_or_cancelled() {
        let app = draft_application("APP-1");
        assert!(app.can_transition_to(ApplicationState::Submitted));
        assert!(app.can_transition_to(ApplicationState::Cancelled));
        assert!(!app.can_transition_to(ApplicationState::InReview));
        assert!(!app.can_transition_to(ApplicationState::Issued));
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for terminal in
            [ApplicationState::Declined, ApplicationState::Issued, ApplicationState::Cancelled]
        {
            let mut app = draft_application("APP-2");
            app.state = terminal;
            for next in [
                ApplicationState::Draft,
                ApplicationState::Submitted,
                ApplicationState::InReview,
                ApplicationState::Approved,
                ApplicationState::Cancelled,
            ] {
                assert!(!app.can_transition_to(next), "{terminal} must not move to {next}");
            }
        }
    }

    #[test]
    fn record_submission_sets_confirmation_and_state() {
        let mut app = draft_application("APP-3");
        app.record_submission(
            crate::domain::application::ConfirmationNumber("CONF-77".to_string()),
            "FL-1021".to_string(),
            Some("DTCC-55".to_string()),
        )
        .expect("draft -> submitted");

        assert_eq!(app.state, ApplicationState::Submitted);
        assert_eq!(app.confirmation_number.as_ref().map(|c| c.0.as_str()), Some("CONF-77"));
        assert_eq!(app.dtcc_reference.as_deref(), Some("DTCC-55"));
    }

    #[test]
    fn cancel_is_final() {
        let mut app = draft_application("APP-4");
        app.cancel().expect("draft -> cancelled");
        assert!(app.state.is_terminal());
        assert!(app.cancel().is_err());
    }

    #[test]
    fn state_strings_round_trip() {
        for state in [
            ApplicationState::Draft,
            ApplicationState::Submitted,
            ApplicationState::PendingReview,
            ApplicationState::InReview,
            ApplicationState::Approved,
            ApplicationState::Declined,
            ApplicationState::Issued,
            ApplicationState::Cancelled,
        ] {
            assert_eq!(ApplicationState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ApplicationState::parse("NOT_A_STATE"), None);
    }
}
