//! Submission orchestration: validate, create at the carrier, and move
//! the aggregate from `Draft` to `Submitted` in one place.

use thiserror::Error;
use tracing::{info, warn};

use bindery_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use bindery_core::config::FeatureFlags;
use bindery_core::domain::application::{Application, ApplicationState, ConfirmationNumber};
use bindery_core::validate::funding::validate_funding;
use bindery_core::validate::party::{normalize_parties, validate_parties};
use bindery_core::validate::suitability::validate_suitability;
use bindery_core::validate::{ValidationIssue, ValidationReport};

use crate::adapter::{CarrierGateway, GatewayError};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("application {id} cannot be submitted from state {state}")]
    NotDraft { id: String, state: ApplicationState },
    /// A previous create call timed out and the carrier may already
    /// hold this application. Submission stays blocked until manual
    /// reconciliation clears the flag.
    #[error("application {id} is awaiting manual reconciliation; refusing to resubmit")]
    PendingReconciliation { id: String },
    #[error("submission blocked by {} validation error(s)", report.errors.len())]
    Validation { report: ValidationReport },
    #[error(transparent)]
    Gateway(GatewayError),
    /// The create call timed out, so the carrier may or may not hold
    /// the application. The aggregate stays in `Draft` flagged for
    /// manual reconciliation; retrying blindly risks a duplicate
    /// submission.
    #[error("create outcome unknown after timeout; manual reconciliation required")]
    UnknownOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub confirmation_number: ConfirmationNumber,
    pub gateway_application_id: String,
    pub dtcc_reference: Option<String>,
    /// Validator warnings plus anything the carrier attached. Always
    /// surfaced, even on success.
    pub warnings: Vec<ValidationIssue>,
}

pub struct SubmissionService<G> {
    gateway: G,
    features: FeatureFlags,
}

impl<G> SubmissionService<G>
where
    G: CarrierGateway,
{
    pub fn new(gateway: G, features: FeatureFlags) -> Self {
        Self { gateway, features }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs every validator against the current draft. Validators are
    /// pure and the records stay editable until submission, so this is
    /// recomputed on every call rather than cached.
    pub fn validate(&self, application: &Application) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.merge(validate_parties(
            &application.annuitant,
            &application.owner,
            application.joint_owner.as_ref(),
            &application.beneficiaries,
        ));
        report.merge(validate_funding(&application.premium));
        if self.features.suitability_checks {
            report.merge(validate_suitability(&application.suitability, &application.premium));
        }
        report
    }

    /// Submits a draft application. On success the aggregate moves to
    /// `Submitted` with the confirmation number and DTCC reference
    /// recorded; on any failure it is left exactly as it was, except
    /// that a timeout sets `needs_reconciliation`.
    pub async fn submit(
        &self,
        application: &mut Application,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if application.state != ApplicationState::Draft {
            return Err(SubmissionError::NotDraft {
                id: application.id.0.clone(),
                state: application.state,
            });
        }
        if application.needs_reconciliation {
            return Err(SubmissionError::PendingReconciliation { id: application.id.0.clone() });
        }

        let report = self.validate(application);
        if report.is_blocking() {
            return Err(SubmissionError::Validation { report });
        }

        // Canonical party shapes so the carrier always sees the same
        // payload for the same facts.
        let (annuitant, owner, joint_owner) = normalize_parties(
            &application.annuitant,
            &application.owner,
            application.joint_owner.as_ref(),
        );
        application.annuitant = annuitant;
        application.owner = owner;
        application.joint_owner = joint_owner;

        let outcome = match self.gateway.create_application(application).await {
            Ok(outcome) => outcome,
            Err(error) if error.is_timeout() => {
                warn!(
                    application_id = %application.id,
                    "create call timed out; outcome unknown, flagging for reconciliation"
                );
                application.needs_reconciliation = true;
                return Err(SubmissionError::UnknownOutcome);
            }
            Err(error) => return Err(SubmissionError::Gateway(error)),
        };

        let confirmation = ConfirmationNumber(outcome.confirmation_number);
        // DTCC tracking is optional per distribution agreement; with
        // the feature off, carrier references are not recorded.
        let dtcc_reference = if self.features.dtcc { outcome.dtcc_reference } else { None };
        application
            .record_submission(
                confirmation.clone(),
                outcome.gateway_application_id.clone(),
                dtcc_reference.clone(),
            )
            .map_err(|err| {
                // The aggregate was checked to be in draft above, so a
                // transition failure here means concurrent mutation.
                SubmissionError::Gateway(GatewayError::Malformed(err.to_string()))
            })?;

        info!(
            application_id = %application.id,
            confirmation = %confirmation.0,
            "application submitted"
        );

        let mut warnings = report.warnings;
        warnings.extend(
            outcome
                .warnings
                .into_iter()
                .map(|message| ValidationIssue::new("carrier", message)),
        );

        Ok(SubmissionReceipt {
            confirmation_number: confirmation,
            gateway_application_id: outcome.gateway_application_id,
            dtcc_reference,
            warnings,
        })
    }

    pub async fn submit_with_audit<S>(
        &self,
        application: &mut Application,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<SubmissionReceipt, SubmissionError>
    where
        S: AuditSink,
    {
        let result = self.submit(application).await;
        match &result {
            Ok(receipt) => sink.emit(
                AuditEvent::new(
                    Some(application.id.clone()),
                    audit.correlation_id.clone(),
                    "submission.accepted",
                    AuditCategory::Gateway,
                    audit.actor.clone(),
                    AuditOutcome::Success,
                )
                .with_metadata("confirmation", receipt.confirmation_number.0.clone())
                .with_metadata("warnings", receipt.warnings.len().to_string()),
            ),
            Err(error) => sink.emit(
                AuditEvent::new(
                    Some(application.id.clone()),
                    audit.correlation_id.clone(),
                    "submission.rejected",
                    AuditCategory::Gateway,
                    audit.actor.clone(),
                    AuditOutcome::Rejected,
                )
                .with_metadata("error", error.to_string()),
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use bindery_core::audit::{AuditContext, InMemoryAuditSink};
    use bindery_core::config::FeatureFlags;
    use bindery_core::domain::application::ApplicationState;
    use bindery_core::domain::suitability::YesNo;
    use bindery_core::fixtures::draft_application;

    use crate::simulation::SimulatedGateway;

    use super::{SubmissionError, SubmissionService};

    fn features() -> FeatureFlags {
        FeatureFlags { esignature: true, acord: true, dtcc: true, suitability_checks: true }
    }

    fn service() -> SubmissionService<SimulatedGateway> {
        SubmissionService::new(SimulatedGateway::new(), features())
    }

    #[tokio::test]
    async fn valid_draft_reaches_submitted_with_confirmation() {
        let service = service();
        let mut app = draft_application("APP-SUB-1");

        let receipt = service.submit(&mut app).await.expect("submit");
        assert_eq!(app.state, ApplicationState::Submitted);
        assert!(!receipt.confirmation_number.0.is_empty());
        assert_eq!(app.confirmation_number.as_ref(), Some(&receipt.confirmation_number));
        assert!(app.dtcc_reference.is_some());
    }

    #[tokio::test]
    async fn submit_outside_draft_is_rejected_without_side_effects() {
        let service = service();
        let mut app = draft_application("APP-SUB-2");
        app.state = ApplicationState::InReview;

        let error = service.submit(&mut app).await.expect_err("not a draft");
        assert!(matches!(error, SubmissionError::NotDraft { .. }));
        assert_eq!(app.state, ApplicationState::InReview);
        assert!(app.confirmation_number.is_none());
    }

    #[tokio::test]
    async fn blocking_validation_stops_before_the_gateway() {
        let service = service();
        let mut app = draft_application("APP-SUB-3");
        app.suitability.understand_surrender_charges = false;

        let error = service.submit(&mut app).await.expect_err("blocked");
        let SubmissionError::Validation { report } = error else {
            panic!("expected validation error");
        };
        assert!(report.is_blocking());
        assert_eq!(app.state, ApplicationState::Draft);
    }

    #[tokio::test]
    async fn disabled_suitability_checks_skip_that_validator_only() {
        let mut flags = features();
        flags.suitability_checks = false;
        let service = SubmissionService::new(SimulatedGateway::new(), flags);

        let mut app = draft_application("APP-SUB-4");
        app.suitability.understand_surrender_charges = false;

        service.submit(&mut app).await.expect("suitability checks disabled");
        assert_eq!(app.state, ApplicationState::Submitted);
    }

    #[tokio::test]
    async fn disabled_dtcc_feature_discards_carrier_references() {
        let mut flags = features();
        flags.dtcc = false;
        let service = SubmissionService::new(SimulatedGateway::new(), flags);

        let mut app = draft_application("APP-SUB-10");
        let receipt = service.submit(&mut app).await.expect("submit");
        assert_eq!(app.state, ApplicationState::Submitted);
        assert!(receipt.dtcc_reference.is_none());
        assert!(app.dtcc_reference.is_none());
    }

    #[tokio::test]
    async fn validator_warnings_survive_a_successful_submission() {
        let service = service();
        let mut app = draft_application("APP-SUB-5");
        app.suitability.emergency_funds = Some(YesNo::No);

        let receipt = service.submit(&mut app).await.expect("submit with warnings");
        assert!(receipt
            .warnings
            .iter()
            .any(|issue| issue.message.contains("emergency funds")));
        // Both the local validator and the simulated carrier comment.
        assert!(receipt.warnings.len() >= 2);
    }

    struct TimeoutGateway;

    #[async_trait::async_trait]
    impl crate::adapter::CarrierGateway for TimeoutGateway {
        async fn create_application(
            &self,
            _application: &bindery_core::domain::application::Application,
        ) -> Result<crate::adapter::CreateApplicationOutcome, crate::adapter::GatewayError>
        {
            Err(crate::adapter::GatewayError::Timeout(std::time::Duration::from_secs(30)))
        }

        async fn application_status(
            &self,
            _id: &bindery_core::domain::application::ApplicationId,
        ) -> Result<bindery_core::domain::snapshot::CarrierStatusSnapshot, crate::adapter::GatewayError>
        {
            Err(crate::adapter::GatewayError::Unavailable("not under test".to_string()))
        }

        async fn request_esignature(
            &self,
            _id: &bindery_core::domain::application::ApplicationId,
            _signers: &[crate::adapter::SignerRequest],
        ) -> Result<crate::adapter::ESignSession, crate::adapter::GatewayError> {
            Err(crate::adapter::GatewayError::Unavailable("not under test".to_string()))
        }

        async fn submit_1035_exchange(
            &self,
            _id: &bindery_core::domain::application::ApplicationId,
            _exchange: &bindery_core::domain::premium::Exchange1035,
            _authorization: &bindery_core::domain::premium::TransferAuthorization,
        ) -> Result<crate::adapter::ExchangeAcknowledgement, crate::adapter::GatewayError>
        {
            Err(crate::adapter::GatewayError::Unavailable("not under test".to_string()))
        }

        async fn generate_acord_xml(
            &self,
            _id: &bindery_core::domain::application::ApplicationId,
        ) -> Result<String, crate::adapter::GatewayError> {
            Err(crate::adapter::GatewayError::Unavailable("not under test".to_string()))
        }

        async fn health_check(
            &self,
        ) -> Result<crate::adapter::HealthStatus, crate::adapter::GatewayError> {
            Err(crate::adapter::GatewayError::Unavailable("not under test".to_string()))
        }
    }

    #[tokio::test]
    async fn create_timeout_leaves_draft_and_flags_reconciliation() {
        let service = SubmissionService::new(TimeoutGateway, features());
        let mut app = draft_application("APP-SUB-8");

        let error = service.submit(&mut app).await.expect_err("timeout");
        assert!(matches!(error, SubmissionError::UnknownOutcome));
        assert_eq!(app.state, ApplicationState::Draft);
        assert!(app.needs_reconciliation);
        assert!(app.confirmation_number.is_none());
    }

    #[tokio::test]
    async fn flagged_application_is_refused_until_reconciled() {
        let mut app = draft_application("APP-SUB-9");

        let timeout_service = SubmissionService::new(TimeoutGateway, features());
        let _ = timeout_service.submit(&mut app).await.expect_err("timeout");
        assert!(app.needs_reconciliation);

        // Even against a now-healthy gateway, the flag blocks the
        // retry: the carrier may already hold this application.
        let healthy_service = service();
        let error = healthy_service.submit(&mut app).await.expect_err("must not resubmit");
        assert!(matches!(error, SubmissionError::PendingReconciliation { .. }));
        assert_eq!(app.state, ApplicationState::Draft);
        assert!(app.confirmation_number.is_none());

        // Manual reconciliation clears the flag and submission is
        // allowed again.
        app.needs_reconciliation = false;
        healthy_service.submit(&mut app).await.expect("submit after reconciliation");
        assert_eq!(app.state, ApplicationState::Submitted);
    }

    #[tokio::test]
    async fn audit_events_record_both_outcomes() {
        let service = service();
        let sink = InMemoryAuditSink::default();

        let mut good = draft_application("APP-SUB-6");
        let context = AuditContext::new(Some(good.id.clone()), "req-1", "submission-service");
        service.submit_with_audit(&mut good, &sink, &context).await.expect("submit");

        let mut bad = draft_application("APP-SUB-7");
        bad.beneficiaries.clear();
        let context = AuditContext::new(Some(bad.id.clone()), "req-2", "submission-service");
        let _ = service.submit_with_audit(&mut bad, &sink, &context).await.expect_err("blocked");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "submission.accepted");
        assert_eq!(events[1].event_type, "submission.rejected");
    }
}
