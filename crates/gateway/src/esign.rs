//! E-signature sub-workflow.
//!
//! Sessions can only be opened once an application is `Submitted` and
//! not yet terminal. Every required party must have an email on file
//! before the gateway is asked for anything, and an expired session is
//! never handed out again: callers re-request.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use bindery_core::domain::application::{Application, ApplicationId, ApplicationState};
use bindery_core::domain::party::Owner;

use crate::adapter::{CarrierGateway, ESignSession, GatewayError, SignerRequest, SignerRole};

#[derive(Debug, Error)]
pub enum ESignError {
    #[error("e-signature is disabled for this environment")]
    Disabled,
    #[error("e-signature requires a submitted application; current state is {0}")]
    NotSubmitted(ApplicationState),
    #[error("application is in terminal state {0}; no further signatures are accepted")]
    Terminal(ApplicationState),
    #[error("required signer {role:?} has no email on file")]
    MissingContact { role: SignerRole },
    #[error("session {session_id} expired at {expired_at}; request a new session")]
    SessionExpired { session_id: String, expired_at: DateTime<Utc> },
    #[error("no signing url for role {0:?} in the current session")]
    UnknownSigner(SignerRole),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct ESignatureOrchestrator<G> {
    gateway: G,
    enabled: bool,
    sessions: Mutex<HashMap<ApplicationId, ESignSession>>,
}

impl<G> ESignatureOrchestrator<G>
where
    G: CarrierGateway,
{
    pub fn new(gateway: G, enabled: bool) -> Self {
        Self { gateway, enabled, sessions: Mutex::new(HashMap::new()) }
    }

    /// Required signers in signing order: annuitant, owner when the
    /// owner is a distinct individual, then the writing agent. Fails
    /// closed on any missing contact.
    pub fn required_signers(application: &Application) -> Result<Vec<SignerRequest>, ESignError> {
        let mut signers = Vec::new();

        let annuitant_email = application
            .annuitant
            .contact
            .email
            .clone()
            .ok_or(ESignError::MissingContact { role: SignerRole::Annuitant })?;
        signers.push(SignerRequest {
            role: SignerRole::Annuitant,
            name: application.annuitant.name.full(),
            email: annuitant_email,
        });

        if let Owner::Individual { name, government_id, contact, .. } = &application.owner {
            if government_id != &application.annuitant.government_id {
                let email = contact
                    .email
                    .clone()
                    .ok_or(ESignError::MissingContact { role: SignerRole::Owner })?;
                signers.push(SignerRequest {
                    role: SignerRole::Owner,
                    name: name.full(),
                    email,
                });
            }
        }

        let agent_email = application
            .agent
            .email
            .clone()
            .ok_or(ESignError::MissingContact { role: SignerRole::Agent })?;
        signers.push(SignerRequest {
            role: SignerRole::Agent,
            name: application.agent.name.clone(),
            email: agent_email,
        });

        Ok(signers)
    }

    /// Opens (or replaces) the signing session for an application.
    pub async fn request(&self, application: &Application) -> Result<ESignSession, ESignError> {
        if !self.enabled {
            return Err(ESignError::Disabled);
        }
        if application.state.is_terminal() {
            return Err(ESignError::Terminal(application.state));
        }
        if application.state == ApplicationState::Draft {
            return Err(ESignError::NotSubmitted(application.state));
        }

        let signers = Self::required_signers(application)?;
        let session = self.gateway.request_esignature(&application.id, &signers).await?;

        info!(
            application_id = %application.id,
            session_id = %session.session_id,
            signer_count = signers.len(),
            "e-signature session opened"
        );

        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(application.id.clone(), session.clone());
        }
        Ok(session)
    }

    /// Hands out the signing URL for one signer, refusing expired
    /// sessions so a stale link is never re-used.
    pub fn signing_url(
        &self,
        application_id: &ApplicationId,
        role: SignerRole,
        now: DateTime<Utc>,
    ) -> Result<String, ESignError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::Unavailable("session store poisoned".to_string()))?;
        let session = sessions
            .get(application_id)
            .ok_or(ESignError::UnknownSigner(role))?;

        if session.is_expired(now) {
            return Err(ESignError::SessionExpired {
                session_id: session.session_id.clone(),
                expired_at: session.expires_at,
            });
        }

        session
            .signing_urls
            .iter()
            .find(|signer| signer.role == role)
            .map(|signer| signer.url.clone())
            .ok_or(ESignError::UnknownSigner(role))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use bindery_core::domain::application::ApplicationState;
    use bindery_core::fixtures::draft_application;

    use crate::adapter::{CarrierGateway, SignerRole};
    use crate::simulation::SimulatedGateway;

    use super::{ESignError, ESignatureOrchestrator};

    async fn orchestrator_with(
        id: &str,
    ) -> (ESignatureOrchestrator<SimulatedGateway>, bindery_core::domain::application::Application)
    {
        let gateway = SimulatedGateway::new();
        let mut app = draft_application(id);
        gateway.create_application(&app).await.expect("create");
        app.state = ApplicationState::Submitted;
        (ESignatureOrchestrator::new(gateway, true), app)
    }

    #[tokio::test]
    async fn draft_application_cannot_open_a_session() {
        let (orchestrator, mut app) = orchestrator_with("APP-E1").await;
        app.state = ApplicationState::Draft;

        let error = orchestrator.request(&app).await.expect_err("still draft");
        assert!(matches!(error, ESignError::NotSubmitted(ApplicationState::Draft)));
    }

    #[tokio::test]
    async fn terminal_application_cannot_open_a_session() {
        let (orchestrator, mut app) = orchestrator_with("APP-E2").await;
        app.state = ApplicationState::Cancelled;

        let error = orchestrator.request(&app).await.expect_err("terminal");
        assert!(matches!(error, ESignError::Terminal(ApplicationState::Cancelled)));
    }

    #[tokio::test]
    async fn annuitant_and_agent_sign_when_owner_is_the_annuitant() {
        let (orchestrator, app) = orchestrator_with("APP-E3").await;
        let session = orchestrator.request(&app).await.expect("session");

        let roles: Vec<SignerRole> = session.signing_urls.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![SignerRole::Annuitant, SignerRole::Agent]);
    }

    #[tokio::test]
    async fn missing_agent_email_fails_closed() {
        let (orchestrator, mut app) = orchestrator_with("APP-E4").await;
        app.agent.email = None;

        let error = orchestrator.request(&app).await.expect_err("no contact");
        assert!(matches!(error, ESignError::MissingContact { role: SignerRole::Agent }));
    }

    #[tokio::test]
    async fn expired_session_urls_are_refused() {
        let (orchestrator, app) = orchestrator_with("APP-E5").await;
        let session = orchestrator.request(&app).await.expect("session");

        let after_expiry = session.expires_at + Duration::minutes(1);
        let error = orchestrator
            .signing_url(&app.id, SignerRole::Annuitant, after_expiry)
            .expect_err("expired");
        assert!(matches!(error, ESignError::SessionExpired { .. }));

        let before_expiry = session.expires_at - Duration::minutes(1);
        let url = orchestrator
            .signing_url(&app.id, SignerRole::Annuitant, before_expiry)
            .expect("still valid");
        assert!(url.contains("annuitant"));
    }

    #[tokio::test]
    async fn disabled_feature_rejects_requests() {
        let gateway = SimulatedGateway::new();
        let mut app = draft_application("APP-E6");
        app.state = ApplicationState::Submitted;
        let orchestrator = ESignatureOrchestrator::new(gateway, false);

        let error = orchestrator.request(&app).await.expect_err("disabled");
        assert!(matches!(error, ESignError::Disabled));
    }
}
