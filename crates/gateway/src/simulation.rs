//! Deterministic offline stand-in for the live gateway.
//!
//! Every identifier derives from the caller's application id, so
//! repeated runs produce identical output and tests can assert exact
//! values. Responses are labeled so a simulated confirmation number
//! can never be mistaken for a live one.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use bindery_core::domain::application::{Application, ApplicationId};
use bindery_core::domain::premium::{Exchange1035, TransferAuthorization};
use bindery_core::domain::snapshot::{CarrierStatusSnapshot, DtccStatus};
use bindery_core::domain::suitability::YesNo;

use crate::adapter::{
    CarrierGateway, CreateApplicationOutcome, ESignSession, ExchangeAcknowledgement, GatewayError,
    HealthStatus, SignerRequest, SignerUrl,
};
use crate::exchange::render_acord_xml;

const SESSION_TTL_HOURS: i64 = 72;

#[derive(Default)]
pub struct SimulatedGateway {
    created: Mutex<HashMap<ApplicationId, Application>>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn created_application(&self, id: &ApplicationId) -> Result<Application, GatewayError> {
        self.created
            .lock()
            .map_err(|_| GatewayError::Unavailable("simulation store poisoned".to_string()))?
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::Http {
                status: 404,
                message: format!("no simulated application with id {id}"),
            })
    }
}

#[async_trait]
impl CarrierGateway for SimulatedGateway {
    async fn create_application(
        &self,
        application: &Application,
    ) -> Result<CreateApplicationOutcome, GatewayError> {
        let mut warnings = Vec::new();
        if application.suitability.emergency_funds == Some(YesNo::No) {
            warnings.push(
                "suitability review: client reported no emergency funds; carrier may request \
                 additional documentation"
                    .to_string(),
            );
        }

        self.created
            .lock()
            .map_err(|_| GatewayError::Unavailable("simulation store poisoned".to_string()))?
            .insert(application.id.clone(), application.clone());

        Ok(CreateApplicationOutcome {
            gateway_application_id: format!("SIM-APP-{}", application.id),
            confirmation_number: format!("SIM-CONF-{}", application.id),
            initial_status: "SUBMITTED".to_string(),
            dtcc_reference: Some(format!("SIM-DTCC-{}", application.id)),
            warnings,
        })
    }

    async fn application_status(
        &self,
        id: &ApplicationId,
    ) -> Result<CarrierStatusSnapshot, GatewayError> {
        self.created_application(id)?;
        Ok(CarrierStatusSnapshot {
            application_id: id.clone(),
            status: "IN_REVIEW".to_string(),
            status_date: Utc::now(),
            notes: Some(
                "simulated status: no live carrier gateway is configured for this environment"
                    .to_string(),
            ),
            issued_contract: None,
            dtcc: Some(DtccStatus {
                reference: format!("SIM-DTCC-{id}"),
                status: Some("PENDING".to_string()),
            }),
        })
    }

    async fn request_esignature(
        &self,
        id: &ApplicationId,
        signers: &[SignerRequest],
    ) -> Result<ESignSession, GatewayError> {
        self.created_application(id)?;
        let signing_urls = signers
            .iter()
            .map(|signer| SignerUrl {
                role: signer.role,
                url: format!(
                    "https://esign.simulated.invalid/{id}/{}",
                    signer.role.as_str()
                ),
            })
            .collect();

        Ok(ESignSession {
            session_id: format!("SIM-ESN-{id}"),
            signing_urls,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        })
    }

    async fn submit_1035_exchange(
        &self,
        id: &ApplicationId,
        _exchange: &Exchange1035,
        authorization: &TransferAuthorization,
    ) -> Result<ExchangeAcknowledgement, GatewayError> {
        self.created_application(id)?;
        if !authorization.signed {
            return Err(GatewayError::Http {
                status: 422,
                message: "transfer authorization must be signed".to_string(),
            });
        }
        Ok(ExchangeAcknowledgement { accepted: true, reference: Some(format!("SIM-1035-{id}")) })
    }

    async fn generate_acord_xml(&self, id: &ApplicationId) -> Result<String, GatewayError> {
        let application = self.created_application(id)?;
        Ok(render_acord_xml(&application))
    }

    async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
        Ok(HealthStatus {
            healthy: true,
            environment: "simulation".to_string(),
            version: Some("sim".to_string()),
            message: Some("gateway disabled; deterministic simulation responses".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use bindery_core::domain::application::ApplicationId;
    use bindery_core::domain::suitability::YesNo;
    use bindery_core::fixtures::draft_application;

    use crate::adapter::{CarrierGateway, GatewayError};

    use super::SimulatedGateway;

    #[tokio::test]
    async fn create_is_deterministic_for_the_same_input() {
        let gateway = SimulatedGateway::new();
        let app = draft_application("APP-SIM-1");

        let first = gateway.create_application(&app).await.expect("create");
        let second = gateway.create_application(&app).await.expect("create again");

        assert_eq!(first, second);
        assert_eq!(first.confirmation_number, "SIM-CONF-APP-SIM-1");
        assert_eq!(first.gateway_application_id, "SIM-APP-APP-SIM-1");
    }

    #[tokio::test]
    async fn no_emergency_funds_always_produces_a_warning() {
        let gateway = SimulatedGateway::new();
        let mut app = draft_application("APP-SIM-2");
        app.suitability.emergency_funds = Some(YesNo::No);

        let outcome = gateway.create_application(&app).await.expect("create");
        assert!(outcome.warnings.iter().any(|w| w.contains("emergency funds")));
    }

    #[tokio::test]
    async fn status_for_unknown_application_is_a_404() {
        let gateway = SimulatedGateway::new();
        let error = gateway
            .application_status(&ApplicationId("APP-NOPE".to_string()))
            .await
            .expect_err("unknown id");
        assert!(matches!(error, GatewayError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn status_reports_simulated_in_review_with_note() {
        let gateway = SimulatedGateway::new();
        let app = draft_application("APP-SIM-3");
        gateway.create_application(&app).await.expect("create");

        let snapshot = gateway.application_status(&app.id).await.expect("status");
        assert_eq!(snapshot.status, "IN_REVIEW");
        assert!(snapshot.notes.unwrap_or_default().contains("simulated"));
    }

    #[tokio::test]
    async fn health_check_names_the_simulation_environment() {
        let gateway = SimulatedGateway::new();
        let health = gateway.health_check().await.expect("health");
        assert!(health.healthy);
        assert_eq!(health.environment, "simulation");
    }
}
