//! Live FireLight client.
//!
//! JSON over HTTPS with a bearer token and partner id on every call.
//! Mutating calls run on the configured request budget (30s default);
//! health checks get a short budget of their own. A timed-out call is
//! reported as [`GatewayError::Timeout`], never retried here.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bindery_core::config::{GatewayConfig, GatewayEnvironment};
use bindery_core::domain::application::{Application, ApplicationId};
use bindery_core::domain::premium::{Exchange1035, TransferAuthorization};
use bindery_core::domain::snapshot::{CarrierStatusSnapshot, DtccStatus, IssuedContract};

use crate::adapter::{
    CarrierGateway, CreateApplicationOutcome, ESignSession, ExchangeAcknowledgement, GatewayError,
    HealthStatus, SignerRequest, SignerUrl,
};

const PARTNER_HEADER: &str = "X-Partner-Id";

pub struct FireLightClient {
    http: Client,
    base_url: String,
    api_token: SecretString,
    partner_id: String,
    environment: GatewayEnvironment,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl FireLightClient {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| config.environment.default_base_url().to_string());

        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            partner_id: config.partner_id.clone(),
            environment: config.environment,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, budget: Duration) -> RequestBuilder {
        builder
            .timeout(budget)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.api_token.expose_secret()),
            )
            .header(PARTNER_HEADER, &self.partner_id)
    }

    fn map_transport_error(&self, error: reqwest::Error, budget: Duration) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(budget)
        } else {
            GatewayError::Unavailable(error.to_string())
        }
    }

    async fn check_status(&self, response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        warn!(status = status.as_u16(), %message, "gateway returned non-success status");
        Err(GatewayError::Http { status: status.as_u16(), message })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, GatewayError> {
        response.json::<T>().await.map_err(|err| GatewayError::Malformed(err.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    partner_id: &'a str,
    application: &'a Application,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    application_id: String,
    confirmation_number: String,
    status: String,
    dtcc_reference: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    status_date: DateTime<Utc>,
    notes: Option<String>,
    contract_number: Option<String>,
    issue_date: Option<NaiveDate>,
    dtcc_reference: Option<String>,
    dtcc_status: Option<String>,
}

#[derive(Debug, Serialize)]
struct ESignRequest<'a> {
    signers: &'a [SignerRequest],
}

#[derive(Debug, Deserialize)]
struct ESignResponse {
    session_id: String,
    signing_urls: Vec<SignerUrl>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    exchange: &'a Exchange1035,
    authorization: &'a TransferAuthorization,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    accepted: bool,
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    healthy: bool,
    environment: Option<String>,
    version: Option<String>,
    message: Option<String>,
}

#[async_trait::async_trait]
impl CarrierGateway for FireLightClient {
    async fn create_application(
        &self,
        application: &Application,
    ) -> Result<CreateApplicationOutcome, GatewayError> {
        info!(application_id = %application.id, "submitting application to carrier gateway");

        let request = self
            .authorized(self.http.post(self.url("/applications")), self.request_timeout)
            .json(&CreateRequest { partner_id: &self.partner_id, application });

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err, self.request_timeout))?;
        let body: CreateResponse = self.decode(self.check_status(response).await?).await?;

        Ok(CreateApplicationOutcome {
            gateway_application_id: body.application_id,
            confirmation_number: body.confirmation_number,
            initial_status: body.status,
            dtcc_reference: body.dtcc_reference,
            warnings: body.warnings,
        })
    }

    async fn application_status(
        &self,
        id: &ApplicationId,
    ) -> Result<CarrierStatusSnapshot, GatewayError> {
        let request = self.authorized(
            self.http.get(self.url(&format!("/applications/{id}/status"))),
            self.request_timeout,
        );

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err, self.request_timeout))?;
        let body: StatusResponse = self.decode(self.check_status(response).await?).await?;

        Ok(CarrierStatusSnapshot {
            application_id: id.clone(),
            status: body.status,
            status_date: body.status_date,
            notes: body.notes,
            issued_contract: body.contract_number.map(|contract_number| IssuedContract {
                contract_number,
                issue_date: body.issue_date,
            }),
            dtcc: body.dtcc_reference.map(|reference| DtccStatus {
                reference,
                status: body.dtcc_status,
            }),
        })
    }

    async fn request_esignature(
        &self,
        id: &ApplicationId,
        signers: &[SignerRequest],
    ) -> Result<ESignSession, GatewayError> {
        let request = self
            .authorized(
                self.http.post(self.url(&format!("/applications/{id}/esignature"))),
                self.request_timeout,
            )
            .json(&ESignRequest { signers });

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err, self.request_timeout))?;
        let body: ESignResponse = self.decode(self.check_status(response).await?).await?;

        Ok(ESignSession {
            session_id: body.session_id,
            signing_urls: body.signing_urls,
            expires_at: body.expires_at,
        })
    }

    async fn submit_1035_exchange(
        &self,
        id: &ApplicationId,
        exchange: &Exchange1035,
        authorization: &TransferAuthorization,
    ) -> Result<ExchangeAcknowledgement, GatewayError> {
        let request = self
            .authorized(
                self.http.post(self.url(&format!("/applications/{id}/1035-exchange"))),
                self.request_timeout,
            )
            .json(&ExchangeRequest { exchange, authorization });

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err, self.request_timeout))?;
        let body: ExchangeResponse = self.decode(self.check_status(response).await?).await?;

        Ok(ExchangeAcknowledgement { accepted: body.accepted, reference: body.reference })
    }

    async fn generate_acord_xml(&self, id: &ApplicationId) -> Result<String, GatewayError> {
        let request = self.authorized(
            self.http.get(self.url(&format!("/applications/{id}/acord"))),
            self.request_timeout,
        );

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err, self.request_timeout))?;
        let response = self.check_status(response).await?;
        let xml =
            response.text().await.map_err(|err| GatewayError::Malformed(err.to_string()))?;
        if !xml.trim_start().starts_with("<?xml") && !xml.trim_start().starts_with('<') {
            return Err(GatewayError::Malformed("ACORD response is not XML".to_string()));
        }
        Ok(xml)
    }

    async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
        let request = self.authorized(self.http.get(self.url("/health")), self.health_timeout);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let mapped = self.map_transport_error(err, self.health_timeout);
                return Ok(HealthStatus {
                    healthy: false,
                    environment: self.environment.as_str().to_string(),
                    version: None,
                    message: Some(mapped.to_string()),
                });
            }
        };

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(HealthStatus {
                healthy: false,
                environment: self.environment.as_str().to_string(),
                version: None,
                message: Some("gateway reported service unavailable".to_string()),
            });
        }

        let body: HealthResponse = self.decode(self.check_status(response).await?).await?;
        Ok(HealthStatus {
            healthy: body.healthy,
            environment: body
                .environment
                .unwrap_or_else(|| self.environment.as_str().to_string()),
            version: body.version,
            message: body.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use bindery_core::config::{GatewayConfig, GatewayEnvironment};

    use super::FireLightClient;

    fn config(base_url: Option<&str>) -> GatewayConfig {
        GatewayConfig {
            environment: GatewayEnvironment::Sandbox,
            enabled: true,
            base_url: base_url.map(str::to_string),
            api_token: "tok-test".to_string().into(),
            partner_id: "PARTNER-1".to_string(),
            request_timeout_secs: 30,
            health_timeout_secs: 5,
        }
    }

    #[test]
    fn base_url_falls_back_to_environment_endpoint() {
        let client = FireLightClient::from_config(&config(None));
        assert!(client.url("/health").starts_with("https://sandbox."));
    }

    #[test]
    fn explicit_base_url_wins_and_is_normalized() {
        let client = FireLightClient::from_config(&config(Some("https://gw.example.com/v2/")));
        assert_eq!(client.url("/applications"), "https://gw.example.com/v2/applications");
    }
}
