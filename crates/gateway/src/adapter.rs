//! The carrier gateway boundary.
//!
//! [`CarrierGateway`] is the only seam that talks to the external
//! carrier-submission service. It has exactly two implementations:
//! [`crate::live::FireLightClient`] for configured environments and
//! [`crate::simulation::SimulatedGateway`] for everything else. The
//! adapter is picked once at construction; nothing branches per call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bindery_core::domain::application::{Application, ApplicationId};
use bindery_core::domain::premium::{Exchange1035, TransferAuthorization};
use bindery_core::domain::snapshot::CarrierStatusSnapshot;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("gateway response was malformed: {0}")]
    Malformed(String),
    /// Distinct from `Http`: the true outcome is unknown. Callers of
    /// `create_application` must route this to manual reconciliation
    /// instead of retrying.
    #[error("gateway call exceeded its {0:?} budget")]
    Timeout(Duration),
    #[error("gateway unreachable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Success payload of a create call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApplicationOutcome {
    pub gateway_application_id: String,
    pub confirmation_number: String,
    pub initial_status: String,
    pub dtcc_reference: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Annuitant,
    Owner,
    JointOwner,
    Agent,
}

impl SignerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annuitant => "annuitant",
            Self::Owner => "owner",
            Self::JointOwner => "joint_owner",
            Self::Agent => "agent",
        }
    }
}

/// One required signer, in signing order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerRequest {
    pub role: SignerRole,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerUrl {
    pub role: SignerRole,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ESignSession {
    pub session_id: String,
    pub signing_urls: Vec<SignerUrl>,
    pub expires_at: DateTime<Utc>,
}

impl ESignSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeAcknowledgement {
    pub accepted: bool,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub environment: String,
    pub version: Option<String>,
    pub message: Option<String>,
}

/// Operations exposed by the carrier gateway. Status, health, ACORD,
/// and e-signature requests are idempotent on the caller's
/// identifiers; `create_application` is not, which is why an
/// unknown-outcome create is never retried blindly.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    async fn create_application(
        &self,
        application: &Application,
    ) -> Result<CreateApplicationOutcome, GatewayError>;

    async fn application_status(
        &self,
        id: &ApplicationId,
    ) -> Result<CarrierStatusSnapshot, GatewayError>;

    async fn request_esignature(
        &self,
        id: &ApplicationId,
        signers: &[SignerRequest],
    ) -> Result<ESignSession, GatewayError>;

    async fn submit_1035_exchange(
        &self,
        id: &ApplicationId,
        exchange: &Exchange1035,
        authorization: &TransferAuthorization,
    ) -> Result<ExchangeAcknowledgement, GatewayError>;

    async fn generate_acord_xml(&self, id: &ApplicationId) -> Result<String, GatewayError>;

    async fn health_check(&self) -> Result<HealthStatus, GatewayError>;
}
