//! Carrier gateway boundary for annuity application submission.
//!
//! Everything async lives here: the [`CarrierGateway`] trait, the live
//! HTTP client, the deterministic simulation, and the services that
//! drive submission, e-signature, 1035 exchanges, and status
//! reconciliation against it. Domain rules stay in `bindery-core`;
//! this crate decides when to call the carrier and what to do with the
//! answer.

pub mod adapter;
pub mod esign;
pub mod exchange;
pub mod live;
pub mod reconciler;
pub mod simulation;
pub mod submission;
pub mod webhook;

pub use adapter::{
    CarrierGateway, CreateApplicationOutcome, ESignSession, ExchangeAcknowledgement, GatewayError,
    HealthStatus, SignerRequest, SignerRole, SignerUrl,
};
pub use esign::{ESignError, ESignatureOrchestrator};
pub use exchange::{render_acord_xml, ExchangeError, ExchangeHandler};
pub use live::FireLightClient;
pub use reconciler::{ApplicationRegistry, ReconcileError, StatusReconciler};
pub use simulation::SimulatedGateway;
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionService};
pub use webhook::{decode_event, WebhookError, WebhookEvent, WebhookEventType};
