//! Folds external status into local lifecycle state.
//!
//! Per application, transitions are serialized through a dedicated
//! async mutex so two racing reports cannot interleave; across
//! applications there is no coordination at all. The monotonic check
//! inside `advance` is the second line of defense: even a caller that
//! bypasses the registry cannot move state backward.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info, warn};

use bindery_core::domain::application::{Application, ApplicationId};
use bindery_core::domain::snapshot::CarrierStatusSnapshot;
use bindery_core::lifecycle::{advance, AdvanceOutcome, LifecycleError};

use crate::adapter::{CarrierGateway, GatewayError};
use crate::webhook::{WebhookError, WebhookEvent};

type SharedApplication = Arc<tokio::sync::Mutex<Application>>;

/// In-memory registry of applications under reconciliation. Each entry
/// carries its own lock; `get` clones the `Arc`, so lock hold times
/// never extend to the registry map itself.
#[derive(Default)]
pub struct ApplicationRegistry {
    inner: Mutex<HashMap<ApplicationId, SharedApplication>>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, application: Application) -> SharedApplication {
        let id = application.id.clone();
        let shared = Arc::new(tokio::sync::Mutex::new(application));
        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(id, shared.clone());
        }
        shared
    }

    pub fn get(&self, id: &ApplicationId) -> Option<SharedApplication> {
        self.inner.lock().ok().and_then(|inner| inner.get(id).cloned())
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("application {0} is not registered for reconciliation")]
    UnknownApplication(ApplicationId),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    /// The poll failed; the last known local state is retained.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct StatusReconciler<G> {
    gateway: G,
    registry: Arc<ApplicationRegistry>,
}

impl<G> StatusReconciler<G>
where
    G: CarrierGateway,
{
    pub fn new(gateway: G, registry: Arc<ApplicationRegistry>) -> Self {
        Self { gateway, registry }
    }

    pub fn registry(&self) -> &Arc<ApplicationRegistry> {
        &self.registry
    }

    /// Poll path: asks the gateway for the current snapshot and folds
    /// it in. On a gateway error the local state is untouched.
    pub async fn poll(&self, id: &ApplicationId) -> Result<AdvanceOutcome, ReconcileError> {
        let entry = self
            .registry
            .get(id)
            .ok_or_else(|| ReconcileError::UnknownApplication(id.clone()))?;

        let snapshot = self.gateway.application_status(id).await?;
        self.fold(&entry, &snapshot).await
    }

    /// Push path: applies a webhook event. Sub-workflow events are a
    /// silent no-op; carriers redeliver, and that is expected.
    pub async fn apply_event(&self, event: &WebhookEvent) -> Result<AdvanceOutcome, ReconcileError> {
        let entry = self
            .registry
            .get(&event.application_id)
            .ok_or_else(|| ReconcileError::UnknownApplication(event.application_id.clone()))?;

        let Some(snapshot) = event.to_snapshot()? else {
            let current = entry.lock().await.state;
            debug!(
                application_id = %event.application_id,
                event_type = ?event.event_type,
                "sub-workflow event acknowledged without lifecycle change"
            );
            return Ok(AdvanceOutcome::Duplicate { state: current });
        };

        self.fold(&entry, &snapshot).await
    }

    async fn fold(
        &self,
        entry: &SharedApplication,
        snapshot: &CarrierStatusSnapshot,
    ) -> Result<AdvanceOutcome, ReconcileError> {
        let mut application = entry.lock().await;
        match advance(&mut application, snapshot) {
            Ok(outcome) => {
                match &outcome {
                    AdvanceOutcome::Applied { from, to } => info!(
                        application_id = %application.id,
                        from = %from,
                        to = %to,
                        "lifecycle advanced from carrier report"
                    ),
                    AdvanceOutcome::Duplicate { state } => debug!(
                        application_id = %application.id,
                        state = %state,
                        "duplicate carrier report discarded"
                    ),
                }
                Ok(outcome)
            }
            Err(error) => {
                warn!(
                    application_id = %application.id,
                    reported = %snapshot.status,
                    current = %application.state,
                    %error,
                    "inconsistent carrier report rejected"
                );
                Err(error.into())
            }
        }
    }
}
