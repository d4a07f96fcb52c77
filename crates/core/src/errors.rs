use thiserror::Error;

use crate::domain::application::ApplicationState;
use crate::lifecycle::LifecycleError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid application transition from {from} to {to}")]
    InvalidStateTransition { from: ApplicationState, to: ApplicationState },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
