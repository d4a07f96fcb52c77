//! Push-style carrier events.
//!
//! Carriers redeliver events and deliver them out of order; decoding
//! here only produces a [`CarrierStatusSnapshot`] candidate, and the
//! reconciler decides whether it means anything.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bindery_core::domain::application::ApplicationId;
use bindery_core::domain::snapshot::{CarrierStatusSnapshot, DtccStatus, IssuedContract};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "application.submitted")]
    ApplicationSubmitted,
    #[serde(rename = "application.approved")]
    ApplicationApproved,
    #[serde(rename = "application.declined")]
    ApplicationDeclined,
    #[serde(rename = "application.issued")]
    ApplicationIssued,
    #[serde(rename = "contract.delivered")]
    ContractDelivered,
    #[serde(rename = "status.change")]
    StatusChange,
    #[serde(rename = "esignature.completed")]
    ESignatureCompleted,
    #[serde(rename = "exchange.1035.received")]
    Exchange1035Received,
}

impl WebhookEventType {
    /// The lifecycle status this event type implies on its own.
    /// `status.change` carries the status in its payload instead, and
    /// the last two types track sub-workflows, not the lifecycle.
    fn implied_status(&self) -> Option<&'static str> {
        match self {
            Self::ApplicationSubmitted => Some("SUBMITTED"),
            Self::ApplicationApproved => Some("APPROVED"),
            Self::ApplicationDeclined => Some("DECLINED"),
            Self::ApplicationIssued | Self::ContractDelivered => Some("ISSUED"),
            Self::StatusChange | Self::ESignatureCompleted | Self::Exchange1035Received => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_type: WebhookEventType,
    pub application_id: ApplicationId,
    pub status: Option<String>,
    pub status_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub contract_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub dtcc_reference: Option<String>,
    pub dtcc_status: Option<String>,
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("status.change event for {0} carried no status")]
    MissingStatus(ApplicationId),
}

pub fn decode_event(payload: &str) -> Result<WebhookEvent, WebhookError> {
    Ok(serde_json::from_str(payload)?)
}

impl WebhookEvent {
    /// Converts the event into reconciler input. Events that track
    /// sub-workflows (e-signature, 1035 receipt) return `None`: they
    /// never move the lifecycle.
    pub fn to_snapshot(&self) -> Result<Option<CarrierStatusSnapshot>, WebhookError> {
        let status = match (self.event_type.implied_status(), &self.status) {
            (Some(implied), _) => implied.to_string(),
            (None, Some(status)) if self.event_type == WebhookEventType::StatusChange => {
                status.clone()
            }
            (None, None) if self.event_type == WebhookEventType::StatusChange => {
                return Err(WebhookError::MissingStatus(self.application_id.clone()));
            }
            (None, _) => return Ok(None),
        };

        Ok(Some(CarrierStatusSnapshot {
            application_id: self.application_id.clone(),
            status,
            status_date: self.status_date.unwrap_or_else(Utc::now),
            notes: self.notes.clone(),
            issued_contract: self.contract_number.clone().map(|contract_number| IssuedContract {
                contract_number,
                issue_date: self.issue_date,
            }),
            dtcc: self.dtcc_reference.clone().map(|reference| DtccStatus {
                reference,
                status: self.dtcc_status.clone(),
            }),
        }))
    }
}
