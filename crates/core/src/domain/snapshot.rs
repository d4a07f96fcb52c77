use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::application::ApplicationId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssuedContract {
    pub contract_number: String,
    pub issue_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtccStatus {
    pub reference: String,
    pub status: Option<String>,
}

/// Ephemeral status pulled from the carrier gateway or delivered by a
/// webhook. Never authoritative on its own: it is input to the
/// lifecycle's `advance` contract, not a stored state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarrierStatusSnapshot {
    pub application_id: ApplicationId,
    pub status: String,
    pub status_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub issued_contract: Option<IssuedContract>,
    pub dtcc: Option<DtccStatus>,
}
