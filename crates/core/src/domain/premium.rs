use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOfFunds {
    Cash,
    #[serde(rename = "1035_exchange")]
    Exchange1035,
    Rollover,
    QualifiedTransfer,
}

impl SourceOfFunds {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Exchange1035 => "1035_exchange",
            Self::Rollover => "rollover",
            Self::QualifiedTransfer => "qualified_transfer",
        }
    }
}

impl std::fmt::Display for SourceOfFunds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Check,
    Wire,
    Ach,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFrequency {
    Monthly,
    Quarterly,
    Annual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringPremium {
    pub amount: Decimal,
    pub frequency: PremiumFrequency,
}

/// Signed transfer-authorization proof for a 1035 exchange. An unsigned
/// authorization blocks submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAuthorization {
    pub signed: bool,
    pub signed_at: Option<DateTime<Utc>>,
    pub document_reference: Option<String>,
}

/// Losing-contract details for a 1035 exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exchange1035 {
    pub losing_carrier: String,
    pub policy_number: String,
    pub account_value: Option<Decimal>,
    pub surrender_value: Option<Decimal>,
    pub surrender_charges: Option<Decimal>,
    pub authorization: Option<TransferAuthorization>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverType {
    Direct,
    Indirect,
}

/// Losing-custodian details for an IRA rollover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IraRollover {
    pub custodian: String,
    pub account_number: String,
    pub account_value: Option<Decimal>,
    pub rollover_type: RolloverType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Premium {
    pub initial_amount: Decimal,
    pub recurring: Option<RecurringPremium>,
    pub source_of_funds: SourceOfFunds,
    pub payment_method: PaymentMethod,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub exchange_1035: Option<Exchange1035>,
    pub rollover: Option<IraRollover>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{PaymentMethod, Premium, SourceOfFunds};

    #[test]
    fn source_of_funds_serializes_with_industry_labels() {
        let premium = Premium {
            initial_amount: Decimal::new(25_000_00, 2),
            recurring: None,
            source_of_funds: SourceOfFunds::Exchange1035,
            payment_method: PaymentMethod::Check,
            routing_number: None,
            account_number: None,
            exchange_1035: None,
            rollover: None,
        };

        let json = serde_json::to_string(&premium).expect("serialize");
        assert!(json.contains("\"source_of_funds\":\"1035_exchange\""));
        assert_eq!(SourceOfFunds::Rollover.as_str(), "rollover");
    }
}
