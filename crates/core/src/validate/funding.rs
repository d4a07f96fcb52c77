use rust_decimal::Decimal;

use crate::domain::premium::{PaymentMethod, Premium, SourceOfFunds};
use crate::validate::ValidationReport;

/// Validates the funding source invariants: source-specific
/// sub-records, 1035 value sanity, and ACH banking details.
pub fn validate_funding(premium: &Premium) -> ValidationReport {
    let mut report = ValidationReport::default();

    if premium.initial_amount <= Decimal::ZERO {
        report.error("premium.initial_amount", "initial premium must be greater than zero");
    }
    if let Some(recurring) = &premium.recurring {
        if recurring.amount <= Decimal::ZERO {
            report.error("premium.recurring.amount", "recurring premium must be greater than zero");
        }
    }

    match premium.source_of_funds {
        SourceOfFunds::Exchange1035 => match &premium.exchange_1035 {
            None => report.error(
                "premium.exchange_1035",
                "1035 exchange details are required when source of funds is a 1035 exchange",
            ),
            Some(exchange) => {
                if exchange.losing_carrier.trim().is_empty() {
                    report.error("premium.exchange_1035.losing_carrier", "losing carrier is required");
                }
                if exchange.policy_number.trim().is_empty() {
                    report.error(
                        "premium.exchange_1035.policy_number",
                        "losing policy number is required",
                    );
                }
                if let (Some(surrender), Some(account)) =
                    (exchange.surrender_value, exchange.account_value)
                {
                    if surrender > account {
                        report.error(
                            "premium.exchange_1035.surrender_value",
                            format!(
                                "surrender value {surrender} exceeds account value {account}"
                            ),
                        );
                    }
                }
                if let Some(charges) = exchange.surrender_charges {
                    if charges > Decimal::ZERO {
                        report.warn(
                            "premium.exchange_1035.surrender_charges",
                            format!("client will incur {charges} in surrender charges"),
                        );
                    }
                }
                let signed = exchange.authorization.as_ref().map(|a| a.signed).unwrap_or(false);
                if !signed {
                    report.error(
                        "premium.exchange_1035.authorization",
                        "a signed transfer authorization is required before submission",
                    );
                }
            }
        },
        SourceOfFunds::Rollover => {
            if premium.rollover.is_none() {
                report.error(
                    "premium.rollover",
                    "rollover details are required when source of funds is a rollover",
                );
            } else if let Some(rollover) = &premium.rollover {
                if rollover.custodian.trim().is_empty() {
                    report.error("premium.rollover.custodian", "losing custodian is required");
                }
                if rollover.account_number.trim().is_empty() {
                    report.error("premium.rollover.account_number", "account number is required");
                }
            }
        }
        SourceOfFunds::Cash | SourceOfFunds::QualifiedTransfer => {}
    }

    match premium.payment_method {
        PaymentMethod::Ach => {
            if premium.routing_number.as_deref().map(str::trim).unwrap_or("").is_empty() {
                report.error("premium.routing_number", "routing number is required for ACH");
            }
            if premium.account_number.as_deref().map(str::trim).unwrap_or("").is_empty() {
                report.error("premium.account_number", "account number is required for ACH");
            }
        }
        PaymentMethod::Check | PaymentMethod::Wire => {
            if premium.routing_number.is_some() || premium.account_number.is_some() {
                report.error(
                    "premium.payment_method",
                    "banking details are only accepted for ACH payments",
                );
            }
        }
    }

    report
}
