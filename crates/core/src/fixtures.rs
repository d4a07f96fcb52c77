//! Deterministic example records used by unit tests across the
//! workspace and by the CLI smoke command. Everything here validates
//! cleanly, so tests mutate exactly the field under exercise.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::application::{AgentInfo, Application, ApplicationId, ApplicationState,
    ProductRef};
use crate::domain::party::{
    Address, Annuitant, Beneficiary, BeneficiaryParty, BeneficiaryTranche, Contact, Owner,
    PersonName, WithholdingElection,
};
use crate::domain::premium::{PaymentMethod, Premium, SourceOfFunds};
use crate::domain::suitability::{
    InvestmentObjective, RiskTolerance, SuitabilityRecord, TimeHorizon, YesNo,
};

pub fn address() -> Address {
    Address {
        line1: "12 Harbor Way".to_string(),
        line2: None,
        city: "Portland".to_string(),
        state: "ME".to_string(),
        postal_code: "04101".to_string(),
    }
}

pub fn annuitant() -> Annuitant {
    Annuitant {
        name: PersonName {
            first: "Dana".to_string(),
            middle: None,
            last: "Whitfield".to_string(),
        },
        date_of_birth: NaiveDate::from_ymd_opt(1958, 6, 14).unwrap_or_default(),
        government_id: "111-22-3344".to_string(),
        contact: Contact {
            email: Some("dana.whitfield@example.com".to_string()),
            phone: Some("207-555-0142".to_string()),
        },
        address: address(),
        employment_status: Some("Retired".to_string()),
        annual_income: Some(Decimal::new(78_000_00, 2)),
        net_worth: Some(Decimal::new(640_000_00, 2)),
        withholding: WithholdingElection::DoNotWithhold,
    }
}

pub fn individual_owner() -> Owner {
    Owner::Individual {
        name: PersonName {
            first: "Dana".to_string(),
            middle: None,
            last: "Whitfield".to_string(),
        },
        date_of_birth: NaiveDate::from_ymd_opt(1958, 6, 14).unwrap_or_default(),
        government_id: "111-22-3344".to_string(),
        contact: Contact {
            email: Some("dana.whitfield@example.com".to_string()),
            phone: None,
        },
        address: address(),
    }
}

pub fn sole_primary_beneficiary() -> Beneficiary {
    Beneficiary {
        tranche: BeneficiaryTranche::Primary,
        party: BeneficiaryParty::Individual {
            name: PersonName {
                first: "Iris".to_string(),
                middle: None,
                last: "Whitfield".to_string(),
            },
            relationship: Some("Daughter".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1991, 4, 2),
        },
        percentage: Decimal::ONE_HUNDRED,
    }
}

pub fn premium() -> Premium {
    Premium {
        initial_amount: Decimal::new(50_000_00, 2),
        recurring: None,
        source_of_funds: SourceOfFunds::Cash,
        payment_method: PaymentMethod::Check,
        routing_number: None,
        account_number: None,
        exchange_1035: None,
        rollover: None,
    }
}

pub fn suitability_record() -> SuitabilityRecord {
    SuitabilityRecord {
        investment_objective: Some(InvestmentObjective::Income),
        time_horizon: Some(TimeHorizon::OverTenYears),
        risk_tolerance: Some(RiskTolerance::Conservative),
        liquidity_needs: Some("Low; pension covers monthly expenses".to_string()),
        emergency_funds: Some(YesNo::Yes),
        other_investments: Some(YesNo::Yes),
        purpose: Some("Guaranteed retirement income".to_string()),
        understand_surrender_charges: true,
        acknowledge_product_disclosure: true,
    }
}

pub fn agent() -> AgentInfo {
    AgentInfo {
        agent_id: "AGT-3302".to_string(),
        name: "Morgan Ellery".to_string(),
        email: Some("m.ellery@bindery.example.com".to_string()),
        license_number: "ME-188271".to_string(),
        npn: "10488213".to_string(),
    }
}

/// A complete, valid application sitting in `Draft`. Timestamps are
/// fixed so fixture-driven assertions stay deterministic.
pub fn draft_application(id: &str) -> Application {
    let created_at = Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).single().unwrap_or_default();
    Application {
        id: ApplicationId(id.to_string()),
        product: ProductRef {
            carrier_code: "GRANITE".to_string(),
            product_code: "FIA-SECURE-7".to_string(),
            plan_name: Some("SecureHorizon 7".to_string()),
        },
        annuitant: annuitant(),
        owner: individual_owner(),
        joint_owner: None,
        beneficiaries: vec![sole_primary_beneficiary()],
        premium: premium(),
        suitability: suitability_record(),
        agent: agent(),
        state: ApplicationState::Draft,
        confirmation_number: None,
        gateway_application_id: None,
        contract_number: None,
        dtcc_reference: None,
        needs_reconciliation: false,
        created_at,
        updated_at: created_at,
    }
}
