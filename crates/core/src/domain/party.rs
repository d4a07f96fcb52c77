use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
}

impl PersonName {
    pub fn full(&self) -> String {
        match &self.middle {
            Some(middle) => format!("{} {} {}", self.first, middle, self.last),
            None => format!("{} {}", self.first, self.last),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Federal tax-withholding election captured on the application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "election", rename_all = "snake_case")]
pub enum WithholdingElection {
    DoNotWithhold,
    Withhold { percentage: Decimal },
}

/// The person whose life and age drive annuity pricing. Immutable once
/// the application leaves `Draft`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annuitant {
    pub name: PersonName,
    pub date_of_birth: NaiveDate,
    pub government_id: String,
    pub contact: Contact,
    pub address: Address,
    pub employment_status: Option<String>,
    pub annual_income: Option<Decimal>,
    pub net_worth: Option<Decimal>,
    pub withholding: WithholdingElection,
}

/// Descriptor for qualified-plan owners (IRA / 401k).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedPlan {
    pub plan_type: String,
    pub custodian: String,
    pub account_number: String,
}

/// Legal owner of the contract. May differ from the annuitant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Owner {
    Individual {
        name: PersonName,
        date_of_birth: NaiveDate,
        government_id: String,
        contact: Contact,
        address: Address,
    },
    Trust {
        trust_name: String,
        tax_id: String,
        trustee_name: String,
        address: Address,
    },
    Business {
        business_name: String,
        tax_id: String,
        address: Address,
    },
    Ira {
        owner_name: PersonName,
        plan: QualifiedPlan,
        address: Address,
    },
    FourOhOneK {
        owner_name: PersonName,
        plan: QualifiedPlan,
        address: Address,
    },
}

impl Owner {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Individual { .. } => "individual",
            Self::Trust { .. } => "trust",
            Self::Business { .. } => "business",
            Self::Ira { .. } => "ira",
            Self::FourOhOneK { .. } => "401k",
        }
    }

    pub fn is_qualified_plan(&self) -> bool {
        matches!(self, Self::Ira { .. } | Self::FourOhOneK { .. })
    }

    /// Government id for individual owners, used to decide whether the
    /// owner is the annuitant wearing a second hat.
    pub fn government_id(&self) -> Option<&str> {
        match self {
            Self::Individual { government_id, .. } => Some(government_id),
            _ => None,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            Self::Individual { address, .. }
            | Self::Trust { address, .. }
            | Self::Business { address, .. }
            | Self::Ira { address, .. }
            | Self::FourOhOneK { address, .. } => address,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryTranche {
    Primary,
    Contingent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeneficiaryParty {
    Individual {
        name: PersonName,
        relationship: Option<String>,
        date_of_birth: Option<NaiveDate>,
    },
    Trust {
        trust_name: String,
        tax_id: Option<String>,
    },
    Estate,
    Charity {
        organization_name: String,
        tax_id: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub tranche: BeneficiaryTranche,
    pub party: BeneficiaryParty,
    pub percentage: Decimal,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{
        Address, Beneficiary, BeneficiaryParty, BeneficiaryTranche, Owner, PersonName,
        QualifiedPlan,
    };

    fn address() -> Address {
        Address {
            line1: "12 Harbor Way".to_string(),
            line2: None,
            city: "Portland".to_string(),
            state: "ME".to_string(),
            postal_code: "04101".to_string(),
        }
    }

    #[test]
    fn qualified_plan_owners_are_flagged() {
        let ira = Owner::Ira {
            owner_name: PersonName {
                first: "Dana".to_string(),
                middle: None,
                last: "Whitfield".to_string(),
            },
            plan: QualifiedPlan {
                plan_type: "Traditional IRA".to_string(),
                custodian: "Granite Trust".to_string(),
                account_number: "IRA-88120".to_string(),
            },
            address: address(),
        };
        assert!(ira.is_qualified_plan());
        assert_eq!(ira.kind(), "ira");
        assert!(ira.government_id().is_none());

        let trust = Owner::Trust {
            trust_name: "Whitfield Family Trust".to_string(),
            tax_id: "84-1102763".to_string(),
            trustee_name: "Dana Whitfield".to_string(),
            address: address(),
        };
        assert!(!trust.is_qualified_plan());
    }

    #[test]
    fn beneficiary_round_trips_through_serde() {
        let beneficiary = Beneficiary {
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
            percentage: Decimal::new(10_000, 2),
        };

        let json = serde_json::to_string(&beneficiary).expect("serialize");
        let parsed: Beneficiary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, beneficiary);
        assert!(json.contains("\"kind\":\"individual\""));
    }
}
