use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentObjective {
    Growth,
    Income,
    Preservation,
    TaxDeferral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    UnderFiveYears,
    FiveToTenYears,
    OverTenYears,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

/// The suitability questionnaire captured before submission. Every
/// field must be populated and both acknowledgments true before an
/// application may leave `Draft`; the record stays editable until then.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitabilityRecord {
    pub investment_objective: Option<InvestmentObjective>,
    pub time_horizon: Option<TimeHorizon>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub liquidity_needs: Option<String>,
    pub emergency_funds: Option<YesNo>,
    pub other_investments: Option<YesNo>,
    pub purpose: Option<String>,
    pub understand_surrender_charges: bool,
    pub acknowledge_product_disclosure: bool,
}
