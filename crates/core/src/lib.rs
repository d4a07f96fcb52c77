pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod lifecycle;
pub mod validate;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
    NoopAuditSink,
};
pub use config::{
    AppConfig, ConfigError, ConfigOverrides, FeatureFlags, GatewayConfig, GatewayEnvironment,
    LoadOptions, LogFormat, LoggingConfig,
};
pub use domain::application::{
    AgentInfo, Application, ApplicationId, ApplicationState, ConfirmationNumber, ProductRef,
};
pub use domain::party::{
    Address, Annuitant, Beneficiary, BeneficiaryParty, BeneficiaryTranche, Contact, Owner,
    PersonName, QualifiedPlan, WithholdingElection,
};
pub use domain::premium::{
    Exchange1035, IraRollover, PaymentMethod, Premium, PremiumFrequency, RecurringPremium,
    RolloverType, SourceOfFunds, TransferAuthorization,
};
pub use domain::snapshot::{CarrierStatusSnapshot, DtccStatus, IssuedContract};
pub use domain::suitability::{
    InvestmentObjective, RiskTolerance, SuitabilityRecord, TimeHorizon, YesNo,
};
pub use errors::DomainError;
pub use lifecycle::{advance, map_carrier_status, plan_advance, AdvanceOutcome, LifecycleError};
pub use validate::funding::validate_funding;
pub use validate::party::{normalize_parties, validate_parties};
pub use validate::suitability::validate_suitability;
pub use validate::{ValidationIssue, ValidationReport};
