use rust_decimal::Decimal;

use crate::domain::party::{
    Address, Annuitant, Beneficiary, BeneficiaryParty, BeneficiaryTranche, Contact, Owner,
};
use crate::validate::{canonical_optional, ValidationReport};

/// Validates annuitant, owner(s), and the beneficiary set, and returns
/// canonical copies with blank optionals trimmed to absent so the
/// gateway always receives the same shape for the same facts.
pub fn validate_parties(
    annuitant: &Annuitant,
    owner: &Owner,
    joint_owner: Option<&Owner>,
    beneficiaries: &[Beneficiary],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_annuitant(annuitant, &mut report);
    validate_owner(owner, "owner", &mut report);
    if let Some(joint) = joint_owner {
        validate_owner(joint, "joint_owner", &mut report);
    }
    validate_beneficiaries(beneficiaries, &mut report);

    report
}

/// Canonical copies of the party records: trimmed names, blank
/// optionals dropped. Run after validation passes.
pub fn normalize_parties(
    annuitant: &Annuitant,
    owner: &Owner,
    joint_owner: Option<&Owner>,
) -> (Annuitant, Owner, Option<Owner>) {
    (
        normalize_annuitant(annuitant),
        normalize_owner(owner),
        joint_owner.map(normalize_owner),
    )
}

fn validate_annuitant(annuitant: &Annuitant, report: &mut ValidationReport) {
    if annuitant.name.first.trim().is_empty() || annuitant.name.last.trim().is_empty() {
        report.error("annuitant.name", "first and last name are required");
    }
    if annuitant.government_id.trim().is_empty() {
        report.error("annuitant.government_id", "government id is required");
    }
    validate_address(&annuitant.address, "annuitant.address", report);
}

fn validate_owner(owner: &Owner, field: &str, report: &mut ValidationReport) {
    match owner {
        Owner::Individual { name, government_id, address, .. } => {
            if name.first.trim().is_empty() || name.last.trim().is_empty() {
                report.error(format!("{field}.name"), "first and last name are required");
            }
            if government_id.trim().is_empty() {
                report.error(format!("{field}.government_id"), "government id is required");
            }
            validate_address(address, &format!("{field}.address"), report);
        }
        Owner::Trust { trust_name, tax_id, trustee_name, address } => {
            if trust_name.trim().is_empty() {
                report.error(format!("{field}.trust_name"), "trust name is required");
            }
            if tax_id.trim().is_empty() {
                report.error(format!("{field}.tax_id"), "trust tax id is required");
            }
            if trustee_name.trim().is_empty() {
                report.error(format!("{field}.trustee_name"), "trustee name is required");
            }
            validate_address(address, &format!("{field}.address"), report);
        }
        Owner::Business { business_name, tax_id, address } => {
            if business_name.trim().is_empty() {
                report.error(format!("{field}.business_name"), "business name is required");
            }
            if tax_id.trim().is_empty() {
                report.error(format!("{field}.tax_id"), "business tax id is required");
            }
            validate_address(address, &format!("{field}.address"), report);
        }
        Owner::Ira { owner_name, plan, address } | Owner::FourOhOneK { owner_name, plan, address } => {
            if owner_name.first.trim().is_empty() || owner_name.last.trim().is_empty() {
                report.error(format!("{field}.owner_name"), "plan owner name is required");
            }
            if plan.plan_type.trim().is_empty() {
                report.error(format!("{field}.plan.plan_type"), "plan type is required");
            }
            if plan.custodian.trim().is_empty() {
                report.error(format!("{field}.plan.custodian"), "plan custodian is required");
            }
            if plan.account_number.trim().is_empty() {
                report.error(
                    format!("{field}.plan.account_number"),
                    "plan account number is required",
                );
            }
            validate_address(address, &format!("{field}.address"), report);
        }
    }
}

fn validate_address(address: &Address, field: &str, report: &mut ValidationReport) {
    if address.line1.trim().is_empty() {
        report.error(format!("{field}.line1"), "street address is required");
    }
    if address.city.trim().is_empty() {
        report.error(format!("{field}.city"), "city is required");
    }
    if address.state.trim().is_empty() {
        report.error(format!("{field}.state"), "state is required");
    }
    if address.postal_code.trim().is_empty() {
        report.error(format!("{field}.postal_code"), "postal code is required");
    }
}

fn validate_beneficiaries(beneficiaries: &[Beneficiary], report: &mut ValidationReport) {
    let primaries: Vec<&Beneficiary> = beneficiaries
        .iter()
        .filter(|b| b.tranche == BeneficiaryTranche::Primary)
        .collect();
    let contingents: Vec<&Beneficiary> = beneficiaries
        .iter()
        .filter(|b| b.tranche == BeneficiaryTranche::Contingent)
        .collect();

    if primaries.is_empty() {
        report.error("beneficiaries", "at least one primary beneficiary is required");
    }

    check_tranche_sum(&primaries, "primary", report);
    if !contingents.is_empty() {
        check_tranche_sum(&contingents, "contingent", report);
    }

    for (index, beneficiary) in beneficiaries.iter().enumerate() {
        if beneficiary.percentage <= Decimal::ZERO {
            report.error(
                format!("beneficiaries[{index}].percentage"),
                "percentage must be greater than zero",
            );
        }
        if let BeneficiaryParty::Individual { name, .. } = &beneficiary.party {
            if name.first.trim().is_empty() || name.last.trim().is_empty() {
                report.error(
                    format!("beneficiaries[{index}].name"),
                    "beneficiary name is required",
                );
            }
        }
    }
}

fn check_tranche_sum(tranche: &[&Beneficiary], label: &str, report: &mut ValidationReport) {
    let sum: Decimal = tranche.iter().map(|b| b.percentage).sum();
    if !tranche.is_empty() && sum != Decimal::ONE_HUNDRED {
        report.error(
            "beneficiaries",
            format!("{label} beneficiary percentages must sum to 100 (currently {sum})"),
        );
    }
}

fn normalize_annuitant(annuitant: &Annuitant) -> Annuitant {
    let mut canonical = annuitant.clone();
    canonical.name.middle = canonical_optional(&annuitant.name.middle);
    canonical.contact = normalize_contact(&annuitant.contact);
    canonical.address.line2 = canonical_optional(&annuitant.address.line2);
    canonical.employment_status = canonical_optional(&annuitant.employment_status);
    canonical
}

fn normalize_owner(owner: &Owner) -> Owner {
    let mut canonical = owner.clone();
    match &mut canonical {
        Owner::Individual { name, contact, address, .. } => {
            name.middle = canonical_optional(&name.middle);
            *contact = normalize_contact(contact);
            address.line2 = canonical_optional(&address.line2);
        }
        Owner::Trust { address, .. }
        | Owner::Business { address, .. }
        | Owner::Ira { address, .. }
        | Owner::FourOhOneK { address, .. } => {
            address.line2 = canonical_optional(&address.line2);
        }
    }
    canonical
}

fn normalize_contact(contact: &Contact) -> Contact {
    Contact {
        email: canonical_optional(&contact.email),
        phone: canonical_optional(&contact.phone),
    }
}
