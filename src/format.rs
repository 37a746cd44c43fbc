use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;

use crate::document::{ContractDocument, Metadata, Section};

/// Contract field groups, each tied to the section titles likely to hold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FieldGroup {
    Preamble,
    Payment,
    License,
    Term,
    PriceAdjustment,
    Expenses,
    Warranties,
    Liability,
    Sla,
    GoverningLaw,
    Exhibit,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 11] = [
        FieldGroup::Preamble,
        FieldGroup::Payment,
        FieldGroup::License,
        FieldGroup::Term,
        FieldGroup::PriceAdjustment,
        FieldGroup::Expenses,
        FieldGroup::Warranties,
        FieldGroup::Liability,
        FieldGroup::Sla,
        FieldGroup::GoverningLaw,
        FieldGroup::Exhibit,
    ];

    /// Alternation matched case-insensitively against section titles and numbers.
    pub fn pattern(self) -> &'static str {
        match self {
            FieldGroup::Preamble => "preamble|recitals",
            FieldGroup::Payment => "payment|fee|price|consideration|purchase|invoice|charge",
            FieldGroup::License => "license|rights|intellectual|property|ip|grant",
            FieldGroup::Term => "term|renewal|termination|scope",
            FieldGroup::PriceAdjustment => "price|adjustment|change",
            FieldGroup::Expenses => "expense|tax|cost|travel",
            FieldGroup::Warranties => "warrant|representation",
            FieldGroup::Liability => "indemnif|liabilit|damage|limitation",
            FieldGroup::Sla => "sla|service.level|support|maintenance|error|resolution|response",
            FieldGroup::GoverningLaw => "govern|law|jurisdiction|venue|arbitration|miscellaneous",
            FieldGroup::Exhibit => "exhibit",
        }
    }

    /// Extracted contract fields these sections inform.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            FieldGroup::Preamble => &[
                "form", "exhibit", "date", "buyer", "buyer_location", "seller",
                "seller_location", "issuer", "issuer_location", "agreement_type",
            ],
            FieldGroup::Payment => &[
                "fee_model", "fee_type", "fee_amount", "fee_mode", "fee_percent",
                "charged_per", "payment_freq", "tranche_trigger", "delivery_trigger",
                "payment_timing", "payment_method",
            ],
            FieldGroup::License => &[
                "license_transferable", "sublicensing", "exclusive",
                "title_and_interest_sold", "ip_sold", "deliverables",
                "derivative_work_owned_by",
            ],
            FieldGroup::Term => &[
                "auto_renews", "term", "can_terminate", "termination_notice",
                "breach_terminable", "breach_notice", "breach_prorated",
                "coc_terminable", "coc_notice",
            ],
            FieldGroup::PriceAdjustment => &[
                "prices_adjustable", "price_change_notice", "price_change_requires",
                "no_price_changes",
            ],
            FieldGroup::Expenses => &["who_pays_sales_tax", "who_pays_expenses", "expenses_include"],
            FieldGroup::Warranties => &[
                "reps_and_warranties_mutual", "reps_and_warranties_seller",
                "reps_and_warranties_buyer", "warranty_period",
            ],
            FieldGroup::Liability => &[
                "indemnification", "indemnity_notify", "indemnity_discovery_trigger",
                "liable_for_indirect_damages", "max_liability", "liability_time_limit",
            ],
            FieldGroup::Sla => &[
                "has_sla", "sla_tiers", "sla_has_service_credits", "sla_credit_cap_pct",
                "sla_critical_response", "sla_critical_fulltime", "sla_medium_fix",
                "sla_low_fix_required", "sla_goals_strict", "are_upgrades_provided",
            ],
            FieldGroup::GoverningLaw => &["law_in_state_of", "arbitration_in_state_of"],
            FieldGroup::Exhibit => &["fee_amount", "fee_model", "charged_per", "payment_freq"],
        }
    }

    fn regex(self) -> &'static Regex {
        &GROUP_RES[self as usize]
    }
}

static GROUP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FieldGroup::ALL
        .iter()
        .map(|g| Regex::new(&format!("(?i){}", g.pattern())).unwrap())
        .collect()
});

/// Sections whose title or number matches the group's pattern, in document order.
pub fn relevant_sections(doc: &ContractDocument, group: FieldGroup) -> Vec<&Section> {
    let re = group.regex();
    doc.sections
        .iter()
        .filter(|s| re.is_match(&s.title) || re.is_match(&s.number))
        .collect()
}

/// Flat prompt text for the whole document.
pub fn format_document(doc: &ContractDocument) -> String {
    format_sections(&doc.sections, Some(&doc.metadata))
}

/// Flat prompt text for a subset of sections, optionally headed by metadata.
pub fn format_sections<'a>(
    sections: impl IntoIterator<Item = &'a Section>,
    metadata: Option<&Metadata>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(metadata) = metadata {
        parts.push("=== METADATA ===".to_string());
        for (key, value) in metadata.fields() {
            parts.push(format!("{}: {}", key, value));
        }
        parts.push(String::new());
    }

    for section in sections {
        if section.is_preamble() {
            parts.push("=== PREAMBLE ===".to_string());
        } else {
            parts.push(format!("=== Section {}: {} ===", section.number, section.title));
        }
        parts.push(section.text.clone());
        parts.push(String::new());
    }

    parts.join("\n")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: &str, title: &str, text: &str) -> Section {
        Section {
            number: number.into(),
            title: title.into(),
            text: text.into(),
        }
    }

    fn sample() -> ContractDocument {
        ContractDocument {
            metadata: Metadata {
                doc_type: "EX-10.2".into(),
                sequence: "2".into(),
                filename: "ex10-2.htm".into(),
                description: "SUPPORT AGREEMENT".into(),
            },
            sections: vec![
                Section::preamble("Between Seller and Buyer.".into()),
                section("1", "Fees and Payment", "Net 30."),
                section("2", "Term and Termination", "One year."),
                section("3", "Governing Law", "Delaware."),
                section("Exhibit A", "Statement of Work", "Hosting."),
            ],
        }
    }

    #[test]
    fn whole_document_layout() {
        let text = format_document(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[..8],
            [
                "=== METADATA ===",
                "type: EX-10.2",
                "sequence: 2",
                "filename: ex10-2.htm",
                "description: SUPPORT AGREEMENT",
                "",
                "=== PREAMBLE ===",
                "Between Seller and Buyer.",
            ]
        );
        assert!(text.contains("=== Section 1: Fees and Payment ===\nNet 30.\n"));
        assert!(text.contains("=== Section Exhibit A: Statement of Work ===\nHosting.\n"));
        assert!(text.ends_with("Hosting.\n"));
    }

    #[test]
    fn subset_without_metadata() {
        let doc = sample();
        let text = format_sections(&doc.sections[2..3], None);
        assert_eq!(text, "=== Section 2: Term and Termination ===\nOne year.\n");
    }

    #[test]
    fn empty_subset() {
        assert_eq!(format_sections(&[], None), "");
    }

    fn numbers(doc: &ContractDocument, group: FieldGroup) -> Vec<&str> {
        relevant_sections(doc, group)
            .into_iter()
            .map(|s| s.number.as_str())
            .collect()
    }

    #[test]
    fn relevance_by_title_and_number() {
        let doc = sample();
        assert_eq!(numbers(&doc, FieldGroup::Preamble), ["0"]);
        assert_eq!(numbers(&doc, FieldGroup::Payment), ["1"]);
        assert_eq!(numbers(&doc, FieldGroup::Term), ["2"]);
        assert_eq!(numbers(&doc, FieldGroup::GoverningLaw), ["3"]);
        assert_eq!(numbers(&doc, FieldGroup::Exhibit), ["Exhibit A"]);
        assert!(numbers(&doc, FieldGroup::Warranties).is_empty());
    }

    #[test]
    fn every_group_has_fields() {
        for group in FieldGroup::ALL {
            assert!(!group.fields().is_empty());
            assert!(group.regex().is_match(group.pattern().split('|').next().unwrap()));
        }
    }
}
