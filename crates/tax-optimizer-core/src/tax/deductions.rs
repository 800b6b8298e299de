use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TaxOptimizerError;
use crate::types::Money;
use crate::TaxOptimizerResult;

// ---------------------------------------------------------------------------
// Categories and sections
// ---------------------------------------------------------------------------

/// Claimed deduction category.
///
/// Deserialized from a plain label. Labels that match none of the known
/// categories land in `Unrecognized` and never match any aggregation filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeductionCategory {
    Epf,
    Ppf,
    Elss,
    LifeInsurance,
    Nsc,
    HealthInsurance,
    Nps,
    HomeLoanInterest,
    Unrecognized(String),
}

impl DeductionCategory {
    pub fn parse(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "epf" | "employeeprovidentfund" | "providentfund" => DeductionCategory::Epf,
            "ppf" | "publicprovidentfund" => DeductionCategory::Ppf,
            "elss" | "equitylinkedsavingsscheme" => DeductionCategory::Elss,
            "lifeinsurance" | "lifeinsurancepremium" => DeductionCategory::LifeInsurance,
            "nsc" | "nationalsavingscertificate" => DeductionCategory::Nsc,
            "healthinsurance" | "healthinsurancepremium" | "mediclaim" => {
                DeductionCategory::HealthInsurance
            }
            "nps" | "nationalpensionsystem" | "nationalpensionscheme" => DeductionCategory::Nps,
            "homeloaninterest" | "housingloaninterest" => DeductionCategory::HomeLoanInterest,
            _ => DeductionCategory::Unrecognized(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DeductionCategory::Epf => "EPF",
            DeductionCategory::Ppf => "PPF",
            DeductionCategory::Elss => "ELSS",
            DeductionCategory::LifeInsurance => "Life Insurance",
            DeductionCategory::Nsc => "NSC",
            DeductionCategory::HealthInsurance => "Health Insurance",
            DeductionCategory::Nps => "NPS",
            DeductionCategory::HomeLoanInterest => "Home Loan Interest",
            DeductionCategory::Unrecognized(label) => label,
        }
    }

    /// Statutory section the category counts against, if recognised.
    pub fn section(&self) -> Option<DeductionSection> {
        match self {
            DeductionCategory::Epf
            | DeductionCategory::Ppf
            | DeductionCategory::Elss
            | DeductionCategory::LifeInsurance
            | DeductionCategory::Nsc => Some(DeductionSection::Section80C),
            DeductionCategory::HealthInsurance => Some(DeductionSection::Section80D),
            DeductionCategory::Nps => Some(DeductionSection::Section80Ccd1B),
            DeductionCategory::HomeLoanInterest => Some(DeductionSection::Section24B),
            DeductionCategory::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, DeductionCategory::Unrecognized(_))
    }
}

impl From<String> for DeductionCategory {
    fn from(label: String) -> Self {
        DeductionCategory::parse(&label)
    }
}

impl From<&str> for DeductionCategory {
    fn from(label: &str) -> Self {
        DeductionCategory::parse(label)
    }
}

impl From<DeductionCategory> for String {
    fn from(category: DeductionCategory) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for DeductionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Statutory bucket sharing one cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionSection {
    /// EPF, PPF, ELSS, life insurance, NSC
    Section80C,
    /// Health insurance premiums
    Section80D,
    /// Additional NPS contribution
    Section80Ccd1B,
    /// Interest on a self-occupied home loan
    Section24B,
}

impl DeductionSection {
    pub fn label(&self) -> &'static str {
        match self {
            DeductionSection::Section80C => "80C",
            DeductionSection::Section80D => "80D",
            DeductionSection::Section80Ccd1B => "80CCD(1B)",
            DeductionSection::Section24B => "24(b)",
        }
    }

    pub fn contains(&self, category: &DeductionCategory) -> bool {
        category.section() == Some(*self)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub category: DeductionCategory,
    pub amount: Money,
    /// Claimant's assertion of regulatory eligibility. Ineligible entries are
    /// excluded from every calculation.
    pub eligible: bool,
}

impl Deduction {
    pub fn new(category: impl Into<DeductionCategory>, amount: Money, eligible: bool) -> Self {
        Deduction {
            category: category.into(),
            amount,
            eligible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every recognised category.
    Any,
    Category(DeductionCategory),
    Section(DeductionSection),
}

impl CategoryFilter {
    pub fn matches(&self, category: &DeductionCategory) -> bool {
        if !category.is_recognized() {
            return false;
        }
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::Category(wanted) => wanted == category,
            CategoryFilter::Section(section) => section.contains(category),
        }
    }
}

/// Cap-clamped view of one filter's eligible claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUtilization {
    /// Raw eligible sum as reported.
    pub claimed: Money,
    pub cap: Money,
    /// `min(claimed, cap)`
    pub utilization: Money,
    /// `max(0, cap - utilization)`
    pub headroom: Money,
}

impl CategoryUtilization {
    pub fn is_over_cap(&self) -> bool {
        self.claimed > self.cap
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum of eligible amounts matching `filter`.
///
/// Fails with `InvalidInput` when the total does not fit in a `Decimal`.
pub fn aggregate(
    deductions: &[Deduction],
    filter: &CategoryFilter,
) -> TaxOptimizerResult<Money> {
    deductions
        .iter()
        .filter(|d| d.eligible && filter.matches(&d.category))
        .try_fold(Decimal::ZERO, |total, d| {
            total
                .checked_add(d.amount)
                .ok_or_else(|| TaxOptimizerError::InvalidInput {
                    field: "deductions".into(),
                    reason: "Total of eligible deduction amounts overflows".into(),
                })
        })
}

/// Eligible claims under `filter` clamped against `cap`.
pub fn utilization(
    deductions: &[Deduction],
    filter: &CategoryFilter,
    cap: Money,
) -> TaxOptimizerResult<CategoryUtilization> {
    let claimed = aggregate(deductions, filter)?;
    let utilization = claimed.min(cap);
    Ok(CategoryUtilization {
        claimed,
        cap,
        utilization,
        headroom: (cap - utilization).max(Decimal::ZERO),
    })
}

/// Labels of entries that no filter will ever match, in input order.
pub fn unrecognized_labels(deductions: &[Deduction]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for d in deductions {
        if let DeductionCategory::Unrecognized(label) = &d.category {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    }
    labels
}

pub fn validate_deductions(deductions: &[Deduction]) -> TaxOptimizerResult<()> {
    for (i, d) in deductions.iter().enumerate() {
        if d.amount < Decimal::ZERO {
            return Err(TaxOptimizerError::InvalidInput {
                field: format!("deductions[{i}].amount"),
                reason: "Deduction amount cannot be negative".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_display_labels() {
        assert_eq!(DeductionCategory::parse("EPF"), DeductionCategory::Epf);
        assert_eq!(
            DeductionCategory::parse("Life Insurance"),
            DeductionCategory::LifeInsurance
        );
        assert_eq!(
            DeductionCategory::parse("health_insurance"),
            DeductionCategory::HealthInsurance
        );
        assert_eq!(
            DeductionCategory::parse("Home Loan Interest"),
            DeductionCategory::HomeLoanInterest
        );
        assert_eq!(
            DeductionCategory::parse("Donations"),
            DeductionCategory::Unrecognized("Donations".into())
        );
    }

    #[test]
    fn test_category_deserializes_from_string() {
        let d: Deduction =
            serde_json::from_str(r#"{"category": "ELSS", "amount": 40000, "eligible": true}"#)
                .unwrap();
        assert_eq!(d.category, DeductionCategory::Elss);
        assert_eq!(d.amount, dec!(40000));

        let unknown: Deduction =
            serde_json::from_str(r#"{"category": "80G", "amount": "100", "eligible": true}"#)
                .unwrap();
        assert_eq!(unknown.category, DeductionCategory::Unrecognized("80G".into()));
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_value(DeductionCategory::HomeLoanInterest).unwrap();
        assert_eq!(json, serde_json::json!("Home Loan Interest"));
    }

    #[test]
    fn test_sections() {
        for c in [
            DeductionCategory::Epf,
            DeductionCategory::Ppf,
            DeductionCategory::Elss,
            DeductionCategory::LifeInsurance,
            DeductionCategory::Nsc,
        ] {
            assert_eq!(c.section(), Some(DeductionSection::Section80C));
        }
        assert_eq!(
            DeductionCategory::Nps.section(),
            Some(DeductionSection::Section80Ccd1B)
        );
        assert_eq!(DeductionCategory::Unrecognized("x".into()).section(), None);
    }

    #[test]
    fn test_aggregate_excludes_ineligible() {
        let deductions = vec![
            Deduction::new(DeductionCategory::Ppf, dec!(60_000), true),
            Deduction::new(DeductionCategory::Ppf, dec!(500_000), false),
        ];
        assert_eq!(
            aggregate(&deductions, &CategoryFilter::Category(DeductionCategory::Ppf)).unwrap(),
            dec!(60_000)
        );
        assert_eq!(aggregate(&deductions, &CategoryFilter::Any).unwrap(), dec!(60_000));
    }

    #[test]
    fn test_aggregate_by_section() {
        let deductions = vec![
            Deduction::new(DeductionCategory::Epf, dec!(50_000), true),
            Deduction::new(DeductionCategory::Elss, dec!(30_000), true),
            Deduction::new(DeductionCategory::Nps, dec!(20_000), true),
        ];
        assert_eq!(
            aggregate(
                &deductions,
                &CategoryFilter::Section(DeductionSection::Section80C)
            )
            .unwrap(),
            dec!(80_000)
        );
    }

    #[test]
    fn test_unrecognized_never_matches() {
        let deductions = vec![
            Deduction::new("Donations", dec!(10_000), true),
            Deduction::new(DeductionCategory::Nsc, dec!(5_000), true),
        ];
        assert_eq!(aggregate(&deductions, &CategoryFilter::Any).unwrap(), dec!(5_000));
        assert_eq!(
            aggregate(
                &deductions,
                &CategoryFilter::Category(DeductionCategory::Unrecognized("Donations".into()))
            )
            .unwrap(),
            Decimal::ZERO
        );
        assert_eq!(unrecognized_labels(&deductions), vec!["Donations".to_string()]);
    }

    #[test]
    fn test_utilization_clamps_at_cap() {
        let deductions = vec![Deduction::new(DeductionCategory::Ppf, dec!(200_000), true)];
        let u = utilization(
            &deductions,
            &CategoryFilter::Section(DeductionSection::Section80C),
            dec!(150_000),
        )
        .unwrap();
        assert_eq!(u.claimed, dec!(200_000));
        assert_eq!(u.utilization, dec!(150_000));
        assert_eq!(u.headroom, Decimal::ZERO);
        assert!(u.is_over_cap());
    }

    #[test]
    fn test_utilization_with_no_claims() {
        let u = utilization(&[], &CategoryFilter::Any, dec!(25_000)).unwrap();
        assert_eq!(u.utilization, Decimal::ZERO);
        assert_eq!(u.headroom, dec!(25_000));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let deductions = vec![
            Deduction::new(DeductionCategory::Ppf, dec!(1), true),
            Deduction::new(DeductionCategory::Ppf, dec!(-1), false),
        ];
        match validate_deductions(&deductions) {
            Err(TaxOptimizerError::InvalidInput { field, .. }) => {
                assert_eq!(field, "deductions[1].amount");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_overflow_is_an_error() {
        let huge = dec!(50_000_000_000_000_000_000_000_000_000);
        let deductions = vec![
            Deduction::new(DeductionCategory::Epf, huge, true),
            Deduction::new(DeductionCategory::Ppf, huge, true),
        ];
        assert!(validate_deductions(&deductions).is_ok());
        match aggregate(&deductions, &CategoryFilter::Any) {
            Err(TaxOptimizerError::InvalidInput { field, .. }) => assert_eq!(field, "deductions"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert!(utilization(
            &deductions,
            &CategoryFilter::Section(DeductionSection::Section80C),
            dec!(150_000)
        )
        .is_err());
        // one side alone still fits
        assert_eq!(
            aggregate(&deductions, &CategoryFilter::Category(DeductionCategory::Epf)).unwrap(),
            huge
        );
    }
}
