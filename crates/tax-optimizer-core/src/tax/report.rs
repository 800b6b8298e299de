use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tax::brackets::{compute_tax, validate_income, TaxResult};
use crate::tax::config::TaxConfig;
use crate::tax::deductions::{
    aggregate, unrecognized_labels, utilization, validate_deductions, CategoryFilter, Deduction,
    DeductionSection,
};
use crate::tax::engine::TaxEngine;
use crate::tax::profile::TaxProfile;
use crate::tax::strategies::{generate_strategies, Priority, Strategy, StrategyRegistry};
use crate::types::{ComputationOutput, Money};
use crate::TaxOptimizerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxOptimizationInput {
    pub income: Money,
    /// Passed through untouched; not used in any calculation.
    #[serde(default)]
    pub filing_status: String,
    #[serde(default)]
    pub deductions: Vec<Deduction>,
    #[serde(default, alias = "user_context")]
    pub profile: TaxProfile,
    /// Overrides the built-in FY 2024-25 configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaxConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub gross_income: Money,
    pub total_deductions: Money,
    pub taxable_income: Money,
    /// `current_tax.total_tax - tax_after_deductions.total_tax`
    pub tax_saved_by_deductions: Money,
    pub total_potential_savings: Money,
    pub high_priority_actions: u32,
    pub investment_deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxReport {
    pub filing_status: String,
    pub current_tax: TaxResult,
    pub tax_after_deductions: TaxResult,
    pub total_eligible_deductions: Money,
    pub strategies: Vec<Strategy>,
    pub total_potential_savings: Money,
    pub summary: OptimizationSummary,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Tax before and after eligible deductions plus the strategy list.
///
/// Any failing step fails the whole report.
pub fn assemble(
    config: &TaxConfig,
    registry: &StrategyRegistry,
    income: Money,
    filing_status: &str,
    deductions: &[Deduction],
    profile: &TaxProfile,
) -> TaxOptimizerResult<TaxReport> {
    validate_income(income)?;
    validate_deductions(deductions)?;

    let total_eligible_deductions = aggregate(deductions, &CategoryFilter::Any)?;
    let taxable_income = (income - total_eligible_deductions).max(Decimal::ZERO);

    let current_tax = compute_tax(&config.schedule, income)?;
    let tax_after_deductions = compute_tax(&config.schedule, taxable_income)?;
    let strategies = generate_strategies(config, registry, income, deductions, profile)?;

    let total_potential_savings: Money = strategies.iter().map(|s| s.potential_tax_savings).sum();
    let high_priority_actions = strategies
        .iter()
        .filter(|s| s.priority == Priority::High)
        .count() as u32;

    let summary = OptimizationSummary {
        gross_income: income,
        total_deductions: total_eligible_deductions,
        taxable_income,
        tax_saved_by_deductions: current_tax.total_tax - tax_after_deductions.total_tax,
        total_potential_savings,
        high_priority_actions,
        investment_deadline: config.tax_year.investment_deadline()?,
    };

    tracing::debug!(
        %income,
        %total_eligible_deductions,
        current_tax = %current_tax.total_tax,
        strategies = strategies.len(),
        "assembled tax report"
    );

    Ok(TaxReport {
        filing_status: filing_status.to_string(),
        current_tax,
        tax_after_deductions,
        total_eligible_deductions,
        strategies,
        total_potential_savings,
        summary,
    })
}

/// Notes about input that was excluded or clamped.
pub fn review_deductions(
    config: &TaxConfig,
    deductions: &[Deduction],
    profile: &TaxProfile,
) -> TaxOptimizerResult<Vec<String>> {
    let mut warnings: Vec<String> = Vec::new();

    for label in unrecognized_labels(deductions) {
        tracing::warn!(category = %label, "unrecognized deduction category ignored");
        warnings.push(format!(
            "Deduction category '{label}' is not recognised and was excluded from all calculations."
        ));
    }

    let ineligible = deductions.iter().filter(|d| !d.eligible).count();
    if ineligible > 0 {
        warnings.push(format!(
            "{ineligible} deduction(s) marked ineligible were excluded from all calculations."
        ));
    }

    for section in [
        DeductionSection::Section80C,
        DeductionSection::Section80D,
        DeductionSection::Section80Ccd1B,
        DeductionSection::Section24B,
    ] {
        let cap = config.limits.section_cap(section, profile.age);
        let usage = utilization(deductions, &CategoryFilter::Section(section), cap)?;
        if usage.is_over_cap() {
            warnings.push(format!(
                "Eligible Section {} claims of {} exceed the {} cap; only the cap counts as utilization.",
                section.label(),
                usage.claimed,
                cap
            ));
        }
    }

    Ok(warnings)
}

/// Build an engine from the input's configuration (or the default) and run
/// the full optimization.
pub fn optimize_tax(
    input: &TaxOptimizationInput,
) -> TaxOptimizerResult<ComputationOutput<TaxReport>> {
    let engine = TaxEngine::new(input.config.clone().unwrap_or_default())?;
    engine.optimize(input)
}
