use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::tax::brackets::{self, TaxResult};
#[cfg(feature = "checklist")]
use crate::tax::checklist::{self, DocumentChecklist};
use crate::tax::config::TaxConfig;
use crate::tax::deductions::{self, CategoryFilter, Deduction};
use crate::tax::profile::TaxProfile;
use crate::tax::report::{self, TaxOptimizationInput, TaxReport};
use crate::tax::strategies::{self, Strategy, StrategyRegistry};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::TaxOptimizerResult;

/// Validated configuration plus the provider registry built from it.
///
/// Construct once at start-up and share by reference; every method is a pure
/// function of its arguments and the engine's immutable state.
#[derive(Debug)]
pub struct TaxEngine {
    config: TaxConfig,
    registry: StrategyRegistry,
}

/// Single-income request used by the calculator and resolver entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxComputationInput {
    pub income: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaxConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalRateOutput {
    pub income: Money,
    pub marginal_rate: Rate,
    /// Marginal rate including the surcharge
    pub effective_marginal_rate: Rate,
}

impl TaxEngine {
    pub fn new(config: TaxConfig) -> TaxOptimizerResult<Self> {
        let registry = StrategyRegistry::standard(&config.limits);
        TaxEngine::with_registry(config, registry)
    }

    /// Engine with a caller-assembled provider set.
    pub fn with_registry(
        config: TaxConfig,
        registry: StrategyRegistry,
    ) -> TaxOptimizerResult<Self> {
        config.validate()?;
        tracing::debug!(
            tax_year = %config.tax_year.label,
            brackets = config.schedule.brackets.len(),
            providers = registry.len(),
            "tax engine ready"
        );
        Ok(TaxEngine { config, registry })
    }

    pub fn config(&self) -> &TaxConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn compute_tax(&self, income: Money) -> TaxOptimizerResult<TaxResult> {
        brackets::compute_tax(&self.config.schedule, income)
    }

    pub fn marginal_rate_for(&self, income: Money) -> TaxOptimizerResult<Rate> {
        brackets::marginal_rate_for(&self.config.schedule, income)
    }

    pub fn aggregate(
        &self,
        deductions: &[Deduction],
        filter: &CategoryFilter,
    ) -> TaxOptimizerResult<Money> {
        deductions::aggregate(deductions, filter)
    }

    pub fn generate_strategies(
        &self,
        income: Money,
        deductions: &[Deduction],
        profile: &TaxProfile,
    ) -> TaxOptimizerResult<Vec<Strategy>> {
        strategies::generate_strategies(&self.config, &self.registry, income, deductions, profile)
    }

    pub fn assemble(
        &self,
        income: Money,
        filing_status: &str,
        deductions: &[Deduction],
        profile: &TaxProfile,
    ) -> TaxOptimizerResult<TaxReport> {
        report::assemble(
            &self.config,
            &self.registry,
            income,
            filing_status,
            deductions,
            profile,
        )
    }

    // -----------------------------------------------------------------------
    // Envelope entry points
    // -----------------------------------------------------------------------

    /// Full report wrapped with methodology, assumptions and warnings.
    ///
    /// Uses this engine's configuration; `input.config` is ignored here.
    pub fn optimize(
        &self,
        input: &TaxOptimizationInput,
    ) -> TaxOptimizerResult<ComputationOutput<TaxReport>> {
        let start = Instant::now();

        let output = self.assemble(
            input.income,
            &input.filing_status,
            &input.deductions,
            &input.profile,
        )?;
        let warnings =
            report::review_deductions(&self.config, &input.deductions, &input.profile)?;

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Progressive slab tax with flat cess, before and after eligible deductions; \
             section-capped headroom priced at the current marginal rate",
            &serde_json::json!({
                "tax_year": self.config.tax_year.label,
                "surcharge_rate": self.config.schedule.surcharge_rate.to_string(),
                "num_brackets": self.config.schedule.brackets.len(),
                "num_deductions": input.deductions.len(),
                "age": input.profile.age,
                "boundary_convention": "lower_inclusive",
            }),
            warnings,
            elapsed,
            output,
        ))
    }

    pub fn calculate_tax(
        &self,
        income: Money,
    ) -> TaxOptimizerResult<ComputationOutput<TaxResult>> {
        let start = Instant::now();
        let output = self.compute_tax(income)?;
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Progressive slab tax: ascending single pass with flat surcharge on base tax",
            &serde_json::json!({
                "tax_year": self.config.tax_year.label,
                "surcharge_rate": self.config.schedule.surcharge_rate.to_string(),
                "boundary_convention": "lower_inclusive",
            }),
            Vec::new(),
            elapsed,
            output,
        ))
    }

    pub fn resolve_marginal_rate(
        &self,
        income: Money,
    ) -> TaxOptimizerResult<ComputationOutput<MarginalRateOutput>> {
        let start = Instant::now();
        let marginal_rate = self.marginal_rate_for(income)?;
        let output = MarginalRateOutput {
            income,
            marginal_rate,
            effective_marginal_rate: marginal_rate
                * (Decimal::ONE + self.config.schedule.surcharge_rate),
        };
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Marginal rate of the bracket containing income (lower-inclusive bounds)",
            &serde_json::json!({ "tax_year": self.config.tax_year.label }),
            Vec::new(),
            elapsed,
            output,
        ))
    }

    pub fn recommend_strategies(
        &self,
        input: &TaxOptimizationInput,
    ) -> TaxOptimizerResult<ComputationOutput<Vec<Strategy>>> {
        let start = Instant::now();
        let output = self.generate_strategies(input.income, &input.deductions, &input.profile)?;
        let warnings =
            report::review_deductions(&self.config, &input.deductions, &input.profile)?;
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Independent section strategies priced at the current marginal rate including surcharge",
            &serde_json::json!({
                "tax_year": self.config.tax_year.label,
                "max_strategies": self.config.max_strategies,
                "providers": self.registry.len(),
            }),
            warnings,
            elapsed,
            output,
        ))
    }

    #[cfg(feature = "checklist")]
    pub fn document_checklist(
        &self,
        profile: &TaxProfile,
    ) -> TaxOptimizerResult<ComputationOutput<DocumentChecklist>> {
        let start = Instant::now();
        let output =
            checklist::document_checklist(&self.config.tax_year, &self.config.limits, profile)?;
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Return document checklist with tax-year deadline reminders",
            &serde_json::json!({
                "tax_year": self.config.tax_year.label,
                "age": profile.age,
            }),
            Vec::new(),
            elapsed,
            output,
        ))
    }
}

/// Slab tax for one income using the input's configuration or the default.
pub fn calculate_tax(
    input: &TaxComputationInput,
) -> TaxOptimizerResult<ComputationOutput<TaxResult>> {
    TaxEngine::new(input.config.clone().unwrap_or_default())?.calculate_tax(input.income)
}

pub fn resolve_marginal_rate(
    input: &TaxComputationInput,
) -> TaxOptimizerResult<ComputationOutput<MarginalRateOutput>> {
    TaxEngine::new(input.config.clone().unwrap_or_default())?.resolve_marginal_rate(input.income)
}

pub fn recommend_strategies(
    input: &TaxOptimizationInput,
) -> TaxOptimizerResult<ComputationOutput<Vec<Strategy>>> {
    TaxEngine::new(input.config.clone().unwrap_or_default())?.recommend_strategies(input)
}

#[cfg(feature = "checklist")]
pub fn build_document_checklist(
    input: &TaxOptimizationInput,
) -> TaxOptimizerResult<ComputationOutput<DocumentChecklist>> {
    TaxEngine::new(input.config.clone().unwrap_or_default())?.document_checklist(&input.profile)
}
