//! Progressive income tax, deduction caps and tax-saving strategies.
//!
//! Everything here is a pure function over immutable input. A [`TaxEngine`]
//! is built once from a validated [`TaxConfig`] and shared by reference.

pub mod brackets;
pub mod config;
pub mod deductions;
pub mod engine;
pub mod profile;
pub mod report;
pub mod strategies;

#[cfg(feature = "checklist")]
pub mod checklist;

pub use brackets::{compute_tax, marginal_rate_for, BracketSlice, TaxResult};
pub use config::{DeductionLimits, TaxBracket, TaxConfig, TaxSchedule, TaxYear};
pub use deductions::{
    aggregate, utilization, CategoryFilter, CategoryUtilization, Deduction, DeductionCategory,
    DeductionSection,
};
pub use engine::{
    calculate_tax, recommend_strategies, resolve_marginal_rate, MarginalRateOutput,
    TaxComputationInput, TaxEngine,
};
pub use profile::TaxProfile;
pub use report::{
    assemble, optimize_tax, review_deductions, OptimizationSummary, TaxOptimizationInput,
    TaxReport,
};
pub use strategies::{
    generate_strategies, Admission, EligibilityCondition, Priority, Strategy, StrategyContext,
    StrategyProvider, StrategyRegistry,
};

#[cfg(feature = "checklist")]
pub use checklist::{document_checklist, DeadlineReminder, DocumentChecklist, DocumentGroup};
#[cfg(feature = "checklist")]
pub use engine::build_document_checklist;
