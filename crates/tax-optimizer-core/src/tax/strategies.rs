use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tax::brackets::{marginal_rate_for, validate_income};
use crate::tax::config::{DeductionLimits, TaxConfig};
use crate::tax::deductions::{
    utilization, validate_deductions, CategoryFilter, Deduction, DeductionCategory,
    DeductionSection,
};
use crate::tax::profile::TaxProfile;
use crate::types::{Money, Rate};
use crate::TaxOptimizerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ordering is significant: `High` sorts before `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

/// Gating rule that admitted a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum EligibilityCondition {
    IncomeAbove { floor: Money },
    BelowSeniorAge { senior_age: u32 },
    SeniorCitizen { senior_age: u32 },
    ExistingClaim { category: DeductionCategory },
    IncomeShareLimit { share: Rate, cap: Money },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub section: DeductionSection,
    pub category_cap: Money,
    /// Allowance claimable on top of `category_cap`, such as parents' health
    /// insurance under 80D. Not included in headroom or savings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_limit: Option<Money>,
    pub current_utilization: Money,
    pub remaining_headroom: Money,
    pub recommended_contribution: Money,
    pub marginal_rate: Rate,
    pub potential_tax_savings: Money,
    pub priority: Priority,
    pub eligibility_conditions: Vec<EligibilityCondition>,
    pub implementation_steps: Vec<String>,
    pub deadline: NaiveDate,
}

/// Read-only view handed to every provider.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub income: Money,
    pub deductions: &'a [Deduction],
    pub profile: &'a TaxProfile,
}

/// A provider's decision to offer a strategy, with the cap that applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub cap: Money,
    pub conditions: Vec<EligibilityCondition>,
}

/// One tax-saving opportunity, typically one deduction section.
///
/// Providers decide eligibility and the cap; headroom, savings and ordering
/// are computed uniformly by [`generate_strategies`].
pub trait StrategyProvider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn section(&self) -> DeductionSection;

    /// Claims that count as existing utilization.
    fn filter(&self) -> CategoryFilter {
        CategoryFilter::Section(self.section())
    }

    fn priority(&self) -> Priority;

    /// `None` when the taxpayer does not qualify.
    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission>;

    /// Separate allowance reported alongside the cap.
    fn additional_limit(&self, _ctx: &StrategyContext<'_>) -> Option<Money> {
        None
    }

    fn implementation_steps(&self, headroom: Money) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Standard providers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Section80cProvider {
    pub cap: Money,
    pub income_floor: Money,
}

impl StrategyProvider for Section80cProvider {
    fn name(&self) -> &str {
        "Section 80C Tax Saving Investments"
    }

    fn section(&self) -> DeductionSection {
        DeductionSection::Section80C
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission> {
        (ctx.income > self.income_floor).then(|| Admission {
            cap: self.cap,
            conditions: vec![EligibilityCondition::IncomeAbove {
                floor: self.income_floor,
            }],
        })
    }

    fn implementation_steps(&self, headroom: Money) -> Vec<String> {
        vec![
            format!("Invest remaining ₹{} in 80C instruments", format_amount(headroom)),
            "Consider PPF for 15-year lock-in with tax-free returns".into(),
            "ELSS mutual funds for 3-year lock-in with market returns".into(),
            "Increase EPF voluntary contribution".into(),
            "Consider NSC or tax-saving FDs".into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct HealthInsuranceProvider {
    pub cap: Money,
    pub senior_cap: Money,
    pub parents_cap: Money,
    pub senior_parents_cap: Money,
    pub senior_age: u32,
}

impl StrategyProvider for HealthInsuranceProvider {
    fn name(&self) -> &str {
        "Section 80D Health Insurance Optimization"
    }

    fn section(&self) -> DeductionSection {
        DeductionSection::Section80D
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission> {
        let senior_age = self.senior_age;
        let admission = if ctx.profile.age >= senior_age {
            Admission {
                cap: self.senior_cap,
                conditions: vec![EligibilityCondition::SeniorCitizen { senior_age }],
            }
        } else {
            Admission {
                cap: self.cap,
                conditions: vec![EligibilityCondition::BelowSeniorAge { senior_age }],
            }
        };
        Some(admission)
    }

    fn additional_limit(&self, ctx: &StrategyContext<'_>) -> Option<Money> {
        if ctx.profile.age >= self.senior_age {
            Some(self.senior_parents_cap)
        } else {
            Some(self.parents_cap)
        }
    }

    fn implementation_steps(&self, headroom: Money) -> Vec<String> {
        vec![
            format!("Purchase health insurance worth ₹{}", format_amount(headroom)),
            "Consider family floater vs individual policies".into(),
            "Add parents' premium for additional deduction".into(),
            "Include preventive health check-up (₹5,000 additional)".into(),
            "Choose policies with good claim settlement ratio".into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct NpsProvider {
    pub cap: Money,
    pub income_floor: Money,
}

impl StrategyProvider for NpsProvider {
    fn name(&self) -> &str {
        "NPS Additional Deduction (80CCD-1B)"
    }

    fn section(&self) -> DeductionSection {
        DeductionSection::Section80Ccd1B
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission> {
        (ctx.income > self.income_floor).then(|| Admission {
            cap: self.cap,
            conditions: vec![EligibilityCondition::IncomeAbove {
                floor: self.income_floor,
            }],
        })
    }

    fn implementation_steps(&self, headroom: Money) -> Vec<String> {
        vec![
            format!("Contribute ₹{} to NPS Tier-I account", format_amount(headroom)),
            "This is over and above Section 80C limit".into(),
            "Choose appropriate asset allocation based on age".into(),
            "Consider auto-choice lifecycle fund".into(),
            "Remember 60% withdrawal is tax-free at maturity".into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct HomeLoanInterestProvider {
    pub cap: Money,
}

impl StrategyProvider for HomeLoanInterestProvider {
    fn name(&self) -> &str {
        "Home Loan Interest Optimization"
    }

    fn section(&self) -> DeductionSection {
        DeductionSection::Section24B
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission> {
        let has_claim = ctx
            .deductions
            .iter()
            .any(|d| d.eligible && d.category == DeductionCategory::HomeLoanInterest);
        has_claim.then(|| Admission {
            cap: self.cap,
            conditions: vec![EligibilityCondition::ExistingClaim {
                category: DeductionCategory::HomeLoanInterest,
            }],
        })
    }

    fn implementation_steps(&self, _headroom: Money) -> Vec<String> {
        vec![
            "Ensure all interest payments are properly documented".into(),
            "Consider timing of prepayments for tax efficiency".into(),
            "Keep separate account for home loan transactions".into(),
            "Claim principal repayment under Section 80C".into(),
            "Consider let-out property for higher deduction limits".into(),
        ]
    }
}

/// ELSS sized at the lesser of the 80C cap and a share of income. Only ELSS
/// holdings count against it, so it runs alongside the 80C strategy.
#[derive(Debug, Clone)]
pub struct ElssProvider {
    pub cap: Money,
    pub income_share: Rate,
    pub income_floor: Money,
}

impl StrategyProvider for ElssProvider {
    fn name(&self) -> &str {
        "ELSS Mutual Fund Investment"
    }

    fn section(&self) -> DeductionSection {
        DeductionSection::Section80C
    }

    fn filter(&self) -> CategoryFilter {
        CategoryFilter::Category(DeductionCategory::Elss)
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn admit(&self, ctx: &StrategyContext<'_>) -> Option<Admission> {
        if ctx.income <= self.income_floor {
            return None;
        }
        Some(Admission {
            cap: self.cap.min(ctx.income * self.income_share),
            conditions: vec![
                EligibilityCondition::IncomeAbove {
                    floor: self.income_floor,
                },
                EligibilityCondition::IncomeShareLimit {
                    share: self.income_share,
                    cap: self.cap,
                },
            ],
        })
    }

    fn implementation_steps(&self, headroom: Money) -> Vec<String> {
        vec![
            format!("Invest ₹{} in ELSS mutual funds", format_amount(headroom)),
            "Choose funds with good long-term track record".into(),
            "Consider SIP for rupee cost averaging".into(),
            "Diversify across 2-3 good ELSS funds".into(),
            "Review performance annually".into(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered set of providers evaluated for every request.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    providers: Vec<Box<dyn StrategyProvider>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        StrategyRegistry::default()
    }

    /// 80C, 80D, 80CCD(1B), 24(b) and ELSS providers sized from `limits`.
    pub fn standard(limits: &DeductionLimits) -> Self {
        StrategyRegistry::new()
            .with(Section80cProvider {
                cap: limits.section_80c_cap,
                income_floor: limits.section_80c_income_floor,
            })
            .with(HealthInsuranceProvider {
                cap: limits.health_insurance_cap,
                senior_cap: limits.senior_health_insurance_cap,
                parents_cap: limits.parents_health_insurance_cap,
                senior_parents_cap: limits.senior_parents_health_insurance_cap,
                senior_age: limits.senior_age,
            })
            .with(NpsProvider {
                cap: limits.nps_cap,
                income_floor: limits.nps_income_floor,
            })
            .with(HomeLoanInterestProvider {
                cap: limits.home_loan_interest_cap,
            })
            .with(ElssProvider {
                cap: limits.elss_cap,
                income_share: limits.elss_income_share,
                income_floor: limits.elss_income_floor,
            })
    }

    pub fn register<P: StrategyProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Box::new(provider));
    }

    pub fn with<P: StrategyProvider + 'static>(mut self, provider: P) -> Self {
        self.register(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn StrategyProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Evaluate every registered provider against one taxpayer.
///
/// The marginal rate is resolved once at `income` and shared by all
/// providers; strategies never consume each other's headroom. Output is
/// ordered `High` first, then by savings descending, then by name, and cut
/// to `config.max_strategies`.
pub fn generate_strategies(
    config: &TaxConfig,
    registry: &StrategyRegistry,
    income: Money,
    deductions: &[Deduction],
    profile: &TaxProfile,
) -> TaxOptimizerResult<Vec<Strategy>> {
    validate_income(income)?;
    validate_deductions(deductions)?;

    let marginal_rate = marginal_rate_for(&config.schedule, income)?;
    let deadline = config.tax_year.investment_deadline()?;
    let surcharge_multiplier = Decimal::ONE + config.schedule.surcharge_rate;
    let ctx = StrategyContext {
        income,
        deductions,
        profile,
    };

    let mut strategies: Vec<Strategy> = Vec::with_capacity(registry.len());
    for provider in registry.providers() {
        let Some(admission) = provider.admit(&ctx) else {
            continue;
        };
        let usage = utilization(deductions, &provider.filter(), admission.cap)?;
        if usage.headroom <= Decimal::ZERO {
            continue;
        }

        let potential_tax_savings = (usage.headroom * marginal_rate * surcharge_multiplier)
            .round_dp_with_strategy(
                config.savings_rounding_dp,
                RoundingStrategy::MidpointNearestEven,
            );

        strategies.push(Strategy {
            name: provider.name().to_string(),
            section: provider.section(),
            category_cap: admission.cap,
            additional_limit: provider.additional_limit(&ctx),
            current_utilization: usage.utilization,
            remaining_headroom: usage.headroom,
            recommended_contribution: usage.headroom,
            marginal_rate,
            potential_tax_savings,
            priority: provider.priority(),
            eligibility_conditions: admission.conditions,
            implementation_steps: provider.implementation_steps(usage.headroom),
            deadline,
        });
    }

    strategies.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.potential_tax_savings.cmp(&a.potential_tax_savings))
            .then_with(|| a.name.cmp(&b.name))
    });
    strategies.truncate(config.max_strategies);

    tracing::debug!(
        %income,
        %marginal_rate,
        providers = registry.len(),
        emitted = strategies.len(),
        "generated tax-saving strategies"
    );

    Ok(strategies)
}

/// Whole-unit amount with thousands separators, e.g. `150,000`.
fn format_amount(amount: Money) -> String {
    let rounded = amount.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < Decimal::ZERO {
        format!("-{grouped}")
    } else {
        grouped
    }
}
