use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TaxOptimizerError;
use crate::tax::deductions::DeductionSection;
use crate::types::{Money, Rate};
use crate::TaxOptimizerResult;

// ---------------------------------------------------------------------------
// Bracket schedule
// ---------------------------------------------------------------------------

/// One slice of a progressive schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound. `None` marks the unbounded top bracket.
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

impl TaxBracket {
    pub fn bounded(upper_bound: Money, rate: Rate) -> Self {
        TaxBracket {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Rate) -> Self {
        TaxBracket {
            upper_bound: None,
            rate,
        }
    }

    /// Lower-inclusive containment: a value exactly on `upper_bound` belongs here.
    pub fn contains(&self, income: Money) -> bool {
        self.upper_bound.map_or(true, |upper| income <= upper)
    }
}

/// Ordered bracket table plus a flat surcharge on the computed base tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub brackets: Vec<TaxBracket>,
    /// Flat percentage of base tax (health and education cess).
    pub surcharge_rate: Rate,
}

impl TaxSchedule {
    /// New-regime slabs for FY 2024-25 with the 4% health and education cess.
    pub fn india_fy_2024_25() -> Self {
        TaxSchedule {
            brackets: vec![
                TaxBracket::bounded(dec!(400_000), dec!(0)),
                TaxBracket::bounded(dec!(800_000), dec!(0.05)),
                TaxBracket::bounded(dec!(1_200_000), dec!(0.10)),
                TaxBracket::bounded(dec!(1_600_000), dec!(0.15)),
                TaxBracket::bounded(dec!(2_000_000), dec!(0.20)),
                TaxBracket::bounded(dec!(2_400_000), dec!(0.25)),
                TaxBracket::unbounded(dec!(0.30)),
            ],
            surcharge_rate: dec!(0.04),
        }
    }

    /// Highest marginal rate anywhere in the table.
    pub fn max_rate(&self) -> Rate {
        self.brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Check ordering, coverage and rate bounds.
    ///
    /// A valid schedule is non-empty, strictly increasing in `upper_bound`,
    /// and ends in exactly one unbounded bracket, so every non-negative income
    /// falls into exactly one slice.
    pub fn validate(&self) -> TaxOptimizerResult<()> {
        if self.brackets.is_empty() {
            return Err(config_error(
                "schedule.brackets",
                "At least one bracket is required",
            ));
        }
        if self.surcharge_rate < Decimal::ZERO || self.surcharge_rate > Decimal::ONE {
            return Err(config_error(
                "schedule.surcharge_rate",
                "Surcharge rate must be between 0 and 1",
            ));
        }

        let last = self.brackets.len() - 1;
        let mut previous_bound = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(config_error(
                    &format!("schedule.brackets[{i}].rate"),
                    "Marginal rate must be between 0 and 1",
                ));
            }
            match bracket.upper_bound {
                Some(_) if i == last => {
                    return Err(config_error(
                        &format!("schedule.brackets[{i}].upper_bound"),
                        "The final bracket must be unbounded",
                    ));
                }
                None if i != last => {
                    return Err(config_error(
                        &format!("schedule.brackets[{i}].upper_bound"),
                        "Only the final bracket may be unbounded",
                    ));
                }
                Some(upper) if upper <= previous_bound => {
                    return Err(config_error(
                        &format!("schedule.brackets[{i}].upper_bound"),
                        "Bracket bounds must be strictly increasing and positive",
                    ));
                }
                Some(upper) => previous_bound = upper,
                None => {}
            }
        }

        if self.max_rate() * (Decimal::ONE + self.surcharge_rate) > Decimal::ONE {
            return Err(config_error(
                "schedule",
                "Highest rate including surcharge must not exceed 100%",
            ));
        }
        Ok(())
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        TaxSchedule::india_fy_2024_25()
    }
}

// ---------------------------------------------------------------------------
// Statutory deduction limits and strategy thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionLimits {
    pub section_80c_cap: Money,
    pub section_80c_income_floor: Money,
    pub health_insurance_cap: Money,
    pub senior_health_insurance_cap: Money,
    /// Separate 80D allowance for parents' premiums, on top of the self/family cap.
    pub parents_health_insurance_cap: Money,
    pub senior_parents_health_insurance_cap: Money,
    pub senior_age: u32,
    pub nps_cap: Money,
    pub nps_income_floor: Money,
    pub home_loan_interest_cap: Money,
    pub elss_cap: Money,
    /// ELSS recommendation is the lesser of `elss_cap` and this share of income.
    pub elss_income_share: Rate,
    pub elss_income_floor: Money,
}

impl Default for DeductionLimits {
    fn default() -> Self {
        DeductionLimits {
            section_80c_cap: dec!(150_000),
            section_80c_income_floor: dec!(300_000),
            health_insurance_cap: dec!(25_000),
            senior_health_insurance_cap: dec!(50_000),
            parents_health_insurance_cap: dec!(25_000),
            senior_parents_health_insurance_cap: dec!(50_000),
            senior_age: 60,
            nps_cap: dec!(50_000),
            nps_income_floor: dec!(500_000),
            home_loan_interest_cap: dec!(200_000),
            elss_cap: dec!(150_000),
            elss_income_share: dec!(0.10),
            elss_income_floor: dec!(600_000),
        }
    }
}

impl DeductionLimits {
    pub fn is_senior(&self, age: u32) -> bool {
        age >= self.senior_age
    }

    /// Statutory cap for a whole section at the given age.
    pub fn section_cap(&self, section: DeductionSection, age: u32) -> Money {
        match section {
            DeductionSection::Section80C => self.section_80c_cap,
            DeductionSection::Section80D if self.is_senior(age) => {
                self.senior_health_insurance_cap
            }
            DeductionSection::Section80D => self.health_insurance_cap,
            DeductionSection::Section80Ccd1B => self.nps_cap,
            DeductionSection::Section24B => self.home_loan_interest_cap,
        }
    }

    pub fn validate(&self) -> TaxOptimizerResult<()> {
        let amounts = [
            ("limits.section_80c_cap", self.section_80c_cap),
            ("limits.section_80c_income_floor", self.section_80c_income_floor),
            ("limits.health_insurance_cap", self.health_insurance_cap),
            (
                "limits.senior_health_insurance_cap",
                self.senior_health_insurance_cap,
            ),
            (
                "limits.parents_health_insurance_cap",
                self.parents_health_insurance_cap,
            ),
            (
                "limits.senior_parents_health_insurance_cap",
                self.senior_parents_health_insurance_cap,
            ),
            ("limits.nps_cap", self.nps_cap),
            ("limits.nps_income_floor", self.nps_income_floor),
            ("limits.home_loan_interest_cap", self.home_loan_interest_cap),
            ("limits.elss_cap", self.elss_cap),
            ("limits.elss_income_floor", self.elss_income_floor),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(config_error(field, "Limit cannot be negative"));
            }
        }
        if self.elss_income_share < Decimal::ZERO || self.elss_income_share > Decimal::ONE {
            return Err(config_error(
                "limits.elss_income_share",
                "ELSS income share must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tax year
// ---------------------------------------------------------------------------

/// Financial year running 1 April `start_year` to 31 March `start_year + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxYear {
    pub label: String,
    pub start_year: i32,
}

impl Default for TaxYear {
    fn default() -> Self {
        TaxYear {
            label: "FY 2024-25".to_string(),
            start_year: 2024,
        }
    }
}

impl TaxYear {
    pub fn closing_year(&self) -> i32 {
        self.start_year + 1
    }

    /// Last day to make deductible investments.
    pub fn investment_deadline(&self) -> TaxOptimizerResult<NaiveDate> {
        ymd(self.closing_year(), 3, 31)
    }

    pub fn filing_due_date(&self) -> TaxOptimizerResult<NaiveDate> {
        ymd(self.closing_year(), 7, 31)
    }

    /// Advance-tax instalments: 15 Jun, 15 Sep, 15 Dec, 15 Mar.
    pub fn advance_tax_dates(&self) -> TaxOptimizerResult<Vec<NaiveDate>> {
        Ok(vec![
            ymd(self.start_year, 6, 15)?,
            ymd(self.start_year, 9, 15)?,
            ymd(self.start_year, 12, 15)?,
            ymd(self.closing_year(), 3, 15)?,
        ])
    }
}

fn ymd(year: i32, month: u32, day: u32) -> TaxOptimizerResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        TaxOptimizerError::DateError(format!("{year}-{month:02}-{day:02} is not a valid date"))
    })
}

// ---------------------------------------------------------------------------
// Full configuration
// ---------------------------------------------------------------------------

/// Jurisdiction and tax-year configuration. Defaults to India FY 2024-25.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    pub tax_year: TaxYear,
    pub schedule: TaxSchedule,
    pub limits: DeductionLimits,
    /// Strategies kept after prioritisation.
    pub max_strategies: usize,
    /// Decimal places kept on projected savings.
    pub savings_rounding_dp: u32,
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            tax_year: TaxYear::default(),
            schedule: TaxSchedule::default(),
            limits: DeductionLimits::default(),
            max_strategies: 5,
            savings_rounding_dp: 0,
        }
    }
}

impl TaxConfig {
    pub fn validate(&self) -> TaxOptimizerResult<()> {
        self.schedule.validate()?;
        self.limits.validate()?;
        if self.max_strategies == 0 {
            return Err(config_error(
                "max_strategies",
                "At least one strategy must be allowed",
            ));
        }
        if self.savings_rounding_dp > 28 {
            return Err(config_error(
                "savings_rounding_dp",
                "Decimal places must not exceed 28",
            ));
        }
        self.tax_year.investment_deadline()?;
        Ok(())
    }
}

fn config_error(field: &str, reason: &str) -> TaxOptimizerError {
    TaxOptimizerError::InvalidConfiguration {
        field: field.into(),
        reason: reason.into(),
    }
}
