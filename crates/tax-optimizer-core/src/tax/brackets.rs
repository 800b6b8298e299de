use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxOptimizerError;
use crate::tax::config::TaxSchedule;
use crate::types::{Money, Rate};
use crate::TaxOptimizerResult;

/// Income taxed within one bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub taxable_amount: Money,
    pub rate: Rate,
    pub tax: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub income: Money,
    /// Sum of marginal-bracket contributions
    pub base_tax: Money,
    /// Flat surcharge on `base_tax`
    pub surcharge: Money,
    pub total_tax: Money,
    /// `total_tax / income`, zero when income is zero
    pub effective_rate: Rate,
    pub slices: Vec<BracketSlice>,
}

/// Progressive tax on `income` under `schedule`.
///
/// Walks the brackets in ascending order carrying the previous bound forward.
/// Each bracket taxes `min(remaining, upper - previous)`, so income exactly on
/// a boundary is taxed entirely in the lower bracket. Expects a schedule that
/// has passed [`TaxSchedule::validate`].
pub fn compute_tax(schedule: &TaxSchedule, income: Money) -> TaxOptimizerResult<TaxResult> {
    validate_income(income)?;

    let mut base_tax = Decimal::ZERO;
    let mut remaining = income;
    let mut previous_bound = Decimal::ZERO;
    let mut slices: Vec<BracketSlice> = Vec::new();

    for bracket in &schedule.brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let taxable_amount = match bracket.upper_bound {
            Some(upper) => remaining.min(upper - previous_bound),
            None => remaining,
        };
        let tax = taxable_amount * bracket.rate;
        base_tax += tax;
        remaining -= taxable_amount;

        slices.push(BracketSlice {
            lower_bound: previous_bound,
            upper_bound: bracket.upper_bound,
            taxable_amount,
            rate: bracket.rate,
            tax,
        });

        if let Some(upper) = bracket.upper_bound {
            previous_bound = upper;
        }
    }

    let surcharge = base_tax * schedule.surcharge_rate;
    let total_tax = base_tax + surcharge;
    let effective_rate = if income > Decimal::ZERO {
        total_tax / income
    } else {
        Decimal::ZERO
    };

    Ok(TaxResult {
        income,
        base_tax,
        surcharge,
        total_tax,
        effective_rate,
        slices,
    })
}

/// Rate applied to the next unit of income earned at `income`.
///
/// Uses the same lower-inclusive convention as [`compute_tax`]: a value
/// exactly on a bound resolves to the bracket that bound closes.
pub fn marginal_rate_for(schedule: &TaxSchedule, income: Money) -> TaxOptimizerResult<Rate> {
    validate_income(income)?;

    schedule
        .brackets
        .iter()
        .find(|b| b.contains(income))
        .map(|b| b.rate)
        .ok_or_else(|| TaxOptimizerError::InvalidConfiguration {
            field: "schedule.brackets".into(),
            reason: format!("No bracket covers income {income}"),
        })
}

pub(crate) fn validate_income(income: Money) -> TaxOptimizerResult<()> {
    if income < Decimal::ZERO {
        return Err(TaxOptimizerError::InvalidInput {
            field: "income".into(),
            reason: "Income cannot be negative".into(),
        });
    }
    Ok(())
}
