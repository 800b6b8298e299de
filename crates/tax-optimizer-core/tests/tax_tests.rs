use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_optimizer_core::tax::{
    aggregate, compute_tax, marginal_rate_for, utilization, CategoryFilter, Deduction,
    DeductionCategory, DeductionSection, TaxBracket, TaxEngine, TaxProfile, TaxSchedule,
};
use tax_optimizer_core::TaxOptimizerError;

// ===========================================================================
// Bracket Tax Calculator
// ===========================================================================

/// Bracket table from the worked examples: 0% / 5% / 10% / 15% with 4% cess.
fn example_schedule() -> TaxSchedule {
    TaxSchedule {
        brackets: vec![
            TaxBracket::bounded(dec!(400_000), dec!(0.0)),
            TaxBracket::bounded(dec!(800_000), dec!(0.05)),
            TaxBracket::bounded(dec!(1_200_000), dec!(0.10)),
            TaxBracket::unbounded(dec!(0.15)),
        ],
        surcharge_rate: dec!(0.04),
    }
}

fn income_grid() -> Vec<Decimal> {
    let mut grid = vec![dec!(0), dec!(0.01), dec!(1), dec!(399_999.99)];
    let mut income = dec!(0);
    while income <= dec!(3_500_000) {
        grid.push(income);
        income += dec!(37_500);
    }
    grid.push(dec!(10_000_000));
    grid.push(dec!(1_000_000_000));
    grid.sort();
    grid
}

#[test]
fn test_example_900k() {
    let r = compute_tax(&example_schedule(), dec!(900_000)).unwrap();
    assert_eq!(r.base_tax, dec!(30_000));
    assert_eq!(r.surcharge, dec!(1_200));
    assert_eq!(r.total_tax, dec!(31_200));
    // 31,200 / 900,000 ≈ 3.467%
    assert_eq!((r.effective_rate * dec!(100)).round_dp(3), dec!(3.467));
}

#[test]
fn test_example_zero_income() {
    let r = compute_tax(&example_schedule(), Decimal::ZERO).unwrap();
    assert_eq!(r.total_tax, Decimal::ZERO);
    assert_eq!(r.effective_rate, Decimal::ZERO);
}

#[test]
fn test_negative_income_is_invalid_input() {
    let err = compute_tax(&example_schedule(), dec!(-100)).unwrap_err();
    match err {
        TaxOptimizerError::InvalidInput { field, .. } => assert_eq!(field, "income"),
        other => panic!("expected InvalidInput, got {other}"),
    }
}

#[test]
fn test_total_tax_non_negative_and_effective_rate_bounded() {
    let schedule = TaxSchedule::default();
    for income in income_grid() {
        let r = compute_tax(&schedule, income).unwrap();
        assert!(r.total_tax >= Decimal::ZERO, "negative tax at {income}");
        assert!(
            r.effective_rate >= Decimal::ZERO && r.effective_rate <= Decimal::ONE,
            "effective rate {} out of range at {income}",
            r.effective_rate
        );
    }
}

#[test]
fn test_monotonic_in_income() {
    let schedule = TaxSchedule::default();
    let grid = income_grid();
    for pair in grid.windows(2) {
        let lower = compute_tax(&schedule, pair[0]).unwrap();
        let higher = compute_tax(&schedule, pair[1]).unwrap();
        assert!(
            lower.total_tax <= higher.total_tax,
            "tax fell between {} and {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_idempotent() {
    let schedule = TaxSchedule::default();
    for income in income_grid() {
        assert_eq!(
            compute_tax(&schedule, income).unwrap(),
            compute_tax(&schedule, income).unwrap()
        );
    }
}

#[test]
fn test_boundary_convention_on_every_bound() {
    let schedule = TaxSchedule::default();
    let eps = dec!(0.01);
    for (i, bracket) in schedule.brackets.iter().enumerate() {
        let Some(bound) = bracket.upper_bound else {
            continue;
        };
        let next_rate = schedule.brackets[i + 1].rate;

        let below = compute_tax(&schedule, bound - eps).unwrap();
        let at = compute_tax(&schedule, bound).unwrap();
        let above = compute_tax(&schedule, bound + eps).unwrap();

        // B - ε and B both end inside the bracket closed by B
        assert_eq!(below.slices.len(), i + 1);
        assert_eq!(at.slices.len(), i + 1);
        assert_eq!(at.base_tax - below.base_tax, eps * bracket.rate);

        // B + ε taxes the extra ε at the next bracket's rate
        assert_eq!(above.slices.len(), i + 2);
        assert_eq!(above.base_tax - at.base_tax, eps * next_rate);

        assert_eq!(marginal_rate_for(&schedule, bound).unwrap(), bracket.rate);
        assert_eq!(marginal_rate_for(&schedule, bound + eps).unwrap(), next_rate);
    }
}

#[test]
fn test_slices_sum_to_income_and_base_tax() {
    let schedule = TaxSchedule::default();
    for income in income_grid() {
        let r = compute_tax(&schedule, income).unwrap();
        let taxed: Decimal = r.slices.iter().map(|s| s.taxable_amount).sum();
        let tax: Decimal = r.slices.iter().map(|s| s.tax).sum();
        assert_eq!(taxed, income);
        assert_eq!(tax, r.base_tax);
    }
}

// ===========================================================================
// Deduction Aggregator
// ===========================================================================

#[test]
fn test_over_cap_claim_clamped() {
    let deductions = vec![Deduction::new(DeductionCategory::Elss, dec!(200_000), true)];
    let u = utilization(
        &deductions,
        &CategoryFilter::Section(DeductionSection::Section80C),
        dec!(150_000),
    )
    .unwrap();
    assert_eq!(u.utilization, dec!(150_000));
    assert_eq!(u.headroom, Decimal::ZERO);

    let engine = TaxEngine::new(Default::default()).unwrap();
    let strategies = engine
        .generate_strategies(dec!(900_000), &deductions, &TaxProfile::default())
        .unwrap();
    assert!(strategies
        .iter()
        .all(|s| s.section != DeductionSection::Section80C || s.name.starts_with("ELSS")));
    assert!(strategies.iter().all(|s| s.remaining_headroom > Decimal::ZERO));
}

#[test]
fn test_ineligible_entry_ignored_entirely() {
    let eligible_only = vec![Deduction::new(DeductionCategory::Nsc, dec!(40_000), true)];
    let mut with_ineligible = eligible_only.clone();
    with_ineligible.push(Deduction::new(DeductionCategory::Nsc, dec!(500_000), false));

    assert_eq!(
        aggregate(&with_ineligible, &CategoryFilter::Any).unwrap(),
        aggregate(&eligible_only, &CategoryFilter::Any).unwrap()
    );

    let engine = TaxEngine::new(Default::default()).unwrap();
    let profile = TaxProfile::default();
    let a = engine
        .assemble(dec!(1_100_000), "individual", &eligible_only, &profile)
        .unwrap();
    let b = engine
        .assemble(dec!(1_100_000), "individual", &with_ineligible, &profile)
        .unwrap();
    assert_eq!(a.total_eligible_deductions, b.total_eligible_deductions);
    assert_eq!(a.strategies, b.strategies);
}

#[test]
fn test_order_of_deductions_is_irrelevant() {
    let engine = TaxEngine::new(Default::default()).unwrap();
    let profile = TaxProfile::with_age(45);
    let mut deductions = vec![
        Deduction::new(DeductionCategory::Epf, dec!(30_000), true),
        Deduction::new(DeductionCategory::HealthInsurance, dec!(10_000), true),
        Deduction::new(DeductionCategory::Nps, dec!(5_000), true),
        Deduction::new("Donations", dec!(1_000), true),
    ];
    let forward = engine
        .assemble(dec!(1_800_000), "individual", &deductions, &profile)
        .unwrap();
    deductions.reverse();
    let reversed = engine
        .assemble(dec!(1_800_000), "individual", &deductions, &profile)
        .unwrap();
    assert_eq!(forward, reversed);
}
