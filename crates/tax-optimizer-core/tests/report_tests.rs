use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_optimizer_core::tax::{
    build_document_checklist, optimize_tax, recommend_strategies, DeductionSection, Priority,
    TaxConfig, TaxEngine, TaxOptimizationInput,
};

fn sample_request() -> TaxOptimizationInput {
    serde_json::from_str(
        r#"{
            "income": 1500000,
            "filing_status": "individual",
            "deductions": [
                {"category": "EPF", "amount": 72000, "eligible": true},
                {"category": "Life Insurance", "amount": 18000, "eligible": true},
                {"category": "Health Insurance", "amount": 15000, "eligible": true},
                {"category": "Home Loan Interest", "amount": 160000, "eligible": true},
                {"category": "PPF", "amount": 500000, "eligible": false},
                {"category": "Gold Bonds", "amount": 25000, "eligible": true}
            ],
            "user_context": {"age": 42, "userType": "salaried"}
        }"#,
    )
    .unwrap()
}

#[test]
fn test_full_report_from_json_request() {
    let out = optimize_tax(&sample_request()).unwrap();
    let report = &out.result;

    // 72k + 18k + 15k + 160k; PPF ineligible, gold bonds unrecognised
    assert_eq!(report.total_eligible_deductions, dec!(265_000));
    assert_eq!(report.summary.taxable_income, dec!(1_235_000));

    // 1.5M: 20k + 40k + 300k * 15% = 105k base, 4,200 cess
    assert_eq!(report.current_tax.base_tax, dec!(105_000));
    assert_eq!(report.current_tax.total_tax, dec!(109_200));
    // 1.235M: 20k + 40k + 35k * 15% = 65,250 base
    assert_eq!(report.tax_after_deductions.base_tax, dec!(65_250));
    assert_eq!(report.tax_after_deductions.total_tax, dec!(67_860));
    assert_eq!(report.summary.tax_saved_by_deductions, dec!(41_340));

    let names: Vec<&str> = report.strategies.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Section 80C Tax Saving Investments",
            "Section 80D Health Insurance Optimization",
            "ELSS Mutual Fund Investment",
            "NPS Additional Deduction (80CCD-1B)",
            "Home Loan Interest Optimization",
        ]
    );

    // 80C headroom 60k at 15% with cess
    assert_eq!(report.strategies[0].remaining_headroom, dec!(60_000));
    assert_eq!(report.strategies[0].potential_tax_savings, dec!(9_360));
    // 80D headroom 10k
    assert_eq!(report.strategies[1].potential_tax_savings, dec!(1_560));
    // ELSS 150k (10% of 1.5M = 150k) with none held
    assert_eq!(report.strategies[2].potential_tax_savings, dec!(23_400));
    // NPS 50k
    assert_eq!(report.strategies[3].potential_tax_savings, dec!(7_800));
    // Home loan headroom 40k
    assert_eq!(report.strategies[4].potential_tax_savings, dec!(6_240));

    assert_eq!(report.total_potential_savings, dec!(48_360));
    assert_eq!(report.summary.high_priority_actions, 2);

    // Unrecognised category and ineligible entry both reported
    assert_eq!(out.warnings.len(), 2);
    assert!(out.warnings[0].contains("Gold Bonds"));
}

#[test]
fn test_report_serializes_expected_fields() {
    let out = optimize_tax(&sample_request()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let result = &json["result"];
    for key in [
        "current_tax",
        "tax_after_deductions",
        "strategies",
        "total_potential_savings",
        "summary",
    ] {
        assert!(result.get(key).is_some(), "missing {key}");
    }
    assert_eq!(result["strategies"][0]["priority"], "high");
    assert_eq!(result["strategies"][0]["section"], "Section80C");
    assert_eq!(result["strategies"][0]["deadline"], "2025-03-31");
    assert_eq!(
        result["strategies"][0]["eligibility_conditions"][0]["rule"],
        "income_above"
    );
}

#[test]
fn test_strategies_sorted_high_first_then_savings() {
    let out = recommend_strategies(&sample_request()).unwrap();
    let strategies = &out.result;
    for pair in strategies.windows(2) {
        assert!(pair[0].priority <= pair[1].priority);
        if pair[0].priority == pair[1].priority {
            assert!(pair[0].potential_tax_savings >= pair[1].potential_tax_savings);
        }
    }
    assert!(strategies.iter().all(|s| s.potential_tax_savings >= Decimal::ZERO));
    assert_eq!(strategies[0].priority, Priority::High);
}

#[test]
fn test_config_override_in_request() {
    let mut request = sample_request();
    request.config = Some(TaxConfig {
        max_strategies: 1,
        ..TaxConfig::default()
    });
    let out = optimize_tax(&request).unwrap();
    assert_eq!(out.result.strategies.len(), 1);
    assert_eq!(out.result.strategies[0].section, DeductionSection::Section80C);
}

#[test]
fn test_negative_income_returns_no_report() {
    let mut request = sample_request();
    request.income = dec!(-1);
    assert!(optimize_tax(&request).is_err());
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = TaxEngine::new(TaxConfig::default()).unwrap();
    let request = sample_request();
    let expected = engine.optimize(&request).unwrap().result;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.optimize(&request).unwrap().result))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_document_checklist_for_request() {
    let out = build_document_checklist(&sample_request()).unwrap();
    assert_eq!(out.result.taxpayer, "salaried");
    assert_eq!(out.result.deadlines.last().unwrap().label, "Income tax return filing due date");
}
