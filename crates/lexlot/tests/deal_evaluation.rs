use lexlot::appraisal::rules::StressFloors;
use lexlot::appraisal::{
    apply_scenario, bandify, compute_metrics_with_region, compute_sdlt, region_from_postcode,
    resolve_bands, BandSource, Colour, DealInputs, DealSubmission, EvaluationContext, MetricKey,
    Product, Region, RuleBook, RuleBookError, ScenarioKey, UserPreferences,
};
use lexlot::DealAppraiser;

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

fn deal(postcode: &str, lender: &str) -> DealInputs {
    DealInputs {
        price: Some(200_000.0),
        rent_monthly: Some(1_000.0),
        loan: Some(150_000.0),
        rate: Some(5.0),
        term_years: Some(25),
        costs_annual: Some(1_200.0),
        postcode: postcode.to_string(),
        lender: lender.to_string(),
        ..DealInputs::default()
    }
}

#[test]
fn gross_yield_is_rent_over_price() {
    let metrics = compute_metrics_with_region(&deal("B3 2JR", ""));
    assert!(close(metrics.gross_yield_pct, 6.0));
}

#[test]
fn regions_resolve_from_postcodes() {
    assert_eq!(region_from_postcode("BT1 1AA"), Region::NorthernIreland);
    assert_eq!(region_from_postcode("EH1 1AA"), Region::Scotland);
    assert_eq!(region_from_postcode("CF10 1AA"), Region::Wales);
    assert_eq!(region_from_postcode("B3 2JR"), Region::England);
    assert_eq!(region_from_postcode(""), Region::Unknown);
}

#[test]
fn stress_rate_never_undercuts_deal_or_floor() {
    let floors = StressFloors::standard();
    let rules = RuleBook::standard();

    for postcode in ["B3 2JR", "EH1 1AA", "CF10 1AA", "BT1 1AA", ""] {
        let region = region_from_postcode(postcode);
        for tenths in 0..=120 {
            let rate = f64::from(tenths) / 10.0;

            let unassisted = compute_metrics_with_region(&DealInputs {
                rate: Some(rate),
                ..deal(postcode, "")
            });
            assert!(unassisted.stress_used_pct >= rate);
            assert!(unassisted.stress_used_pct >= floors.for_region(region));

            for lender in &rules.lenders {
                let lent = compute_metrics_with_region(&DealInputs {
                    rate: Some(rate),
                    ..deal(postcode, &lender.lender_id)
                });
                assert!(lent.stress_used_pct >= rate);
                assert!(lent.stress_used_pct >= lender.products[0].stress_rate_pct);
            }
        }
    }
}

#[test]
fn recognised_lender_floor_replaces_higher_regional_floor() {
    let metrics = compute_metrics_with_region(&DealInputs {
        rate: Some(4.0),
        ..deal("EH1 1AA", "Generic")
    });
    assert_eq!(metrics.region, Region::Scotland);
    assert_eq!(metrics.stress_used_pct, 5.5);
}

#[test]
fn sdlt_never_falls_as_price_rises() {
    for region in Region::ordered() {
        let mut previous = 0.0;
        for step in 0..=400 {
            let price = f64::from(step) * 5_000.0;
            let tax = compute_sdlt(price, region, true);
            assert!(tax >= previous, "{region}: {tax} < {previous} at {price}");
            previous = tax;
        }
    }
}

#[test]
fn cascade_priority_user_then_lender() {
    let rules = RuleBook::standard();
    let targeted = UserPreferences::default().with_target(MetricKey::NetYield, 0.05);
    let inputs = deal("EH1 1AA", "NatWest");

    let ctx = EvaluationContext::build(&inputs, &rules, &targeted);
    assert_eq!(
        resolve_bands(MetricKey::NetYield, &ctx).source,
        BandSource::User
    );

    let untargeted = UserPreferences::default();
    let ctx = EvaluationContext::build(&inputs, &rules, &untargeted);
    assert_eq!(
        resolve_bands(MetricKey::NetYield, &ctx).source,
        BandSource::Region
    );
    assert_eq!(resolve_bands(MetricKey::Icr, &ctx).source, BandSource::Lender);
}

#[test]
fn ltv_band_is_inverted() {
    let rules = RuleBook::standard();
    let prefs = UserPreferences::default();
    let inputs = deal("B3 2JR", "");
    let ctx = EvaluationContext::build(&inputs, &rules, &prefs);
    let band = resolve_bands(MetricKey::Ltv, &ctx);

    assert!(band.invert);
    assert_eq!(bandify(band.green, &band), Colour::Green);
    assert_eq!(bandify(band.amber + 0.01, &band), Colour::Red);
}

#[test]
fn paying_sdlt_from_cash_lowers_cash_on_cash() {
    let without = compute_metrics_with_region(&deal("B3 2JR", ""));
    let with = compute_metrics_with_region(&DealInputs {
        include_sdlt: true,
        ..deal("B3 2JR", "")
    });

    assert!(with.sdlt_amount > 0.0);
    assert!(close(with.annual_cashflow, without.annual_cashflow));
    assert!(with.cash_invested > without.cash_invested);
    assert!(with.coc_pct < without.coc_pct);
}

#[test]
fn rate_scenario_composes_with_base() {
    let base = deal("B3 2JR", "");
    let shocked = apply_scenario(&apply_scenario(&base, ScenarioKey::Base), ScenarioKey::RateUp200);
    assert_eq!(shocked.rate, Some(7.0));
    assert_eq!(
        apply_scenario(&base, ScenarioKey::RateUp200),
        apply_scenario(&base, ScenarioKey::RateUp200)
    );
}

#[test]
fn form_submission_evaluates_end_to_end() {
    let submission: DealSubmission = serde_json::from_str(
        r#"{
            "price": "£250,000",
            "rent": "1,450",
            "loan": 187500,
            "rate": "5.25%",
            "term": "25",
            "costs": "1800",
            "product": "REPAY",
            "postcode": "cf101aa",
            "lender": " skipton ",
            "includeSdlt": "yes"
        }"#,
    )
    .expect("submission parses");
    let inputs = submission.coerce();
    assert_eq!(inputs.postcode, "CF10 1AA");
    assert_eq!(inputs.product, Some(Product::Repayment));

    let appraisal = DealAppraiser::standard().appraise(&inputs);

    assert_eq!(appraisal.metrics.region, Region::Wales);
    assert_eq!(appraisal.lender.as_deref(), Some("Skipton"));
    assert_eq!(appraisal.results.len(), MetricKey::ordered().len());
    let icr = appraisal.result(MetricKey::Icr).expect("icr scored");
    assert_eq!(icr.band.source, BandSource::Lender);
    let gross = appraisal.result(MetricKey::GrossYield).expect("gross scored");
    assert_eq!(gross.band.source, BandSource::Region);
    assert!(appraisal.composite.score <= 100);
}

#[test]
fn strong_deal_rates_green_and_weak_deal_red() {
    let appraiser = DealAppraiser::standard();

    let strong = appraiser.appraise(&DealInputs {
        rent_monthly: Some(1_600.0),
        loan: Some(120_000.0),
        ..deal("B3 2JR", "")
    });
    assert_eq!(strong.composite.overall, Colour::Green);
    assert_eq!(strong.headline, Colour::Green);

    let weak = appraiser.appraise(&DealInputs {
        rent_monthly: Some(600.0),
        loan: Some(180_000.0),
        rate: Some(7.0),
        ..deal("B3 2JR", "")
    });
    assert_eq!(weak.composite.overall, Colour::Red);
    assert_eq!(weak.headline, Colour::Red);
}

#[test]
fn appraiser_is_shareable_across_threads() {
    let appraiser = DealAppraiser::standard();
    let inputs = deal("B3 2JR", "natwest");
    let expected = appraiser.analyse(&inputs);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| appraiser.analyse(&inputs)))
            .collect();
        for handle in handles {
            let analysis = handle.join().expect("worker panicked");
            assert_eq!(analysis, expected);
        }
    });
}

#[test]
fn rulebook_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("lexlot-rulebook-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"lenders": [{"lenderId": "acme", "name": "Acme", "products": [
            {"code": "IO", "maxLtv": 0.6, "icrBasic": 1.3, "icrHigher": 1.5, "stressRate": 8.0}
        ]}]}"#,
    )
    .expect("write rulebook");

    let rules = RuleBook::from_path(&path);
    std::fs::remove_file(&path).ok();
    let rules = rules.expect("rulebook loads");

    let appraiser = DealAppraiser::new(rules, UserPreferences::default());
    let appraisal = appraiser.appraise(&deal("B3 2JR", "ACME"));
    assert_eq!(appraisal.metrics.stress_used_pct, 8.0);
    let ltv = appraisal.result(MetricKey::Ltv).expect("ltv scored");
    assert!(close(ltv.band.green, 0.6));
}

#[test]
fn missing_rulebook_is_an_io_error() {
    let path = std::env::temp_dir().join("lexlot-no-such-rulebook.json");
    assert!(matches!(RuleBook::from_path(path), Err(RuleBookError::Io(_))));
}
