//! Hazard Curve Aggregation Integration Tests
//!
//! Tests for per-site curve computation, validation and failure policies.

mod common;

use std::sync::Arc;

use common::{
    crust_gmms, crust_rupture, init_tracing, la, DecayModel, PoissonCalculator, StaticForecast,
};
use quakehaz::core::curves_as_json;
use quakehaz::domain::RunKind;
use quakehaz::{
    BatchReport, EventType, FailurePolicy, GmmMap, HazardCurveAggregator, HazardError,
    MemoryReporter, RunState, Site,
};

fn forecast() -> StaticForecast {
    StaticForecast::new(vec![
        crust_rupture("r1", 6.5, 0.01),
        crust_rupture("r2", 7.2, 0.002),
    ])
}

#[test]
fn test_single_site_curve_matches_levels() {
    init_tracing();
    let calculator = Arc::new(PoissonCalculator::default());
    let aggregator = HazardCurveAggregator::new(calculator.clone());
    let levels = [0.1, 0.2, 0.3];

    let run = aggregator
        .compute(&[la()], &forecast(), &crust_gmms(Arc::new(DecayModel)), &levels, 200.0)
        .unwrap();

    assert_eq!(run.curves.len(), 1);
    let curve = run.curve(&la()).unwrap();
    assert_eq!(curve.levels(), &levels);
    assert_eq!(curve.len(), 3);

    // Values come from the calculator, not the seed
    assert!(curve.poes().iter().all(|p| *p > 0.0 && *p < 1.0));
    assert!(curve.poes().windows(2).all(|pair| pair[1] <= pair[0]));

    assert_eq!(calculator.call_count(), 1);
    assert!(run.report.is_complete_success());
}

#[test]
fn test_one_entry_per_distinct_site() {
    let calculator = Arc::new(PoissonCalculator::default());
    let aggregator = HazardCurveAggregator::new(calculator.clone());
    let sites = [la(), Site::new(37.77, -122.42), la()];

    let run = aggregator
        .compute(&sites, &forecast(), &crust_gmms(Arc::new(DecayModel)), &[0.1, 0.2], 200.0)
        .unwrap();

    assert_eq!(run.curves.len(), 2);
    assert_eq!(calculator.call_count(), 3);
}

#[test]
fn test_each_site_gets_its_own_seed() {
    let calculator = Arc::new(PoissonCalculator::default());
    let aggregator = HazardCurveAggregator::new(calculator.clone());
    let a = la();
    let b = Site::new(37.77, -122.42);

    let run = aggregator
        .compute(&[a, b], &forecast(), &crust_gmms(Arc::new(DecayModel)), &[0.1, 0.2], 200.0)
        .unwrap();

    // Every call saw an untouched seed, even after earlier sites were populated
    let seeds = calculator.seeds.lock().unwrap();
    assert_eq!(seeds.len(), 2);
    assert!(seeds.iter().all(|s| s.poes() == [1.0, 1.0]));

    // Changing one result leaves the other alone
    let mut curves = run.curves;
    let before = curves[&b].clone();
    curves.get_mut(&a).unwrap().set_poe(0, 0.0);
    assert_eq!(curves[&b], before);
}

#[test]
fn test_validation_rejects_before_any_call() {
    let calculator = Arc::new(PoissonCalculator::default());
    let reporter = Arc::new(MemoryReporter::new());
    let aggregator =
        HazardCurveAggregator::new(calculator.clone()).with_reporter(reporter.clone());
    let gmms = crust_gmms(Arc::new(DecayModel));

    let cases: Vec<(Vec<Site>, StaticForecast, GmmMap, Vec<f64>)> = vec![
        (vec![], forecast(), gmms.clone(), vec![0.1]),
        (vec![la()], StaticForecast::new(vec![]), gmms.clone(), vec![0.1]),
        (vec![la()], forecast(), GmmMap::new(), vec![0.1]),
        (vec![la()], forecast(), gmms.clone(), vec![]),
        (vec![la()], forecast(), gmms.clone(), vec![0.1, 0.1]),
    ];

    for (sites, forecast, gmms, levels) in &cases {
        let err = aggregator
            .compute(sites, forecast, gmms, levels, 200.0)
            .unwrap_err();
        assert!(err.is_invalid_argument(), "unexpected error: {}", err);
    }

    let err = aggregator
        .compute(&[la()], &forecast(), &gmms, &[0.1], 0.0)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(calculator.call_count(), 0);
    assert_eq!(
        reporter.events_of_type(EventType::ValidationFailed).len(),
        cases.len() + 1
    );
}

#[test]
fn test_all_or_nothing_aborts_on_first_failure() {
    let bad = Site::new(37.77, -122.42);
    let calculator = Arc::new(PoissonCalculator::failing_at(&[bad]));
    let reporter = Arc::new(MemoryReporter::new());
    let aggregator =
        HazardCurveAggregator::new(calculator.clone()).with_reporter(reporter.clone());

    let err = aggregator
        .compute(
            &[la(), bad, Site::new(40.0, -120.0)],
            &forecast(),
            &crust_gmms(Arc::new(DecayModel)),
            &[0.1, 0.2],
            200.0,
        )
        .unwrap_err();

    match err {
        HazardError::ExternalComputation { unit, source } => {
            assert_eq!(unit, "site (37.77, -122.42)");
            assert!(source.to_string().contains("timed out"));
        }
        other => panic!("Expected ExternalComputation, got {:?}", other),
    }

    // The third site was never attempted
    assert_eq!(calculator.call_count(), 2);
    assert_eq!(reporter.events_of_type(EventType::RunFailed).len(), 1);
}

#[test]
fn test_partial_policy_keeps_other_sites() {
    let bad = Site::new(37.77, -122.42);
    let calculator = Arc::new(PoissonCalculator::failing_at(&[bad]));
    let reporter = Arc::new(MemoryReporter::new());
    let aggregator = HazardCurveAggregator::new(calculator.clone())
        .with_reporter(reporter.clone())
        .with_policy(FailurePolicy::Partial);
    let sites = [la(), bad, Site::new(40.0, -120.0)];

    let run = aggregator
        .compute(&sites, &forecast(), &crust_gmms(Arc::new(DecayModel)), &[0.1, 0.2], 200.0)
        .unwrap();

    assert_eq!(run.curves.len(), 2);
    assert!(run.curve(&bad).is_none());
    assert_eq!(run.report.state, RunState::PartiallyFailed { failed_units: 1 });
    assert_eq!(run.report.failed[0].unit, "site (37.77, -122.42)");
    assert_eq!(run.report.succeeded.len(), 2);

    let json = curves_as_json(&run.curves, &sites);
    assert!(json[1].is_null());
    assert_eq!(json[0].as_array().unwrap().len(), 2);

    // The event stream tells the same story
    let rebuilt = BatchReport::from_events(RunKind::HazardCurves, &reporter.events()).unwrap();
    assert_eq!(rebuilt.state, run.report.state);
    assert_eq!(rebuilt.succeeded, run.report.succeeded);
    assert_eq!(rebuilt.failed, run.report.failed);
}

#[test]
fn test_sites_are_processed_in_blocks() {
    let reporter = Arc::new(MemoryReporter::new());
    let aggregator = HazardCurveAggregator::new(Arc::new(PoissonCalculator::default()))
        .with_reporter(reporter.clone())
        .with_block_size(2);
    let sites: Vec<Site> = (0..5).map(|i| Site::new(30.0 + i as f64, -118.0)).collect();

    let run = aggregator
        .compute(&sites, &forecast(), &crust_gmms(Arc::new(DecayModel)), &[0.1], 200.0)
        .unwrap();

    assert_eq!(run.curves.len(), 5);
    let blocks = reporter.events_of_type(EventType::BlockStarted);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].summary, "Block 3/3 (1 sites)");
}

#[test]
fn test_unsorted_levels_yield_ascending_curve() {
    let calculator = Arc::new(PoissonCalculator::default());
    let aggregator = HazardCurveAggregator::new(calculator.clone());
    let gmms = crust_gmms(Arc::new(DecayModel));

    let run = aggregator
        .compute(&[la()], &forecast(), &gmms, &[0.3, 0.1, 0.2], 200.0)
        .unwrap();

    let curve = run.curve(&la()).unwrap();
    assert_eq!(curve.levels(), &[0.1, 0.2, 0.3]);
    assert!(curve.poes().windows(2).all(|pair| pair[1] <= pair[0]));

    // Same curve as the sorted request
    let sorted = aggregator
        .compute(&[la()], &forecast(), &gmms, &[0.1, 0.2, 0.3], 200.0)
        .unwrap();
    assert_eq!(sorted.curve(&la()), Some(curve));

    let err = aggregator
        .compute(&[la()], &forecast(), &gmms, &[0.2, 0.1, 0.2], 200.0)
        .unwrap_err();
    assert!(err.is_invalid_argument());
}
