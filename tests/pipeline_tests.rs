use polars::prelude::*;

use pwt_growthkit::{
    accounting, AnalysisConfig, CapitalShareMode, GrowthError, GrowthFormula, GrowthModel,
    PerCapitaBasis, ResultTable,
};

fn config(countries: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        countries: countries.iter().map(|s| s.to_string()).collect(),
        start_year: 1960,
        end_year: 2000,
        capital_share_mode: CapitalShareMode::FixedConstant,
        fixed_alpha: 0.3,
        growth_formula: GrowthFormula::LogDifference,
        per_capita_basis: PerCapitaBasis::PerWorker,
    }
}

fn run_table(panel: DataFrame, config: &AnalysisConfig) -> ResultTable {
    let model = GrowthModel::from_panel(panel).unwrap();
    let features = model.build_features(config).unwrap();
    let outcome = accounting::run(&features, config).unwrap();
    ResultTable::from_outcome(outcome)
}

#[test]
fn reference_scenario_end_to_end() {
    // Output per worker doubles and capital per worker quadruples over
    // forty years; alpha fixed at 0.3.
    let panel = df!(
        "countrycode" => ["AAA", "AAA"],
        "country" => ["Alphaland", "Alphaland"],
        "year" => [1960i64, 2000],
        "rgdpna" => [100.0, 200.0],
        "rkna" => [100.0, 400.0],
        "emp" => [1.0, 1.0],
        "avh" => [2000.0, 2000.0],
        "labsh" => [0.7, 0.7],
        "rtfpna" => [1.0, 2.0],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland"]));
    assert_eq!(table.rows().len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.country, "Alphaland");
    assert_eq!((row.start_year, row.end_year), (Some(1960), Some(2000)));
    assert_eq!(row.growth_rate, 1.73);
    assert_eq!(row.tfp_growth, 0.69);
    assert_eq!(row.capital_deepening, 1.04);
    assert_eq!(row.tfp_share, Some(0.40));
    assert_eq!(row.capital_share, Some(0.60));
}

#[test]
fn single_year_country_is_excluded_without_aborting() {
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "BBB"],
        "country" => ["Alphaland", "Alphaland", "Betaland"],
        "year" => [1960i64, 2000, 1980],
        "rgdpna" => [100.0, 200.0, 150.0],
        "rkna" => [100.0, 400.0, 150.0],
        "emp" => [1.0, 1.0, 1.0],
        "avh" => [2000.0, 2000.0, 2000.0],
        "labsh" => [0.7, 0.7, 0.7],
        "rtfpna" => [1.0, 2.0, 1.5],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland", "Betaland"]));
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0].country, "Alphaland");

    assert_eq!(table.excluded().len(), 1);
    let exclusion = &table.excluded()[0];
    assert_eq!(exclusion.country, "Betaland");
    assert!(matches!(
        exclusion.reason,
        GrowthError::InvalidTimeSpan(_, 1980)
    ));

    // The excluded country takes no part in the average.
    let avg = table.average().unwrap();
    assert_eq!(avg.growth_rate, table.rows()[0].growth_rate);
}

#[test]
fn configured_country_absent_from_data_is_excluded() {
    let panel = df!(
        "countrycode" => ["AAA", "AAA"],
        "country" => ["Alphaland", "Alphaland"],
        "year" => [1960i64, 2000],
        "rgdpna" => [100.0, 200.0],
        "rkna" => [100.0, 400.0],
        "emp" => [1.0, 1.0],
        "avh" => [2000.0, 2000.0],
        "labsh" => [0.7, 0.7],
        "rtfpna" => [1.0, 2.0],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland", "Gammaland"]));
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.excluded().len(), 1);
    assert_eq!(table.excluded()[0].country, "Gammaland");
    assert!(matches!(
        table.excluded()[0].reason,
        GrowthError::InsufficientData(_)
    ));
}

#[test]
fn incomplete_rows_are_dropped_and_endpoints_fall_back() {
    // 1960 is missing its labor share, so the row falls out and the
    // country's own min/max (1970, 2000) become the endpoints.
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "AAA"],
        "country" => ["Alphaland", "Alphaland", "Alphaland"],
        "year" => [1960i64, 1970, 2000],
        "rgdpna" => [90.0, 100.0, 200.0],
        "rkna" => [90.0, 100.0, 400.0],
        "emp" => [1.0, 1.0, 1.0],
        "avh" => [2000.0, 2000.0, 2000.0],
        "labsh" => [None, Some(0.7), Some(0.7)],
        "rtfpna" => [1.0, 1.0, 2.0],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland"]));
    let row = &table.rows()[0];
    assert_eq!((row.start_year, row.end_year), (Some(1970), Some(2000)));
    // 100 * ln(2) / 30, rounded.
    assert_eq!(row.growth_rate, 2.31);
}

#[test]
fn window_restriction_applies_before_fallback() {
    // Years outside [1960, 2000] must not become fallback endpoints.
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "AAA", "AAA"],
        "country" => ["Alphaland"; 4],
        "year" => [1950i64, 1970, 1990, 2010],
        "rgdpna" => [50.0, 100.0, 200.0, 800.0],
        "rkna" => [50.0, 100.0, 400.0, 800.0],
        "emp" => [1.0, 1.0, 1.0, 1.0],
        "avh" => [2000.0; 4],
        "labsh" => [0.7; 4],
        "rtfpna" => [1.0, 1.0, 2.0, 4.0],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland"]));
    let row = &table.rows()[0];
    assert_eq!((row.start_year, row.end_year), (Some(1970), Some(1990)));
}

#[test]
fn per_hour_basis_uses_total_hours() {
    // Hours halve while output doubles: per-hour output quadruples while
    // per-worker output only doubles.
    let panel = df!(
        "countrycode" => ["AAA", "AAA"],
        "country" => ["Alphaland", "Alphaland"],
        "year" => [1960i64, 2000],
        "rgdpna" => [100.0, 200.0],
        "rkna" => [100.0, 400.0],
        "emp" => [1.0, 1.0],
        "avh" => [2000.0, 1000.0],
        "labsh" => [0.7, 0.7],
        "rtfpna" => [1.0, 2.0],
    )
    .unwrap();

    let mut per_worker = config(&["Alphaland"]);
    let mut per_hour = per_worker.clone();
    per_hour.per_capita_basis = PerCapitaBasis::PerHourWorked;

    per_worker.validate().unwrap();
    let worker_row = run_table(panel.clone(), &per_worker).rows()[0].clone();
    let hour_row = run_table(panel, &per_hour).rows()[0].clone();

    assert_eq!(worker_row.growth_rate, 1.73);
    assert_eq!(hour_row.growth_rate, 3.47);
}

#[test]
fn non_positive_series_value_excludes_only_that_country() {
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "BBB", "BBB"],
        "country" => ["Alphaland", "Alphaland", "Betaland", "Betaland"],
        "year" => [1960i64, 2000, 1960, 2000],
        "rgdpna" => [100.0, 200.0, -5.0, 150.0],
        "rkna" => [100.0, 400.0, 100.0, 150.0],
        "emp" => [1.0, 1.0, 1.0, 1.0],
        "avh" => [2000.0; 4],
        "labsh" => [0.7; 4],
        "rtfpna" => [1.0, 2.0, 1.0, 1.5],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland", "Betaland"]));
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0].country, "Alphaland");
    assert!(matches!(
        table.excluded()[0].reason,
        GrowthError::InvalidSeriesValue(..)
    ));
}

#[test]
fn zero_employment_is_excluded_not_propagated() {
    // A zero emp denominator makes the per-worker series infinite; the
    // country must fall out as an invalid series value instead of pushing
    // a non-finite growth rate into the table and the Average row.
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "BBB", "BBB"],
        "country" => ["Alphaland", "Alphaland", "Betaland", "Betaland"],
        "year" => [1960i64, 2000, 1960, 2000],
        "rgdpna" => [100.0, 200.0, 80.0, 300.0],
        "rkna" => [100.0, 400.0, 60.0, 500.0],
        "emp" => [1.0, 1.0, 0.0, 2.5],
        "avh" => [2000.0; 4],
        "labsh" => [0.7; 4],
        "rtfpna" => [1.0, 2.0, 1.0, 1.8],
    )
    .unwrap();

    let table = run_table(panel, &config(&["Alphaland", "Betaland"]));
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0].country, "Alphaland");
    assert!(table.rows()[0].growth_rate.is_finite());

    assert_eq!(table.excluded().len(), 1);
    let exclusion = &table.excluded()[0];
    assert_eq!(exclusion.country, "Betaland");
    assert!(matches!(
        exclusion.reason,
        GrowthError::InvalidSeriesValue(_, _, 1960)
    ));

    let avg = table.average().unwrap();
    assert!(avg.growth_rate.is_finite());
    assert_eq!(avg.growth_rate, table.rows()[0].growth_rate);
}

#[test]
fn residual_identity_and_share_sum_hold_across_the_table() {
    let panel = df!(
        "countrycode" => ["AAA", "AAA", "BBB", "BBB"],
        "country" => ["Alphaland", "Alphaland", "Betaland", "Betaland"],
        "year" => [1960i64, 2000, 1960, 2000],
        "rgdpna" => [100.0, 200.0, 80.0, 300.0],
        "rkna" => [100.0, 400.0, 60.0, 500.0],
        "emp" => [1.0, 1.2, 2.0, 2.5],
        "avh" => [2000.0, 1900.0, 2100.0, 1800.0],
        "labsh" => [0.7, 0.65, 0.6, 0.55],
        "rtfpna" => [1.0, 2.0, 1.0, 1.8],
    )
    .unwrap();

    let mut cfg = config(&["Alphaland", "Betaland"]);
    cfg.capital_share_mode = CapitalShareMode::PeriodAverage;

    let model = GrowthModel::from_panel(panel).unwrap();
    let features = model.build_features(&cfg).unwrap();
    let outcome = accounting::run(&features, &cfg).unwrap();

    assert_eq!(outcome.decompositions.len(), 2);
    for d in &outcome.decompositions {
        assert!((d.capital_deepening + d.tfp_growth - d.growth_rate).abs() < 1e-10);
        let (ts, cs) = (d.tfp_share.unwrap(), d.capital_share.unwrap());
        assert!((ts + cs - 1.0).abs() < 1e-10);
    }
}

#[test]
fn tfp_index_growth_is_reported_alongside_not_substituted() {
    let panel = df!(
        "countrycode" => ["AAA", "AAA"],
        "country" => ["Alphaland", "Alphaland"],
        "year" => [1960i64, 2000],
        "rgdpna" => [100.0, 200.0],
        "rkna" => [100.0, 400.0],
        "emp" => [1.0, 1.0],
        "avh" => [2000.0, 2000.0],
        "labsh" => [0.7, 0.7],
        "rtfpna" => [1.0, 1.5],
    )
    .unwrap();

    let cfg = config(&["Alphaland"]);
    let model = GrowthModel::from_panel(panel).unwrap();
    let features = model.build_features(&cfg).unwrap();
    let outcome = accounting::run(&features, &cfg).unwrap();
    let d = &outcome.decompositions[0];

    // The primary TFP figure is the residual.
    assert!((d.tfp_growth - (d.growth_rate - d.capital_deepening)).abs() < 1e-12);
    // The index-based figure exists and differs from the residual here:
    // index term growth = 100 * ln(1.5^(1/0.3)) / 40.
    let expected = 100.0 * (1.5_f64.powf(1.0 / 0.3)).ln() / 40.0;
    let index_growth = d.tfp_index_growth.unwrap();
    assert!((index_growth - expected).abs() < 1e-9);
    assert!((index_growth - d.tfp_growth).abs() > 1e-6);
}
