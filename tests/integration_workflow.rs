//! Integration tests for full workflow scenarios
//!
//! These tests drive the MarketAnalyzer the way a pricing service would:
//! load symbol series with gaps and missing values, estimate each symbol
//! against an index, correlate pairs and serialize the records.

use assert_approx_eq::assert_approx_eq;
use lppl_finance::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime, Weekday};

/// Weekday closes only, starting on a Monday.
fn business_days(n: usize) -> Vec<OffsetDateTime> {
    let mut out = Vec::with_capacity(n);
    let mut t = datetime!(2024-01-01 21:00 UTC);
    while out.len() < n {
        if !matches!(t.weekday(), Weekday::Saturday | Weekday::Sunday) {
            out.push(t);
        }
        t += Duration::days(1);
    }
    out
}

fn random_walk(rng: &mut ChaCha20Rng, n: usize, start: f64, vol: f64) -> Vec<f64> {
    let mut p = start;
    (0..n)
        .map(|_| {
            let v = p;
            p *= (vol * (rng.gen::<f64>() - 0.5)).exp();
            v
        })
        .collect()
}

/// Test scenario: analyst estimates one stock against its index
///
/// 1. Index and stock share a business-day calendar
/// 2. The stock has a few missing closes
/// 3. Drift, volatility, risk and beta come back in one record
#[test]
fn test_symbol_estimation_workflow() {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let ts = business_days(120);
    let index_prices = random_walk(&mut rng, 120, 4500.0, 0.02);
    // stock moves 1.5x the index in log terms plus idiosyncratic noise
    let stock_prices: Vec<f64> = index_prices
        .iter()
        .map(|p| 10.0 * (1.5 * (p / 4500.0).ln() + 0.001 * (rng.gen::<f64>() - 0.5)).exp())
        .collect();

    let mut values: Vec<Option<f64>> = stock_prices.into_iter().map(Some).collect();
    values[10] = None;
    values[57] = Some(f64::NAN);
    let stock = TimeSeries::from_values(ts.clone(), values).unwrap();
    let index = TimeSeries::from_prices(ts.clone(), index_prices).unwrap();

    let analyzer = MarketAnalyzer::new();
    let result = analyzer.estimate_symbol("ACME", &stock, &index).unwrap();

    assert_eq!(result.symbol, "ACME");
    assert_eq!(result.nbrecords, 118);
    assert_eq!(result.data_startdate, date!(2024 - 01 - 01));
    assert_eq!(result.data_enddate, ts[119].date());
    assert!(result.volatility > 0.0);
    assert!(result.downside_risk > 0.0 && result.upside_risk > 0.0);

    let beta = result.beta.value().unwrap();
    assert!((beta - 1.5).abs() < 0.05, "beta = {}", beta);
}

/// Test scenario: weekend gaps are annualized by elapsed calendar time
#[test]
fn test_calendar_gaps_scale_drift() {
    let ts = business_days(11);
    // 1% per elapsed calendar day
    let start = ts[0];
    let prices: Vec<f64> = ts
        .iter()
        .map(|t| 100.0 * (0.01 * ((*t - start).whole_days() as f64)).exp())
        .collect();

    let fit = fit_gbm(&ts, &prices, 365.0).unwrap();
    assert_approx_eq!(fit.r, 0.01 * 365.0, 1e-9);
    assert!(fit.sigma < 1e-6);

    let trading = fit_gbm(&ts, &prices, 252.0).unwrap();
    assert_approx_eq!(trading.r, 0.01 * 252.0, 1e-9);
}

/// Test scenario: two listings of one company, one quoted inversely
#[test]
fn test_pair_correlation_workflow() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let ts = business_days(80);
    let a = random_walk(&mut rng, 80, 50.0, 0.03);
    let b: Vec<f64> = a.iter().map(|p| 2.0 * p).collect();
    let inverse: Vec<f64> = a.iter().map(|p| 1.0 / p).collect();

    let series_a = TimeSeries::from_prices(ts.clone(), a).unwrap();
    let series_b = TimeSeries::from_prices(ts[20..].to_vec(), b[20..].to_vec()).unwrap();
    let series_inv = TimeSeries::from_prices(ts.clone(), inverse).unwrap();

    let analyzer = MarketAnalyzer::new();

    let same = analyzer
        .estimate_correlation("A", &series_a, "B", &series_b)
        .unwrap();
    assert_approx_eq!(same.correlation, 1.0, 1e-12);
    assert_approx_eq!(same.std1, same.std2, 1e-12);
    assert_eq!(same.startdate, ts[20].date());

    let opposite = analyzer
        .estimate_correlation("A", &series_a, "INV", &series_inv)
        .unwrap();
    assert_approx_eq!(opposite.correlation, -1.0, 1e-12);
    assert_approx_eq!(opposite.covariance, -opposite.std1 * opposite.std2, 1e-12);
    assert_eq!(opposite.startdate, ts[0].date());
    assert_eq!(opposite.enddate, ts[79].date());
}

/// Test scenario: joint fit over a basket
#[test]
fn test_basket_joint_fit() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let ts = business_days(60);
    let basket: Vec<Vec<f64>> = (0..4)
        .map(|k| random_walk(&mut rng, 60, 20.0 + k as f64, 0.02))
        .collect();

    let fit = joint_fit(&ts, &basket, 365.0).unwrap();
    let corr = fit.correlation_matrix().unwrap();
    for i in 0..4 {
        assert_approx_eq!(corr[(i, i)], 1.0, 1e-12);
        let single = fit_gbm(&ts, &basket[i], 365.0).unwrap();
        assert_approx_eq!(fit.std(i).unwrap(), single.sigma, 1e-12);
        for j in 0..4 {
            assert_approx_eq!(corr[(i, j)], corr[(j, i)], 1e-15);
        }
    }
}

/// Test scenario: inner alignment of irregular calendars
#[test]
fn test_inner_alignment_properties() {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let all = business_days(200);
    let pick = |rng: &mut ChaCha20Rng| -> Vec<OffsetDateTime> {
        all.iter().copied().filter(|_| rng.gen_bool(0.7)).collect()
    };
    let ta = pick(&mut rng);
    let tb = pick(&mut rng);
    let a = TimeSeries::from_prices(ta.clone(), vec![1.0; ta.len()]).unwrap();
    let b = TimeSeries::from_prices(tb.clone(), vec![2.0; tb.len()]).unwrap();

    let inner = align(&a, &b, JoinMode::Inner);
    assert!(inner.len() <= ta.len().min(tb.len()));
    assert!(inner.timestamps().windows(2).all(|w| w[0] < w[1]));
    for t in inner.timestamps() {
        assert!(ta.contains(t) && tb.contains(t));
    }

    let left = align(&a, &b, JoinMode::Left);
    assert_eq!(left.len(), ta.len());
    assert_eq!(left.second().iter().filter(|v| v.is_some()).count(), inner.len());
}

/// Test scenario: records are published as JSON
#[test]
fn test_records_serialize_for_publication() {
    let ts = business_days(30);
    let stock: Vec<f64> = (0..30).map(|i| 10.0 + (i as f64 * 0.5).sin()).collect();
    let flat = vec![100.0; 30];
    let series = TimeSeries::from_prices(ts.clone(), stock).unwrap();
    let index = TimeSeries::from_prices(ts, flat).unwrap();

    let result = MarketAnalyzer::new()
        .estimate_symbol("FLATIDX", &series, &index)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["beta"].is_null());
    assert_eq!(json["symbol"], "FLATIDX");
    assert_eq!(json["data_startdate"], "2024-01-01");
    assert!(json["volatility"].as_f64().unwrap() > 0.0);
}
