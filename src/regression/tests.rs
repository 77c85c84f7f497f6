// Scenario tests for the regression pipeline
//
// Realistic benchmark histories: flat runs, noisy runs, clean level shifts,
// isolated spikes, and the minimum-data boundary.

use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Deterministic jitter in [-2, 2]
fn jitter(i: usize) -> f64 {
    ((i * 7) % 5) as f64 - 2.0
}

fn config(window_size: usize, filter_length: usize) -> AnalysisConfig {
    AnalysisConfig {
        window_size,
        filter_length,
        ..AnalysisConfig::default()
    }
}

/// Scenario: 30 stable builds at 1.0, then 6 builds at 5.0
/// Expected: one result, regressed, located slowdown near build 30
#[test]
fn test_end_to_end_step_slowdown() {
    let mut samples = vec![1.0; 30];
    samples.extend(vec![5.0; 6]);

    let mut set = BenchmarkSet::new();
    set.insert("bench_a".to_string(), samples);

    let config = AnalysisConfig {
        window_size: 6,
        filter_length: 5,
        significance_level: 0.05,
        metric: "real_time".to_string(),
    };
    let results = analyze_all(&set, &config).unwrap();

    assert_eq!(results.len(), 1);
    let bench = &results[0];
    assert_eq!(bench.name, "bench_a");
    assert!(bench.detection.regressed);
    assert_eq!(bench.state(), BenchmarkState::LocatedSlowdown);

    let step = bench.detection.step.unwrap();
    assert_eq!(step.direction, StepDirection::Slowdown);
    assert!(
        (27..=33).contains(&step.index),
        "step index {} should be near 30",
        step.index
    );
}

/// Scenario: clean level shift from 100 to 200 over the last 10 builds
/// Expected: detector reports a regression with a 10-build window
#[test]
fn test_clear_level_shift_is_detected() {
    let mut series = vec![100.0; 40];
    series.extend(vec![200.0; 10]);

    assert!(is_regression(&series, 10, 0.05).unwrap());
}

/// Scenario: textbook step from 0 to 10 halfway through
/// Expected: step located within 3 of index 50, classified as slowdown
#[test]
fn test_step_location_and_direction() {
    let mut series = vec![0.0; 50];
    series.extend(vec![10.0; 50]);

    let index = estimate_step_index(&series);
    assert!((47..=53).contains(&index), "index {}", index);
    assert_eq!(
        classify_step(&series, index, series.len()),
        StepDirection::Slowdown
    );
}

/// Scenario: 100 independent histories of uniform noise, no level shift
/// Expected: at least 90% are reported as not regressed
#[test]
fn test_random_noise_rarely_flags_regression() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let trials = 100;

    let not_regressed = (0..trials)
        .filter(|_| {
            let series: Vec<f64> = (0..40).map(|_| rng.gen_range(90.0..110.0)).collect();
            !is_regression(&series, 6, 0.05).unwrap()
        })
        .count();

    assert!(
        not_regressed as f64 / trials as f64 >= 0.9,
        "only {} of {} noise histories were stable",
        not_regressed,
        trials
    );
}

/// Scenario: perfectly flat history
/// Expected: not regressed, no t-test needed
#[test]
fn test_flat_history_is_stable() {
    let detection = detect(&[42.0; 24], 6, 0.05).unwrap();
    assert!(!detection.regressed);
    assert!(detection.t_test.is_none());
}

/// Scenario: the floor is 10 + window size samples
/// Expected: one sample short is skipped, exactly at the floor is analyzed
#[test]
fn test_minimum_data_floor_boundary() {
    for window_size in [2, 6, 10] {
        let analyzer = BenchmarkAnalyzer::new(config(window_size, 0));
        let floor = MIN_HISTORY_SAMPLES + window_size;

        let short = BenchmarkSeries::new("short", vec![1.0; floor - 1]);
        assert!(analyzer.analyze(&short).unwrap().is_none());

        let exact = BenchmarkSeries::new("exact", vec![1.0; floor]);
        let result = analyzer.analyze(&exact).unwrap();
        assert!(result.is_some(), "window {} at floor should be analyzed", window_size);
    }
}

/// Scenario: noisy latency history, then a 30% slowdown for the last 6 builds
/// Expected: slowdown located inside the window
#[test]
fn test_noisy_history_with_slowdown() {
    let samples: Vec<f64> = (0..36)
        .map(|i| (if i < 30 { 100.0 } else { 130.0 }) + jitter(i))
        .collect();

    let mut set = BenchmarkSet::new();
    set.insert("BM_parse/1024".to_string(), samples);

    let results = analyze_all(&set, &config(6, 9)).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_slowdown());
    assert!(results[0].builds_since_step().unwrap() <= 8);
}

/// Scenario: a single spike deep in the history
/// Expected: smoothing and the rank test absorb it, no regression
#[test]
fn test_historical_spike_ignored() {
    let mut samples: Vec<f64> = (0..36).map(|i| 100.0 + jitter(i)).collect();
    samples[20] = 300.0;

    let analyzer = BenchmarkAnalyzer::new(config(6, 9));
    let result = analyzer
        .analyze(&BenchmarkSeries::new("spiky", samples))
        .unwrap()
        .unwrap();

    assert_eq!(result.state(), BenchmarkState::NotRegressed);
    assert!(result.detection.step.is_none());
}

/// Scenario: every kernel over a noisy series
/// Expected: output is finite and the mirrored padding keeps the level
#[test]
fn test_smoothing_boundary_safety() {
    let samples: Vec<f64> = (0..25).map(|i| 50.0 + jitter(i)).collect();
    for kernel in Kernel::ALL {
        for window_len in [3, 5, 9, 25] {
            let smoothed = smooth(&samples, window_len, kernel).unwrap();
            assert_eq!(smoothed.len(), samples.len() + window_len - 1);
            assert!(smoothed.iter().all(|v| v.is_finite()));
            assert!(smoothed.iter().all(|v| (47.0..=53.0).contains(v)));
        }
    }
}

/// Scenario: mixed benchmark set in the order files introduced them
/// Expected: output order matches input order, short series dropped
#[test]
fn test_batch_order_and_skips() {
    let mut set = BenchmarkSet::new();
    set.insert("BM_second_seen_first".to_string(), vec![3.0; 20]);
    set.insert("BM_new".to_string(), vec![3.0; 4]);
    set.insert("BM_alpha".to_string(), vec![3.0; 20]);

    let results = analyze_all(&set, &AnalysisConfig::default()).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["BM_second_seen_first", "BM_alpha"]);
}
