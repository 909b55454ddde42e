//! Integration tests for chronological hold-out evaluation

use chrono::{NaiveDate, NaiveDateTime};
use holdout_regression::data::synthetic::{generate_daily_rentals, SyntheticConfig};
use holdout_regression::metrics::MetricsError;
use holdout_regression::models::{LinearRegression, RankDeficiency};
use holdout_regression::prelude::*;
use ndarray::{Array1, Array2};

fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Five daily rows around 2012-07-01
fn five_day_frame() -> Frame {
    Frame::from_columns(
        vec![
            ts(2012, 6, 29),
            ts(2012, 6, 30),
            ts(2012, 7, 1),
            ts(2012, 7, 2),
            ts(2012, 7, 3),
        ],
        vec![
            ("cnt", vec![10.0, 12.0, 9.0, 15.0, 20.0]),
            ("temp", vec![0.5, 0.52, 0.48, 0.6, 0.65]),
        ],
    )
    .unwrap()
}

#[test]
fn test_five_day_partition_membership() {
    let frame = five_day_frame();
    let config = EvaluationConfig::default();
    let dataset = Dataset::from_frame(&frame, &config.target_field).unwrap();
    let split = dataset.split_at(config.threshold(), config.split_rule);

    assert_eq!(
        split.train.timestamps,
        vec![ts(2012, 6, 29), ts(2012, 6, 30), ts(2012, 7, 1)]
    );
    assert_eq!(
        split.test.timestamps,
        vec![ts(2012, 7, 1), ts(2012, 7, 2), ts(2012, 7, 3)]
    );
    assert_eq!(split.train.y.to_vec(), vec![10.0, 12.0, 9.0]);
    assert_eq!(split.test.y.to_vec(), vec![9.0, 15.0, 20.0]);
    assert_eq!(split.train.feature_names, vec!["temp".to_string()]);
}

#[test]
fn test_five_day_score_matches_manual_fit() {
    let frame = five_day_frame();

    // Fit by hand on the three training rows
    let x_train = Array2::from_shape_vec((3, 1), vec![0.5, 0.52, 0.48]).unwrap();
    let y_train = Array1::from_vec(vec![10.0, 12.0, 9.0]);
    let mut model = LinearRegression::default();
    model.fit(&x_train, &y_train).unwrap();

    // slope = cov / var on the training rows
    let slope = model.coefficients.as_ref().unwrap()[0];
    assert!((slope - 75.0).abs() < 1e-6);

    let x_test = Array2::from_shape_vec((3, 1), vec![0.48, 0.6, 0.65]).unwrap();
    let y_test = [9.0, 15.0, 20.0];
    let pred = model.predict(&x_test).unwrap();
    let expected: f64 = y_test
        .iter()
        .zip(pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / 3.0;

    let score = run_model(&frame).unwrap();
    assert!((score - expected).abs() < 1e-9);
    assert!(score > 0.0);
}

#[test]
fn test_single_point_after_threshold() {
    let frame = Frame::from_columns(
        vec![
            ts(2012, 6, 1),
            ts(2012, 6, 10),
            ts(2012, 6, 20),
            ts(2012, 7, 15),
        ],
        vec![
            ("temp", vec![0.1, 0.2, 0.4, 0.5]),
            ("cnt", vec![1.0, 2.0, 2.5, 4.0]),
        ],
    )
    .unwrap();

    let report = Evaluator::default().evaluate_report(&frame).unwrap();
    assert_eq!(report.test.n_samples, 1);
    assert_eq!(report.test.first, Some(ts(2012, 7, 15)));
    assert_eq!(report.train.n_samples, 3);
    assert_eq!(report.shared_rows, 0);
}

#[test]
fn test_boundary_row_in_both_partitions() {
    let frame = Frame::from_columns(
        vec![ts(2012, 6, 30), ts(2012, 7, 1), ts(2012, 7, 1), ts(2012, 7, 2)],
        vec![
            ("temp", vec![0.1, 0.3, 0.35, 0.6]),
            ("cnt", vec![1.0, 2.0, 2.2, 3.0]),
        ],
    )
    .unwrap();
    let dataset = Dataset::from_frame(&frame, "cnt").unwrap();
    let threshold = ts(2012, 7, 1);

    let inclusive = dataset.split_at(threshold, SplitRule::Inclusive);
    assert_eq!(inclusive.train.n_samples(), 3);
    assert_eq!(inclusive.test.n_samples(), 3);
    assert_eq!(inclusive.shared_rows(), 2);
    assert_eq!(inclusive.train.timestamps[1..], inclusive.test.timestamps[..2]);

    let disjoint = dataset.split_at(threshold, SplitRule::Disjoint);
    assert_eq!(disjoint.train.timestamps, vec![ts(2012, 6, 30)]);
    assert_eq!(disjoint.test.n_samples(), 3);
}

#[test]
fn test_perfect_fit_scores_zero_for_any_threshold() {
    let index: Vec<_> = (0..20)
        .map(|i| ts(2012, 6, 20) + chrono::Duration::days(i))
        .collect();
    let temp: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64 / 10.0).collect();
    let cnt: Vec<f64> = temp.iter().map(|t| 2.0 * t + 3.0).collect();
    let frame = Frame::from_columns(index, vec![("temp", temp), ("cnt", cnt)]).unwrap();

    for day in [23, 26, 30] {
        for rule in [SplitRule::Inclusive, SplitRule::Disjoint] {
            let config = EvaluationConfig::default()
                .with_split_date(NaiveDate::from_ymd_opt(2012, 6, day).unwrap())
                .with_split_rule(rule);
            let score = evaluate(&frame, &config).unwrap();
            assert!(score >= 0.0);
            assert!(score < 1e-16, "score {} for day {} {}", score, day, rule);
        }
    }
}

#[test]
fn test_deterministic_and_non_negative() {
    let frame = generate_daily_rentals(&SyntheticConfig::default()).unwrap();
    let evaluator = Evaluator::default();

    let first = evaluator.evaluate(&frame).unwrap();
    let second = evaluator.evaluate(&frame).unwrap();

    assert_eq!(first.to_bits(), second.to_bits());
    assert!(first.is_finite());
    assert!(first >= 0.0);
}

#[test]
fn test_synthetic_report() {
    let frame = generate_daily_rentals(&SyntheticConfig::default()).unwrap();
    let report = Evaluator::default().evaluate_report(&frame).unwrap();

    // 2011-01-01 ..= 2012-07-01 and 2012-07-01 ..= 2012-12-31
    assert_eq!(report.train.n_samples, 548);
    assert_eq!(report.test.n_samples, 184);
    assert_eq!(report.shared_rows, 1);
    assert_eq!(report.predictions.len(), report.test.n_samples);

    let names: Vec<&str> = report.coefficients.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["temp", "hum", "windspeed"]);
    assert!(report.coefficients[0].1 > 0.0);
}

#[test]
fn test_no_rows_after_threshold_is_scoring_error() {
    let frame = Frame::from_columns(
        vec![ts(2011, 5, 1), ts(2011, 5, 2), ts(2011, 5, 3)],
        vec![("temp", vec![0.1, 0.2, 0.4]), ("cnt", vec![1.0, 2.0, 3.0])],
    )
    .unwrap();

    match run_model(&frame) {
        Err(EvaluationError::Scoring(MetricsError::Empty)) => {}
        other => panic!("expected scoring error, got {:?}", other),
    }
}

#[test]
fn test_rank_deficient_training_is_fitting_error() {
    // Duplicated feature column makes X'X singular
    let frame = Frame::from_columns(
        vec![ts(2012, 6, 1), ts(2012, 6, 2), ts(2012, 6, 3), ts(2012, 7, 2)],
        vec![
            ("a", vec![0.1, 0.2, 0.4, 0.5]),
            ("b", vec![0.1, 0.2, 0.4, 0.5]),
            ("cnt", vec![1.0, 2.0, 3.0, 4.0]),
        ],
    )
    .unwrap();

    assert!(matches!(
        run_model(&frame),
        Err(EvaluationError::Fitting(_))
    ));
}

#[test]
fn test_rank_deficient_training_with_minimum_norm() {
    let frame = Frame::from_columns(
        vec![ts(2012, 6, 1), ts(2012, 6, 2), ts(2012, 6, 3), ts(2012, 7, 2)],
        vec![
            ("a", vec![0.1, 0.2, 0.3, 0.5]),
            ("b", vec![0.1, 0.2, 0.3, 0.5]),
            ("cnt", vec![1.0, 2.0, 3.0, 5.0]),
        ],
    )
    .unwrap();
    let config = EvaluationConfig::default().with_rank_deficiency(RankDeficiency::MinimumNorm);

    let report = Evaluator::new(config).evaluate_report(&frame).unwrap();
    // cnt = 10 * a, weight split evenly across the duplicates
    assert!((report.coefficients[0].1 - 5.0).abs() < 1e-8);
    assert!((report.coefficients[1].1 - 5.0).abs() < 1e-8);
    assert!(report.mse < 1e-12);
}

#[test]
fn test_mixed_unit_features_fit_exactly() {
    // Counts in the thousands next to a feature of order 1e-4
    let index: Vec<_> = (0..20)
        .map(|i| ts(2012, 6, 20) + chrono::Duration::days(i))
        .collect();
    let registered: Vec<f64> = (0..20).map(|i| 1000.0 * i as f64).collect();
    let x: Vec<f64> = (0..20).map(|i| ((7 * i) % 11) as f64 * 1e-4).collect();
    let cnt: Vec<f64> = registered
        .iter()
        .zip(&x)
        .map(|(r, x)| 0.01 * r + 1e4 * x + 1.0)
        .collect();
    let frame = Frame::from_columns(
        index,
        vec![("registered", registered), ("x", x), ("cnt", cnt)],
    )
    .unwrap();

    let score = run_model(&frame).unwrap();
    assert!(score < 1e-12, "score {}", score);
}

#[test]
fn test_frame_is_not_mutated() {
    let frame = five_day_frame();
    let before = frame.clone();
    run_model(&frame).unwrap();
    assert_eq!(frame, before);
}
