//! Chronological hold-out evaluation
//!
//! Drops the target column from a [`Frame`], splits rows at a calendar
//! date, fits OLS on the earlier rows and scores the later rows by mean
//! squared error.

use crate::config::EvaluationConfig;
use crate::data::{Dataset, Frame, FrameError, SplitRule};
use crate::metrics::regression::{MetricsError, RegressionMetrics};
use crate::models::linear::{LinearRegression, LinearRegressionError};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by an evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Invalid input: {0}")]
    Input(#[from] FrameError),

    #[error("Fitting failed: {0}")]
    Fitting(#[from] LinearRegressionError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] MetricsError),
}

/// Row count and time span of one partition
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionInfo {
    pub n_samples: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl PartitionInfo {
    fn of(dataset: &Dataset) -> Self {
        let range = dataset.time_range();
        Self {
            n_samples: dataset.n_samples(),
            first: range.map(|(first, _)| first),
            last: range.map(|(_, last)| last),
        }
    }
}

/// Everything an evaluation produced besides the score
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Mean squared error on the test partition
    pub mse: f64,
    pub threshold: NaiveDateTime,
    pub rule: SplitRule,
    pub train: PartitionInfo,
    pub test: PartitionInfo,
    /// Rows that ended up in both partitions
    pub shared_rows: usize,
    /// `(feature name, coefficient)` in feature order
    pub coefficients: Vec<(String, f64)>,
    pub intercept: f64,
    /// Training R-squared, `None` for a constant training target
    pub train_r2: Option<f64>,
    pub metrics: RegressionMetrics,
    /// Predictions aligned with the test partition
    pub predictions: Vec<f64>,
}

impl EvaluationReport {
    pub fn summary(&self) -> String {
        let fmt_ts = |t: Option<NaiveDateTime>| t.map_or_else(|| "-".to_string(), |t| t.to_string());

        let mut s = String::new();
        s.push_str("Hold-out Evaluation\n");
        s.push_str("===================\n\n");
        s.push_str(&format!("Threshold:   {} ({})\n", self.threshold, self.rule));
        s.push_str(&format!(
            "Train:       {:>6} rows  {} .. {}\n",
            self.train.n_samples,
            fmt_ts(self.train.first),
            fmt_ts(self.train.last)
        ));
        s.push_str(&format!(
            "Test:        {:>6} rows  {} .. {}\n",
            self.test.n_samples,
            fmt_ts(self.test.first),
            fmt_ts(self.test.last)
        ));
        if self.shared_rows > 0 {
            s.push_str(&format!("Shared:      {:>6} rows\n", self.shared_rows));
        }
        s.push_str(&format!("\nIntercept:   {:.6}\n", self.intercept));
        for (name, c) in &self.coefficients {
            s.push_str(&format!("  {:20}: {:>12.6}\n", name, c));
        }
        s.push('\n');
        s.push_str(&self.metrics.report());
        s
    }
}

/// Fits and scores a fresh OLS model per call
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Mean squared error of the hold-out partition
    pub fn evaluate(&self, frame: &Frame) -> Result<f64, EvaluationError> {
        self.evaluate_report(frame).map(|report| report.mse)
    }

    /// Run the full evaluation and keep the intermediate results
    pub fn evaluate_report(&self, frame: &Frame) -> Result<EvaluationReport, EvaluationError> {
        let dataset = Dataset::from_frame(frame, &self.config.target_field)?;
        let threshold = self.config.threshold();
        let split = dataset.split_at(threshold, self.config.split_rule);

        debug!(
            %threshold,
            rule = %split.rule,
            train = split.train.n_samples(),
            test = split.test.n_samples(),
            "split dataset"
        );

        let shared_rows = split.shared_rows();
        if shared_rows > 0 {
            warn!(
                shared_rows,
                %threshold,
                "boundary rows are in both training and test partitions"
            );
        }

        if split.test.n_samples() == 0 {
            return Err(MetricsError::Empty.into());
        }

        let mut model = LinearRegression::new(true)
            .with_feature_names(split.train.feature_names.clone())
            .with_rank_deficiency(self.config.rank_deficiency);
        model.fit(&split.train.x, &split.train.y)?;

        let predictions = model.predict(&split.test.x)?;
        let metrics = RegressionMetrics::calculate(&split.test.y, &predictions)?;

        let coefficients = match model.coefficients.as_ref() {
            Some(coef) => split
                .train
                .feature_names
                .iter()
                .cloned()
                .zip(coef.iter().copied())
                .collect(),
            None => Vec::new(),
        };
        let intercept = model.intercept.unwrap_or(0.0);

        debug!(intercept, ?coefficients, "fitted coefficients");
        info!(mse = metrics.mse, n_test = metrics.n_samples, "hold-out score");

        Ok(EvaluationReport {
            mse: metrics.mse,
            threshold,
            rule: split.rule,
            train: PartitionInfo::of(&split.train),
            test: PartitionInfo::of(&split.test),
            shared_rows,
            coefficients,
            intercept,
            train_r2: model.r_squared,
            predictions: predictions.to_vec(),
            metrics,
        })
    }
}

/// Evaluate `frame` under `config`
pub fn evaluate(frame: &Frame, config: &EvaluationConfig) -> Result<f64, EvaluationError> {
    Evaluator::new(config.clone()).evaluate(frame)
}

/// Evaluate with the default target (`cnt`) and split date (2012-07-01)
pub fn run_model(frame: &Frame) -> Result<f64, EvaluationError> {
    Evaluator::default().evaluate(frame)
}
