//! Preparing frames for regression
//!
//! This module separates a [`Frame`] into a feature matrix and a target
//! vector, and splits the result chronologically around a threshold.

use super::frame::{Frame, FrameError};
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How rows exactly at the threshold are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitRule {
    /// Train on `t <= threshold`, test on `t >= threshold`.
    ///
    /// Rows stamped exactly at the threshold land in both partitions. This
    /// mirrors label-based slicing on both ends and is kept as the default,
    /// although it leaks the boundary rows from training into the test set.
    #[default]
    Inclusive,
    /// Train on `t < threshold`, test on `t >= threshold`.
    Disjoint,
}

impl SplitRule {
    fn in_train(self, t: NaiveDateTime, threshold: NaiveDateTime) -> bool {
        match self {
            SplitRule::Inclusive => t <= threshold,
            SplitRule::Disjoint => t < threshold,
        }
    }

    fn in_test(self, t: NaiveDateTime, threshold: NaiveDateTime) -> bool {
        t >= threshold
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitRule::Inclusive => write!(f, "inclusive"),
            SplitRule::Disjoint => write!(f, "disjoint"),
        }
    }
}

/// Feature matrix and target vector, row-aligned with their timestamps
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub x: Array2<f64>,
    /// Target vector (n_samples)
    pub y: Array1<f64>,
    /// Feature names
    pub feature_names: Vec<String>,
    /// Timestamps for each sample
    pub timestamps: Vec<NaiveDateTime>,
}

/// Training and test partitions produced by [`Dataset::split_at`]
#[derive(Debug, Clone)]
pub struct ChronologicalSplit {
    pub train: Dataset,
    pub test: Dataset,
    pub threshold: NaiveDateTime,
    pub rule: SplitRule,
}

impl ChronologicalSplit {
    /// Number of rows present in both partitions
    pub fn shared_rows(&self) -> usize {
        match self.rule {
            SplitRule::Inclusive => self
                .test
                .timestamps
                .iter()
                .take_while(|&&t| t == self.threshold)
                .count(),
            SplitRule::Disjoint => 0,
        }
    }
}

impl Dataset {
    /// Create a new dataset
    pub fn new(
        x: Array2<f64>,
        y: Array1<f64>,
        feature_names: Vec<String>,
        timestamps: Vec<NaiveDateTime>,
    ) -> Self {
        Self {
            x,
            y,
            feature_names,
            timestamps,
        }
    }

    /// Copy a frame into features (every column but `target`) and target
    ///
    /// The frame itself is left untouched. Feature columns keep their
    /// original order.
    pub fn from_frame(frame: &Frame, target: &str) -> Result<Self, FrameError> {
        if frame.is_empty() {
            return Err(FrameError::Empty);
        }

        let target_idx = frame
            .column_position(target)
            .ok_or_else(|| FrameError::MissingColumn(target.to_string()))?;

        let feature_idx: Vec<usize> = (0..frame.columns().len())
            .filter(|&j| j != target_idx)
            .collect();

        let x = frame.values().select(Axis(1), &feature_idx);
        let y = frame.values().column(target_idx).to_owned();
        let feature_names = feature_idx
            .iter()
            .map(|&j| frame.columns()[j].clone())
            .collect();

        Ok(Self::new(x, y, feature_names, frame.index().to_vec()))
    }

    /// Get number of samples
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// First and last timestamp, if any
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((*self.timestamps.first()?, *self.timestamps.last()?))
    }

    /// Keep only the given rows, in the given order
    fn select_rows(&self, rows: &[usize]) -> Dataset {
        Dataset::new(
            self.x.select(Axis(0), rows),
            self.y.select(Axis(0), rows),
            self.feature_names.clone(),
            rows.iter().map(|&i| self.timestamps[i]).collect(),
        )
    }

    /// Split features and target in lockstep around `threshold`
    ///
    /// Either partition may come back empty; callers decide whether that is
    /// an error.
    pub fn split_at(&self, threshold: NaiveDateTime, rule: SplitRule) -> ChronologicalSplit {
        let train_rows: Vec<usize> = (0..self.n_samples())
            .filter(|&i| rule.in_train(self.timestamps[i], threshold))
            .collect();
        let test_rows: Vec<usize> = (0..self.n_samples())
            .filter(|&i| rule.in_test(self.timestamps[i], threshold))
            .collect();

        ChronologicalSplit {
            train: self.select_rows(&train_rows),
            test: self.select_rows(&test_rows),
            threshold,
            rule,
        }
    }
}
