//! Model evaluation metrics

pub mod regression;

pub use regression::{mean_squared_error, MetricsError, RegressionMetrics};
