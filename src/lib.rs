//! # Hold-out Regression
//!
//! Fits an ordinary least squares model on the rows of a time-indexed table
//! up to a split date and reports the mean squared error on the rows from
//! that date on.
//!
//! ## Modules
//!
//! - `data` - Time-indexed frames, target separation, chronological split
//! - `models` - OLS linear regression
//! - `metrics` - Regression metrics
//! - `evaluation` - The hold-out evaluator
//! - `config` - TOML configuration
//! - `logging` - `tracing` subscriber setup

pub mod config;
pub mod data;
pub mod evaluation;
pub mod logging;
pub mod metrics;
pub mod models;

pub use config::{Config, EvaluationConfig};
pub use data::{Dataset, Frame, FrameError, SplitRule};
pub use evaluation::{evaluate, run_model, EvaluationError, EvaluationReport, Evaluator};
pub use metrics::regression::RegressionMetrics;
pub use models::linear::{LinearRegression, RankDeficiency};

/// Commonly used types
pub mod prelude {
    pub use crate::config::EvaluationConfig;
    pub use crate::data::{ChronologicalSplit, Dataset, Frame, FrameError, SplitRule};
    pub use crate::evaluation::{
        evaluate, run_model, EvaluationError, EvaluationReport, Evaluator,
    };
}
