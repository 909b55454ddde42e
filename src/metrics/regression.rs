//! Regression metrics for evaluating model performance
//!
//! Every metric validates its inputs: an empty or misaligned pair of
//! vectors is an error, never a NaN.

use ndarray::Array1;
use thiserror::Error;

/// Errors raised while scoring predictions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Cannot score an empty set of predictions")]
    Empty,

    #[error("Length mismatch: {truth} true values, {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },
}

fn check_inputs(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<usize, MetricsError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricsError::LengthMismatch {
            truth: y_true.len(),
            predicted: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(y_true.len())
}

/// Mean Squared Error: (1/n) * Σ(y_true - y_pred)²
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, MetricsError> {
    let n = check_inputs(y_true, y_pred)? as f64;
    Ok(y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum::<f64>()
        / n)
}

/// Mean Absolute Error: (1/n) * Σ|y_true - y_pred|
pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, MetricsError> {
    let n = check_inputs(y_true, y_pred)? as f64;
    Ok(y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum::<f64>()
        / n)
}

/// R-squared (coefficient of determination), `None` for a constant target
pub fn r_squared(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Option<f64>, MetricsError> {
    check_inputs(y_true, y_pred)?;
    let y_mean = y_true.mean().unwrap_or(0.0);

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|&t| (t - y_mean).powi(2)).sum();

    if ss_tot < 1e-10 {
        return Ok(None);
    }

    Ok(Some(1.0 - ss_res / ss_tot))
}

/// Collection of regression metrics on a hold-out set
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared (coefficient of determination)
    pub r2: Option<f64>,
    /// Number of samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Calculate all regression metrics
    pub fn calculate(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self, MetricsError> {
        let mse = mean_squared_error(y_true, y_pred)?;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mean_absolute_error(y_true, y_pred)?,
            r2: r_squared(y_true, y_pred)?,
            n_samples: y_true.len(),
        })
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        let mut s = String::new();
        s.push_str("Regression Metrics Report\n");
        s.push_str("=========================\n\n");
        s.push_str(&format!("Samples:     {}\n\n", self.n_samples));
        s.push_str("Error Metrics:\n");
        s.push_str(&format!("  MSE:       {:.6}\n", self.mse));
        s.push_str(&format!("  RMSE:      {:.6}\n", self.rmse));
        s.push_str(&format!("  MAE:       {:.6}\n", self.mae));
        s.push_str("\nGoodness of Fit:\n");
        match self.r2 {
            Some(r2) => s.push_str(&format!("  R²:        {:.6}\n", r2)),
            None => s.push_str("  R²:        n/a\n"),
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse() {
        let y_true = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y_pred = Array1::from_vec(vec![1.0, 3.0, 1.0, 4.0]);

        // (0 + 1 + 4 + 0) / 4
        let mse = mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((mse - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_mse_perfect() {
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(mean_squared_error(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_empty_is_error() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(mean_squared_error(&empty, &empty), Err(MetricsError::Empty));
    }

    #[test]
    fn test_mse_length_mismatch() {
        let a = Array1::from_vec(vec![1.0, 2.0]);
        let b = Array1::from_vec(vec![1.0]);
        assert_eq!(
            mean_squared_error(&a, &b),
            Err(MetricsError::LengthMismatch { truth: 2, predicted: 1 })
        );
    }

    #[test]
    fn test_r_squared_perfect() {
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let r2 = r_squared(&y, &y).unwrap().unwrap();
        assert!((r2 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_r_squared_constant_target() {
        let y = Array1::from_vec(vec![2.0, 2.0, 2.0]);
        let p = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(r_squared(&y, &p).unwrap(), None);
    }

    #[test]
    fn test_calculate() {
        let y_true = Array1::from_vec(vec![3.0, -0.5, 2.0, 7.0]);
        let y_pred = Array1::from_vec(vec![2.5, 0.0, 2.0, 8.0]);

        let m = RegressionMetrics::calculate(&y_true, &y_pred).unwrap();
        assert!((m.mse - 0.375).abs() < 1e-12);
        assert!((m.rmse - 0.375_f64.sqrt()).abs() < 1e-12);
        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.r2.unwrap() - 0.948_608_137_044_967_9).abs() < 1e-9);
        assert_eq!(m.n_samples, 4);
        assert!(m.report().contains("MSE:       0.375000"));
    }
}
