//! Ordinary Least Squares linear regression
//!
//! The model is fitted by centering the design, solving the normal
//! equations of the centered problem with a Cholesky factorisation, and
//! recovering the intercept from the column means. Columns are scaled to
//! unit norm before factorising, so the rank check does not depend on the
//! units of the features.
//!
//! Rank-deficient designs are rejected by default. With
//! [`RankDeficiency::MinimumNorm`] they fall back to the minimum-norm
//! least-squares solution through the pseudoinverse of X'X.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Pivots at or below this fraction of their own diagonal entry are treated
/// as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Eigenvalues at or below this fraction of the largest one are dropped
/// from the pseudoinverse.
const PINV_TOLERANCE: f64 = 1e-12;

const MAX_JACOBI_SWEEPS: usize = 100;

/// What to do when the training design has no unique least-squares solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDeficiency {
    /// Fail with [`LinearRegressionError::SingularMatrix`]
    #[default]
    Error,
    /// Use the minimum-norm solution
    MinimumNorm,
}

/// Errors that can occur during linear regression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearRegressionError {
    #[error("Cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("Training design is rank-deficient (pivot {pivot} at column {column})")]
    SingularMatrix { column: usize, pivot: f64 },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Model has not been fitted yet")]
    NotFitted,
}

/// Linear Regression model using Ordinary Least Squares
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Coefficients (weights) for each feature
    pub coefficients: Option<Array1<f64>>,
    /// Intercept (bias) term
    pub intercept: Option<f64>,
    /// Whether to fit an intercept
    fit_intercept: bool,
    /// R-squared on the training data, `None` when the target is constant
    pub r_squared: Option<f64>,
    /// Feature names
    pub feature_names: Option<Vec<String>>,
    /// Handling of rank-deficient designs
    rank_deficiency: RankDeficiency,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LinearRegression {
    /// Create a new LinearRegression model
    ///
    /// # Arguments
    /// * `fit_intercept` - Whether to calculate the intercept
    pub fn new(fit_intercept: bool) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept,
            r_squared: None,
            feature_names: None,
            rank_deficiency: RankDeficiency::Error,
        }
    }

    pub fn with_rank_deficiency(mut self, rank_deficiency: RankDeficiency) -> Self {
        self.rank_deficiency = rank_deficiency;
        self
    }

    /// Set feature names for interpretation
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit the model using Ordinary Least Squares
    ///
    /// Solves (Xc'Xc) β = Xc'yc where Xc, yc are centered on their training
    /// means when an intercept is fitted.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), LinearRegressionError> {
        if x.nrows() != y.len() {
            return Err(LinearRegressionError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(LinearRegressionError::EmptyTrainingSet);
        }

        let (x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or(LinearRegressionError::EmptyTrainingSet)?;
            let y_mean = y.mean().ok_or(LinearRegressionError::EmptyTrainingSet)?;
            (x_mean, y_mean)
        } else {
            (Array1::zeros(x.ncols()), 0.0)
        };

        let xc = x - &x_mean;
        let yc = y - y_mean;

        // Normal equations of the centered design
        let xtx = xc.t().dot(&xc);
        let xty = xc.t().dot(&yc);

        let beta = match solve_unit_scaled(&xtx, &xty) {
            Ok(beta) => beta,
            Err(LinearRegressionError::SingularMatrix { column, pivot })
                if self.rank_deficiency == RankDeficiency::MinimumNorm =>
            {
                warn!(column, pivot, "rank-deficient design, using minimum-norm solution");
                pseudoinverse_solve(&xtx, &xty)
            }
            Err(e) => return Err(e),
        };
        let intercept = y_mean - x_mean.dot(&beta);

        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            intercept,
            "fitted OLS model"
        );

        self.coefficients = Some(beta);
        self.intercept = Some(intercept);

        // Calculate R-squared
        let predictions = self.predict(x)?;
        let full_mean = y.mean().unwrap_or(0.0);
        let ss_tot: f64 = y.iter().map(|&yi| (yi - full_mean).powi(2)).sum();
        let ss_res: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&yi, &pi)| (yi - pi).powi(2))
            .sum();

        self.r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, LinearRegressionError> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(LinearRegressionError::NotFitted)?;
        let intercept = self.intercept.ok_or(LinearRegressionError::NotFitted)?;

        if x.ncols() != coefficients.len() {
            return Err(LinearRegressionError::DimensionMismatch {
                expected: coefficients.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(coefficients) + intercept)
    }

    /// Get model summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str("Linear Regression Summary\n");
        s.push_str("=========================\n\n");

        if let Some(ref coef) = self.coefficients {
            s.push_str(&format!("Intercept: {:.6}\n\n", self.intercept.unwrap_or(0.0)));
            s.push_str("Coefficients:\n");

            if let Some(ref names) = self.feature_names {
                for (i, (name, &c)) in names.iter().zip(coef.iter()).enumerate() {
                    s.push_str(&format!("  {:3}. {:20}: {:>12.6}\n", i + 1, name, c));
                }
            } else {
                for (i, &c) in coef.iter().enumerate() {
                    s.push_str(&format!("  {:3}. Feature {:2}: {:>12.6}\n", i + 1, i, c));
                }
            }

            match self.r_squared {
                Some(r2) => s.push_str(&format!("\nR-squared (train): {:.6}\n", r2)),
                None => s.push_str("\nR-squared (train): n/a (constant target)\n"),
            }
        } else {
            s.push_str("Model not fitted yet.\n");
        }

        s
    }
}

/// Solve the normal equations X'X β = X'y after scaling every column of X
/// to unit norm, so that X'X becomes a correlation-like matrix
fn solve_unit_scaled(
    xtx: &Array2<f64>,
    xty: &Array1<f64>,
) -> Result<Array1<f64>, LinearRegressionError> {
    let norms = xtx.diag().mapv(f64::sqrt);

    if let Some(column) = norms.iter().position(|&n| n <= 0.0) {
        return Err(LinearRegressionError::SingularMatrix { column, pivot: 0.0 });
    }

    let outer = norms
        .view()
        .insert_axis(Axis(1))
        .dot(&norms.view().insert_axis(Axis(0)));
    let scaled = xtx / &outer;
    let beta = cholesky_solve(&scaled, &(xty / &norms))?;

    Ok(beta / &norms)
}

/// Solve A x = b for symmetric positive definite A via A = L L'
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, LinearRegressionError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= a[[i, i]] * RANK_TOLERANCE {
                    return Err(LinearRegressionError::SingularMatrix {
                        column: i,
                        pivot: diag,
                    });
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(x)
}

/// Minimum-norm solution of A x = b for symmetric positive semi-definite A:
/// x = V Λ⁺ V' b, dropping eigenvalues that are numerically zero
fn pseudoinverse_solve(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let (eigenvalues, eigenvectors) = symmetric_eigen(a);
    let largest = eigenvalues.iter().cloned().fold(0.0_f64, f64::max);

    let mut x = Array1::<f64>::zeros(a.nrows());
    for (k, &lambda) in eigenvalues.iter().enumerate() {
        if lambda <= largest * PINV_TOLERANCE || lambda <= 0.0 {
            continue;
        }
        let v = eigenvectors.column(k);
        x = x + &v * (v.dot(b) / lambda);
    }

    x
}

/// Eigen decomposition of a symmetric matrix by cyclic Jacobi rotations
///
/// Returns the eigenvalues and a matrix whose columns are the matching
/// eigenvectors.
fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut m = a.clone();
    let mut v = Array2::<f64>::eye(n);
    let frobenius = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += m[[p, q]] * m[[p, q]];
            }
        }
        if off.sqrt() <= f64::EPSILON * frobenius {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // M <- M J
                for k in 0..n {
                    let (mkp, mkq) = (m[[k, p]], m[[k, q]]);
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                // M <- J' M
                for k in 0..n {
                    let (mpk, mqk) = (m[[p, k]], m[[q, k]]);
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                // V <- V J
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (m.diag().to_owned(), v)
}
