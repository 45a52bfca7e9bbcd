//! Mean vector, sample covariance and the weighted portfolio algebra.

use crate::core::error::AnalysisError;
use crate::core::returns::ReturnTable;
use tracing::debug;

/// Quadratic forms this far below zero are treated as rounding noise.
pub const NEGATIVE_VARIANCE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    /// Weighted mean daily return.
    pub expected_return: f64,
    /// Daily standard deviation of the weighted portfolio.
    pub risk: f64,
    pub mean_vector: Vec<f64>,
    pub covariance_matrix: Vec<Vec<f64>>,
}

impl PortfolioResult {
    pub fn variance(&self) -> f64 {
        self.risk * self.risk
    }

    /// Per-instrument daily standard deviations, from the covariance diagonal.
    pub fn std_devs(&self) -> Vec<f64> {
        self.covariance_matrix
            .iter()
            .enumerate()
            .map(|(i, row)| row[i].max(0.0).sqrt())
            .collect()
    }
}

pub fn mean_vector(returns: &ReturnTable) -> Vec<f64> {
    returns
        .columns
        .iter()
        .map(|col| col.iter().sum::<f64>() / col.len() as f64)
        .collect()
}

/// Sample (n - 1) covariance over the shared row set of `returns`.
pub fn covariance_matrix(returns: &ReturnTable, means: &[f64]) -> Vec<Vec<f64>> {
    let n = returns.columns.len();
    let denom = returns.rows() as f64 - 1.0;
    let mut cov = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xi, xj) = (&returns.columns[i], &returns.columns[j]);
            let sum: f64 = xi
                .iter()
                .zip(xj)
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum();
            cov[i][j] = sum / denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `w^T C w`.
pub fn quadratic_form(cov: &[Vec<f64>], weights: &[f64]) -> f64 {
    cov.iter()
        .zip(weights)
        .map(|(row, w)| w * dot(row, weights))
        .sum()
}

/// Standard deviation from a portfolio variance, clamping rounding noise to zero.
fn portfolio_risk(variance: f64) -> Result<f64, AnalysisError> {
    if variance < -NEGATIVE_VARIANCE_TOLERANCE || variance.is_nan() {
        return Err(AnalysisError::NegativeVariance(variance));
    }
    Ok(variance.max(0.0).sqrt())
}

pub fn summarize(returns: &ReturnTable, weights: &[f64]) -> Result<PortfolioResult, AnalysisError> {
    if weights.len() != returns.columns.len() {
        return Err(AnalysisError::WeightCountMismatch {
            instruments: returns.columns.len(),
            weights: weights.len(),
        });
    }
    if returns.rows() < 2 {
        return Err(AnalysisError::InsufficientData {
            rows: returns.rows(),
        });
    }

    let means = mean_vector(returns);
    let cov = covariance_matrix(returns, &means);

    let risk = portfolio_risk(quadratic_form(&cov, weights))?;
    let expected_return = dot(weights, &means);

    debug!(
        rows = returns.rows(),
        expected_return, risk, "Summarized portfolio"
    );
    Ok(PortfolioResult {
        expected_return,
        risk,
        mean_vector: means,
        covariance_matrix: cov,
    })
}
