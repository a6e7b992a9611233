//! Simple linear regression via OLS.

use crate::data::{
    MetaboliteTable, RegressionOutcome, RegressionRecord, RegressionSet, SampleGroups,
    VariableTable,
};
use crate::error::{MetaboError, Result};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Reason recorded when fewer than two complete pairs remain.
pub const INSUFFICIENT_POINTS: &str = "Insufficient valid data points";

/// Least-squares fit of one response on one predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Two-sided p-value for slope != 0.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    /// Number of complete pairs used.
    pub n: usize,
}

impl LinearFit {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }

    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
///
/// Positions where either value is missing are dropped from both sides.
/// The p-value is the two-sided t-test of the slope with n - 2 degrees of
/// freedom. With exactly two points the fit is exact: the standard error is
/// 0 and the p-value is 0, or 1 when both responses are equal.
///
/// # Arguments
/// * `y` - Response values (compound abundances)
/// * `x` - Predictor values (external variable)
///
/// # Errors
/// * `DimensionMismatch` if the inputs differ in length
/// * `InsufficientData` with fewer than two complete pairs
/// * `IdenticalPredictor` if all predictor values are equal
pub fn simple_linear_regression(y: &[f64], x: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(MetaboError::DimensionMismatch {
            expected: y.len(),
            actual: x.len(),
        });
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(xi, yi)| !xi.is_nan() && !yi.is_nan())
        .map(|(xi, yi)| (*xi, *yi))
        .unzip();

    let n = xs.len();
    if n < 2 {
        return Err(MetaboError::InsufficientData(format!(
            "{} complete pairs, at least 2 required",
            n
        )));
    }
    let nf = n as f64;

    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;
    let ssxm = xs.iter().map(|v| (v - x_mean).powi(2)).sum::<f64>() / nf;
    let ssym = ys.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / nf;
    let ssxym = xs
        .iter()
        .zip(&ys)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>()
        / nf;

    if ssxm == 0.0 {
        return Err(MetaboError::IdenticalPredictor);
    }

    // Coefficients: beta = (X'X)^-1 X'y with X = [1, x]
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
    let xtx_inv = (design.transpose() * &design)
        .try_inverse()
        .ok_or(MetaboError::IdenticalPredictor)?;
    let beta = xtx_inv * (design.transpose() * DVector::from_column_slice(&ys));
    let (intercept, slope) = (beta[0], beta[1]);

    let r_value = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let (p_value, std_err) = if n == 2 {
        (if ys[0] == ys[1] { 1.0 } else { 0.0 }, 0.0)
    } else {
        let df = nf - 2.0;
        let std_err = ((1.0 - r_value * r_value).max(0.0) * ssym / ssxm / df).sqrt();
        let p_value = if std_err > 0.0 {
            match StudentsT::new(0.0, 1.0, df) {
                Ok(t_dist) => (2.0 * t_dist.sf((slope / std_err).abs())).min(1.0),
                Err(_) => f64::NAN,
            }
        } else if slope != 0.0 {
            0.0
        } else {
            1.0
        };
        (p_value, std_err)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        p_value,
        std_err,
        n,
    })
}

/// Regress every compound on one external variable.
///
/// Samples are the grouped samples; values are aligned by sample name.
/// Compounds that cannot be fitted get a not-determined record instead of
/// failing the batch.
///
/// # Arguments
/// * `pool` - Normalized pool table
/// * `variables` - External variable table
/// * `variable` - Name of the predictor variable
/// * `groups` - Sample groups selecting the samples used
pub fn lingress_table(
    pool: &MetaboliteTable,
    variables: &VariableTable,
    variable: &str,
    groups: &SampleGroups,
) -> Result<RegressionSet> {
    let samples = groups.all_samples();
    let cols = pool.sample_indices(&samples)?;
    let x = variables.values_for(variable, &samples)?;

    let records = (0..pool.n_compounds())
        .into_par_iter()
        .map(|row| {
            let compound = pool.compounds()[row].clone();
            let outcome = match simple_linear_regression(&pool.values(row, &cols), &x) {
                Ok(fit) => RegressionOutcome::Fitted(fit),
                Err(MetaboError::InsufficientData(_)) => {
                    RegressionOutcome::NotDetermined(INSUFFICIENT_POINTS.to_string())
                }
                Err(e @ MetaboError::IdenticalPredictor) => {
                    RegressionOutcome::NotDetermined(e.to_string())
                }
                Err(e) => return Err(e),
            };
            Ok(RegressionRecord { compound, outcome })
        })
        .collect::<Result<Vec<_>>>()?;

    let n_fitted = records.iter().filter(|r| r.fit().is_some()).count();
    log::info!(
        "regressed {} compounds on '{}'; {} fitted",
        records.len(),
        variable,
        n_fitted
    );

    Ok(RegressionSet {
        variable: variable.to_string(),
        records,
    })
}
