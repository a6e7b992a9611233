//! Multiple testing correction over batches with undetermined entries.

pub mod bh;
pub mod bonferroni;

pub use bh::correct_bh;
pub use bonferroni::correct_bonferroni;

use crate::error::{MetaboError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Significance level the corrections are reported at.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Multiple-testing correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionMethod {
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "bonferroni")]
    Bonferroni,
    #[serde(rename = "benjamini-hochberg", alias = "fdr_bh")]
    BenjaminiHochberg,
}

impl CorrectionMethod {
    /// Name used in column headers and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bonferroni => "bonferroni",
            Self::BenjaminiHochberg => "benjamini-hochberg",
        }
    }
}

impl FromStr for CorrectionMethod {
    type Err = MetaboError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "bonferroni" => Ok(Self::Bonferroni),
            "benjamini-hochberg" | "fdr_bh" | "bh" => Ok(Self::BenjaminiHochberg),
            other => Err(MetaboError::InvalidParameter(format!(
                "Unknown correction method '{}'",
                other
            ))),
        }
    }
}

/// Correct a batch of p-values, leaving NaN entries in place.
///
/// Only the determined entries are corrected, jointly, and scattered back to
/// their positions. With [`CorrectionMethod::None`] the input is returned
/// unchanged.
///
/// # Errors
/// `InvalidParameter` if a determined value lies outside [0, 1].
pub fn correct(p_values: &[f64], method: CorrectionMethod) -> Result<Vec<f64>> {
    if let Some(bad) = p_values
        .iter()
        .find(|p| !p.is_nan() && !(0.0..=1.0).contains(*p))
    {
        return Err(MetaboError::InvalidParameter(format!(
            "p-value {} outside [0, 1]",
            bad
        )));
    }

    let valid_idx: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    let valid: Vec<f64> = valid_idx.iter().map(|&i| p_values[i]).collect();

    let adjusted = match method {
        CorrectionMethod::None => valid,
        CorrectionMethod::Bonferroni => correct_bonferroni(&valid),
        CorrectionMethod::BenjaminiHochberg => correct_bh(&valid),
    };

    let mut out = vec![f64::NAN; p_values.len()];
    for (&i, q) in valid_idx.iter().zip(adjusted) {
        out[i] = q;
    }
    Ok(out)
}
