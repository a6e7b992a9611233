//! Synthetic ratio rows between two compounds.

use crate::data::MetaboliteTable;
use crate::error::{MetaboError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Pathway class assigned to every ratio row.
pub const RATIO_CLASS: &str = "metabolite ratios";

/// A `numerator / denominator` pair of compound names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioSpec {
    pub numerator: String,
    pub denominator: String,
}

impl RatioSpec {
    pub fn new<N: Into<String>, D: Into<String>>(numerator: N, denominator: D) -> Self {
        Self {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    /// Compound name of the derived row.
    pub fn name(&self) -> String {
        format!("{} / {}", self.numerator, self.denominator)
    }
}

fn single_row(table: &MetaboliteTable, compound: &str) -> Result<Option<usize>> {
    match table.compound_rows(compound).as_slice() {
        [] => Ok(None),
        [row] => Ok(Some(*row)),
        rows => Err(MetaboError::MultipleRows {
            compound: compound.to_string(),
            found: rows.len(),
        }),
    }
}

/// Derive one ratio row per spec, in spec order.
///
/// Specs naming an absent compound are skipped. Where the denominator is 0
/// the ratio is 0. Rows carry the [`RATIO_CLASS`] pathway class.
///
/// # Errors
/// `MultipleRows` if a named compound occurs on more than one row.
pub fn compile_ratios(table: &MetaboliteTable, specs: &[RatioSpec]) -> Result<MetaboliteTable> {
    let mut names = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for spec in specs {
        let numerator = single_row(table, &spec.numerator)?;
        let denominator = single_row(table, &spec.denominator)?;
        let (num_row, den_row) = match (numerator, denominator) {
            (Some(n), Some(d)) => (n, d),
            _ => {
                log::info!("skipping ratio '{}': compound not present", spec.name());
                continue;
            }
        };
        names.push(spec.name());
        for col in 0..table.n_samples() {
            let den = table.get(den_row, col);
            values.push(if den == 0.0 {
                0.0
            } else {
                table.get(num_row, col) / den
            });
        }
    }

    let data = DMatrix::from_row_slice(names.len(), table.n_samples(), &values);
    let n = names.len();
    MetaboliteTable::new(data, names, table.sample_ids().to_vec())?
        .with_pathway_classes(vec![RATIO_CLASS.to_string(); n])
}
