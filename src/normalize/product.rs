//! Normalization by the per-sample product of reference compounds.
//!
//! Each sample column is divided by the product of the selected
//! normalization rows in that column (for example an internal standard and
//! the sample quantity). The normalization rows are removed afterwards.

use crate::data::{MetaboliteTable, SampleSelection};
use crate::error::Result;
use nalgebra::DMatrix;
use std::collections::HashSet;

/// Per-sample normalization factors.
///
/// The factor of a column is the product of the values of every row whose
/// compound is listed, skipping missing values. With no matching rows the
/// product is empty and every factor is 1.
pub fn normalization_factors<S: AsRef<str>>(table: &MetaboliteTable, compounds: &[S]) -> Vec<f64> {
    let wanted: HashSet<&str> = compounds.iter().map(|c| c.as_ref()).collect();
    let rows: Vec<usize> = (0..table.n_compounds())
        .filter(|&i| wanted.contains(table.compounds()[i].as_str()))
        .collect();

    for name in &wanted {
        if table.find_compound(name).is_none() {
            log::info!("normalization compound '{}' not found; ignoring it", name);
        }
    }

    (0..table.n_samples())
        .map(|col| {
            rows.iter()
                .map(|&row| table.get(row, col))
                .filter(|v| !v.is_nan())
                .product()
        })
        .collect()
}

/// Normalize a pool table.
///
/// Keeps the selected sample columns (all, or the grouped samples in group
/// order), divides every column by its normalization factor and drops the
/// normalization rows. A column whose factor is zero becomes missing (NaN).
///
/// # Arguments
/// * `table` - Raw pool table
/// * `selection` - Which sample columns to keep
/// * `compounds` - Normalization compound names; absent names are ignored
///
/// # Returns
/// A new table without the normalization rows.
pub fn normalize<S: AsRef<str>>(
    table: &MetaboliteTable,
    selection: SampleSelection<'_>,
    compounds: &[S],
) -> Result<MetaboliteTable> {
    let selected = match selection {
        SampleSelection::All => table.clone(),
        SampleSelection::Groups(groups) => table.select_samples(&groups.all_samples())?,
    };

    let factors = normalization_factors(&selected, compounds);
    let (nrows, ncols) = selected.data().shape();
    let mut data = DMatrix::zeros(nrows, ncols);
    for (col, &factor) in factors.iter().enumerate() {
        if factor == 0.0 {
            log::warn!(
                "normalization factor of sample '{}' is zero; its values become missing",
                selected.sample_ids()[col]
            );
        }
        for row in 0..nrows {
            data[(row, col)] = if factor == 0.0 {
                f64::NAN
            } else {
                selected.get(row, col) / factor
            };
        }
    }

    let wanted: HashSet<&str> = compounds.iter().map(|c| c.as_ref()).collect();
    let keep: Vec<usize> = (0..nrows)
        .filter(|&i| !wanted.contains(selected.compounds()[i].as_str()))
        .collect();
    selected.with_data(data).subset_rows(&keep)
}
