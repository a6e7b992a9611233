//! Log2 transforms that keep "not detected" zeros at zero.

use crate::data::{MetaboliteTable, SampleGroups};
use crate::error::Result;
use nalgebra::DMatrix;

/// log2 of a value, with 0 mapped to 0 instead of negative infinity.
#[inline]
pub fn log2_or_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x.log2()
    }
}

/// Apply [`log2_or_zero`] to every cell.
pub fn log2_transform(table: &MetaboliteTable) -> MetaboliteTable {
    table.map_values(log2_or_zero)
}

/// Mean of the non-zero, non-missing control values of each row; 0 when none.
pub fn control_averages(table: &MetaboliteTable, control_cols: &[usize]) -> Vec<f64> {
    (0..table.n_compounds())
        .map(|row| {
            let detected: Vec<f64> = table
                .values(row, control_cols)
                .into_iter()
                .filter(|v| !v.is_nan() && *v != 0.0)
                .collect();
            if detected.is_empty() {
                0.0
            } else {
                detected.iter().sum::<f64>() / detected.len() as f64
            }
        })
        .collect()
}

/// Express every cell as log2 fold change relative to the control group.
///
/// For each row the control average is taken over detected (non-zero)
/// control values only. Every cell becomes `log2(x) - log2(avg)`, except
/// that a raw zero stays exactly 0 and missing values stay missing.
///
/// # Arguments
/// * `table` - Raw (normalized) values
/// * `groups` - Sample groups
/// * `control` - Name of the control group
pub fn to_control_relative_log2(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    control: &str,
) -> Result<MetaboliteTable> {
    let control_cols = table.sample_indices(groups.samples_of(control)?)?;
    let averages = control_averages(table, &control_cols);

    let (nrows, ncols) = table.data().shape();
    let mut data = DMatrix::zeros(nrows, ncols);
    for (row, avg) in averages.iter().enumerate() {
        let log_avg = log2_or_zero(*avg);
        for col in 0..ncols {
            let raw = table.get(row, col);
            data[(row, col)] = if raw == 0.0 {
                0.0
            } else {
                log2_or_zero(raw) - log_avg
            };
        }
    }
    Ok(table.with_data(data))
}
