//! Aggregation of isotopologue rows.

use crate::data::{MetaboliteTable, SampleSelection, C_LABEL_COLUMN};
use crate::error::{MetaboError, Result};
use nalgebra::DMatrix;

/// Sum the labelled isotopologues (`C_Label != 0`) of each compound.
///
/// The result is pool-shaped: one row per compound in first-appearance order
/// and no metadata columns. Missing values are skipped; a compound whose
/// labelled values are all missing in a sample stays missing there.
///
/// # Arguments
/// * `iso` - Isotopologue table with `C_Label`
/// * `selection` - Which sample columns to keep
pub fn label_sum(iso: &MetaboliteTable, selection: SampleSelection<'_>) -> Result<MetaboliteTable> {
    let labels = iso
        .c_labels()
        .ok_or_else(|| MetaboError::MissingColumn(C_LABEL_COLUMN.to_string()))?;
    let cols: Vec<usize> = match selection {
        SampleSelection::All => (0..iso.n_samples()).collect(),
        SampleSelection::Groups(groups) => iso.sample_indices(&groups.all_samples())?,
    };

    let mut compounds: Vec<String> = Vec::new();
    let mut sums: Vec<Vec<f64>> = Vec::new();
    for row in (0..iso.n_compounds()).filter(|&i| labels[i] != 0) {
        let name = &iso.compounds()[row];
        let idx = match compounds.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                compounds.push(name.clone());
                sums.push(vec![f64::NAN; cols.len()]);
                compounds.len() - 1
            }
        };
        for (j, value) in iso.values(row, &cols).into_iter().enumerate() {
            if !value.is_nan() {
                let acc = &mut sums[idx][j];
                *acc = if acc.is_nan() { value } else { *acc + value };
            }
        }
    }

    let mut data = DMatrix::zeros(compounds.len(), cols.len());
    for (i, row) in sums.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            data[(i, j)] = v;
        }
    }
    let sample_ids = cols.iter().map(|&c| iso.sample_ids()[c].clone()).collect();
    MetaboliteTable::new(data, compounds, sample_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleGroups;
    use approx::assert_relative_eq;

    fn create_iso() -> MetaboliteTable {
        MetaboliteTable::from_rows(
            &["glucose", "glucose", "glucose", "lactate", "lactate"],
            &["S1", "S2", "S3"],
            &[
                vec![0.6, 0.5, 0.9],
                vec![0.3, 0.3, 0.1],
                vec![0.1, f64::NAN, 0.0],
                vec![0.8, 0.7, 0.6],
                vec![0.2, 0.3, f64::NAN],
            ],
        )
        .unwrap()
        .with_c_labels(vec![0, 1, 2, 0, 1])
        .unwrap()
    }

    #[test]
    fn test_label_sum_excludes_unlabelled() {
        let summed = label_sum(&create_iso(), SampleSelection::All).unwrap();
        assert_eq!(summed.compounds(), &["glucose", "lactate"]);
        assert_relative_eq!(summed.get(0, 0), 0.4, epsilon = 1e-12);
        assert_relative_eq!(summed.get(0, 1), 0.3, epsilon = 1e-12);
        assert!(summed.get(1, 2).is_nan());
        assert!(summed.c_labels().is_none());
    }

    #[test]
    fn test_label_sum_restricts_samples() {
        let groups = SampleGroups::from_pairs(vec![("g", vec!["S3", "S1"])]).unwrap();
        let summed = label_sum(&create_iso(), SampleSelection::Groups(&groups)).unwrap();
        assert_eq!(summed.sample_ids(), &["S3", "S1"]);
        assert_relative_eq!(summed.get(0, 0), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_requires_labels() {
        let pool = MetaboliteTable::from_rows(&["a"], &["S1"], &[vec![1.0]]).unwrap();
        assert!(label_sum(&pool, SampleSelection::All).is_err());
    }
}
