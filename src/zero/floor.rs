//! Replacement of "not detected" zeros by a floor value.

use crate::data::MetaboliteTable;
use crate::error::{MetaboError, Result};

/// Replace every exact zero with `floor`.
///
/// Used before fold-change computations so that `log2(0)` and division by a
/// zero mean cannot occur. The substitution biases fold changes of compounds
/// measured near the floor, so callers apply it explicitly.
///
/// # Arguments
/// * `table` - Values possibly containing zeros
/// * `floor` - Replacement value (typically 1000 for raw intensities)
///
/// # Returns
/// A new table; missing values are left untouched.
pub fn replace_zeros(table: &MetaboliteTable, floor: f64) -> Result<MetaboliteTable> {
    if floor <= 0.0 || !floor.is_finite() {
        return Err(MetaboError::InvalidParameter(
            "Zero floor must be positive and finite".to_string(),
        ));
    }
    let n_zero = table.data().iter().filter(|&&v| v == 0.0).count();
    log::debug!("replacing {} zero values with {}", n_zero, floor);
    Ok(table.map_values(|v| if v == 0.0 { floor } else { v }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_zeros() {
        let table =
            MetaboliteTable::from_rows(&["a"], &["S1", "S2", "S3"], &[vec![0.0, 5.0, f64::NAN]])
                .unwrap();
        let result = replace_zeros(&table, 1000.0).unwrap();
        assert_eq!(result.get(0, 0), 1000.0);
        assert_eq!(result.get(0, 1), 5.0);
        assert!(result.get(0, 2).is_nan());
    }

    #[test]
    fn test_invalid_floor() {
        let table = MetaboliteTable::from_rows(&["a"], &["S1"], &[vec![0.0]]).unwrap();
        assert!(replace_zeros(&table, 0.0).is_err());
        assert!(replace_zeros(&table, -1.0).is_err());
        assert!(replace_zeros(&table, f64::NAN).is_err());
    }
}
