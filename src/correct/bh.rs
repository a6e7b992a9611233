//! Benjamini-Hochberg step-up correction.

/// Benjamini-Hochberg adjusted p-values.
///
/// With p-values ranked ascending, the adjusted value at rank k is
/// `min over j >= k of p(j) * m / j`, capped at 1. Inputs must all be
/// determined; missing entries are handled by [`crate::correct::correct`].
///
/// # Arguments
/// * `p_values` - Determined p-values, in any order
///
/// # Returns
/// Adjusted values in input order.
pub fn correct_bh(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut adjusted = vec![0.0; m];
    let mut running_min = 1.0_f64;
    for (pos, &idx) in order.iter().enumerate().rev() {
        let scaled = p_values[idx] * m as f64 / (pos + 1) as f64;
        running_min = running_min.min(scaled);
        adjusted[idx] = running_min;
    }
    adjusted
}
