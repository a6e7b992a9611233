//! Bonferroni family-wise error correction.

/// Multiply every p-value by the number of tests, capped at 1.
pub fn correct_bonferroni(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len() as f64;
    p_values.iter().map(|&p| (p * n).min(1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bonferroni_scales_and_caps() {
        let q_values = correct_bonferroni(&[0.01, 0.2, 0.5]);
        assert_relative_eq!(q_values[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(q_values[1], 0.6, epsilon = 1e-12);
        assert_relative_eq!(q_values[2], 1.0, epsilon = 1e-12);
    }
}
