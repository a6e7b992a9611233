//! Table-wide pairwise significance testing.

use super::welch::{compare_with_config, CompareConfig, PValueResult, ZeroPolicy};
use crate::correct::{correct, CorrectionMethod, DEFAULT_ALPHA};
use crate::data::{
    annotation, dedup_comparisons, Comparison, MetaboliteTable, PValueRow, PValueTable,
    SampleGroups,
};
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Compounds with the group pairs that differ significantly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSignificance {
    /// `(compound, pairs)` in table order; only compounds with at least one pair.
    pub entries: Vec<(String, Vec<(String, String)>)>,
}

impl GroupSignificance {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Significant pairs of a compound, as name-sorted tuples.
    pub fn get(&self, compound: &str) -> Option<&[(String, String)]> {
        self.entries
            .iter()
            .find(|(c, _)| c == compound)
            .map(|(_, pairs)| pairs.as_slice())
    }
}

/// Find, for every compound, the group pairs with an uncorrected p < 0.05.
///
/// Every unordered pair of groups is tested with zeros excluded. Pairs are
/// recorded as name-sorted tuples, independent of display order.
pub fn generate_group_significance(
    table: &MetaboliteTable,
    groups: &SampleGroups,
) -> Result<GroupSignificance> {
    generate_group_significance_at(table, groups, DEFAULT_ALPHA, &CompareConfig::default())
}

/// [`generate_group_significance`] with an explicit threshold and test configuration.
pub fn generate_group_significance_at(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    alpha: f64,
    config: &CompareConfig,
) -> Result<GroupSignificance> {
    let pairs = groups.unique_pairs();
    let columns = comparison_columns(table, groups, &pairs)?;

    let per_row: Vec<Vec<(String, String)>> = (0..table.n_compounds())
        .into_par_iter()
        .map(|row| {
            let mut significant: Vec<(String, String)> = Vec::new();
            for (cols_a, cols_b, name_a, name_b) in &columns {
                let p = compare_with_config(
                    &table.values(row, cols_a),
                    &table.values(row, cols_b),
                    config,
                )
                .p_value();
                if p < alpha {
                    let sorted = if name_a <= name_b {
                        (name_a.clone(), name_b.clone())
                    } else {
                        (name_b.clone(), name_a.clone())
                    };
                    if !significant.contains(&sorted) {
                        significant.push(sorted);
                    }
                }
            }
            significant
        })
        .collect();

    let entries = table
        .compounds()
        .iter()
        .zip(per_row)
        .filter(|(_, pairs)| !pairs.is_empty())
        .map(|(compound, pairs)| (compound.clone(), pairs))
        .collect();
    Ok(GroupSignificance { entries })
}

/// Compute the wide p/q-value table for a set of comparisons.
///
/// Rows without a `C_Label` column are deduplicated by compound first; with
/// labels every `(Compound, C_Label)` row is tested. All determined p-values
/// across all rows and comparisons are corrected jointly.
///
/// # Arguments
/// * `table` - Values to test
/// * `groups` - Sample groups referenced by the comparisons
/// * `comparisons` - Pairs to test; mirror duplicates are collapsed
/// * `method` - Multiple-testing correction
/// * `config` - Variance floor and zero policy
pub fn pvalue_table(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    comparisons: &[Comparison],
    method: CorrectionMethod,
    config: &CompareConfig,
) -> Result<PValueTable> {
    let table = if table.c_labels().is_none() {
        table.dedup_compounds()
    } else {
        table.clone()
    };
    let comparisons = dedup_comparisons(comparisons);
    let columns = comparison_columns(&table, groups, &comparisons)?;
    let labels = comparisons
        .iter()
        .map(|c| c.label(groups))
        .collect::<Result<Vec<String>>>()?;

    let p_rows: Vec<Vec<PValueResult>> = (0..table.n_compounds())
        .into_par_iter()
        .map(|row| {
            columns
                .iter()
                .map(|(cols_a, cols_b, _, _)| {
                    compare_with_config(
                        &table.values(row, cols_a),
                        &table.values(row, cols_b),
                        config,
                    )
                })
                .collect()
        })
        .collect();

    let flat: Vec<f64> = p_rows.iter().flatten().map(|p| p.p_value()).collect();
    let corrected = correct(&flat, method)?;
    log::info!(
        "tested {} compounds x {} comparisons; {} p-values determined",
        table.n_compounds(),
        comparisons.len(),
        flat.iter().filter(|p| !p.is_nan()).count()
    );

    let n_cmp = comparisons.len();
    let rows = p_rows
        .into_iter()
        .enumerate()
        .map(|(i, p_values)| PValueRow {
            compound: table.compounds()[i].clone(),
            c_label: table.c_labels().map(|l| l[i]),
            p_values,
            q_values: corrected[i * n_cmp..(i + 1) * n_cmp].to_vec(),
        })
        .collect();

    Ok(PValueTable {
        comparisons: labels,
        method,
        rows,
    })
}

/// Figure annotation for one table row and one comparison.
///
/// The row is re-tested with zeros taking part in the identical-data and
/// variance checks. The corrected value is looked up in `corrected` when the
/// table was corrected and holds the row; otherwise only `p` is shown.
///
/// # Arguments
/// * `table` - Values of the figure
/// * `groups` - Sample groups referenced by the comparison
/// * `row` - Row index in `table`
/// * `comparison` - Pair of groups to annotate
/// * `corrected` - Batch p/q-value table of the same data
/// * `variance_floor` - Variance check threshold
/// * `numeric` - Render values instead of stars
pub fn comparison_annotation(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    row: usize,
    comparison: &Comparison,
    corrected: Option<&PValueTable>,
    variance_floor: f64,
    numeric: bool,
) -> Result<String> {
    let (a, b) = comparison.resolve(groups)?;
    let config = CompareConfig {
        variance_floor,
        zero_policy: ZeroPolicy::IncludeInChecks,
    };
    let p = compare_with_config(
        &table.values(row, &table.sample_indices(a.samples())?),
        &table.values(row, &table.sample_indices(b.samples())?),
        &config,
    );

    let label = comparison.label(groups)?;
    let c_label = table.c_labels().map(|labels| labels[row]);
    let q = corrected
        .filter(|t| t.method != CorrectionMethod::None)
        .and_then(|t| t.get_q(&table.compounds()[row], c_label, &label));
    Ok(annotation(&p, q, numeric))
}

type ComparisonColumns = (Vec<usize>, Vec<usize>, String, String);

/// Resolve each comparison to the column indices and names of its two groups.
fn comparison_columns(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    comparisons: &[Comparison],
) -> Result<Vec<ComparisonColumns>> {
    comparisons
        .iter()
        .map(|c| {
            let (a, b) = c.resolve(groups)?;
            Ok((
                table.sample_indices(a.samples())?,
                table.sample_indices(b.samples())?,
                a.name().to_string(),
                b.name().to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::NanReason;
    use approx::assert_relative_eq;

    fn create_test_data() -> (MetaboliteTable, SampleGroups) {
        let table = MetaboliteTable::from_rows(
            &["glucose", "lactate", "citrate", "glucose"],
            &["C1", "C2", "C3", "T1", "T2", "T3"],
            &[
                vec![10.0, 11.0, 12.0, 20.0, 21.0, 23.0],
                vec![5.0, 6.0, 5.5, 5.2, 5.9, 5.4],
                vec![0.0, 0.0, 3.0, 4.0, 5.0, 6.0],
                vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            ],
        )
        .unwrap();
        let groups = SampleGroups::from_pairs(vec![
            ("zeta", vec!["C1", "C2", "C3"]),
            ("alpha", vec!["T1", "T2", "T3"]),
        ])
        .unwrap();
        (table, groups)
    }

    #[test]
    fn test_group_significance_sorted_names() {
        let (table, groups) = create_test_data();
        let sig = generate_group_significance(&table, &groups).unwrap();

        let pairs = sig.get("glucose").unwrap();
        assert_eq!(pairs, &[("alpha".to_string(), "zeta".to_string())]);
        assert!(sig.get("lactate").is_none());
        assert!(sig.get("citrate").is_none());
    }

    #[test]
    fn test_pvalue_table_dedups_and_corrects() {
        let (table, groups) = create_test_data();
        let cmp = Comparison::from_indices(&groups, [1, 0]).unwrap();
        let mirror = Comparison::from_indices(&groups, [0, 1]).unwrap();

        let result = pvalue_table(
            &table,
            &groups,
            &[cmp, mirror],
            CorrectionMethod::Bonferroni,
            &CompareConfig::default(),
        )
        .unwrap();

        assert_eq!(result.comparisons, vec!["zeta vs alpha"]);
        assert_eq!(result.len(), 3);

        let citrate = result.get_p("citrate", None, "zeta vs alpha").unwrap();
        assert_eq!(citrate.reason(), Some(NanReason::InsufficientData));
        assert!(result.get_q("citrate", None, "zeta vs alpha").unwrap().is_nan());

        // Two determined p-values, so Bonferroni doubles each one.
        let p = result.get_p("glucose", None, "zeta vs alpha").unwrap().p_value();
        let q = result.get_q("glucose", None, "zeta vs alpha").unwrap();
        assert_relative_eq!(q, (2.0 * p).min(1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_pvalue_table_per_label_rows() {
        let iso = MetaboliteTable::from_rows(
            &["glucose", "glucose"],
            &["C1", "C2", "T1", "T2"],
            &[vec![0.5, 0.6, 0.1, 0.2], vec![0.3, 0.35, 0.7, 0.75]],
        )
        .unwrap()
        .with_c_labels(vec![1, 2])
        .unwrap();
        let groups =
            SampleGroups::from_pairs(vec![("ctrl", vec!["C1", "C2"]), ("trt", vec!["T1", "T2"])])
                .unwrap();
        let cmp = Comparison::from_indices(&groups, [0, 1]).unwrap();

        let result = pvalue_table(
            &iso,
            &groups,
            &[cmp],
            CorrectionMethod::None,
            &CompareConfig::default(),
        )
        .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.get_p("glucose", Some(2), "ctrl vs trt").is_some());
        assert_eq!(result.headers(), vec!["Compound", "C_Label", "p | ctrl vs trt"]);
    }

    #[test]
    fn test_annotation_includes_zeros_in_checks() {
        // Detected values match across groups; the zeros sit in different samples.
        let table = MetaboliteTable::from_rows(
            &["malate", "glucose"],
            &["C1", "C2", "C3", "T1", "T2", "T3"],
            &[
                vec![0.0, 4.0, 5.0, 4.0, 5.0, 0.0],
                vec![10.0, 11.0, 12.0, 20.0, 21.0, 23.0],
            ],
        )
        .unwrap();
        let groups = SampleGroups::from_pairs(vec![
            ("ctrl", vec!["C1", "C2", "C3"]),
            ("trt", vec!["T1", "T2", "T3"]),
        ])
        .unwrap();
        let cmp = Comparison::from_indices(&groups, [0, 1]).unwrap();
        let batch = pvalue_table(
            &table,
            &groups,
            &[cmp],
            CorrectionMethod::Bonferroni,
            &CompareConfig::default(),
        )
        .unwrap();

        let excluded = batch.get_p("malate", None, "ctrl vs trt").unwrap();
        assert_eq!(excluded.reason(), Some(NanReason::IdenticalData));

        let text =
            comparison_annotation(&table, &groups, 0, &cmp, Some(&batch), 1e-8, true).unwrap();
        // The batch table has no corrected value for this row.
        assert_eq!(text, "p = 1.0000 | nd");

        let text =
            comparison_annotation(&table, &groups, 1, &cmp, Some(&batch), 1e-8, false).unwrap();
        assert!(text.contains(" | "));
        let text = comparison_annotation(&table, &groups, 1, &cmp, None, 1e-8, false).unwrap();
        assert!(!text.contains(" | "));
    }
}
