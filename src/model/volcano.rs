//! Fold change and significance classification for volcano plots.

use crate::data::{MetaboliteTable, SampleGroups};
use crate::error::Result;
use crate::test::welch::mean;
use crate::test::{compare_with_config, CompareConfig, PValueResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Fold-change and -log10(p) cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolcanoCutoffs {
    /// Absolute log2 fold change a compound must exceed.
    pub fc_cutoff: f64,
    /// -log10(p) thresholds of tiers 1, 2 and 3, ascending.
    pub tiers: [f64; 3],
}

impl Default for VolcanoCutoffs {
    fn default() -> Self {
        Self {
            fc_cutoff: 1.0,
            tiers: [1.3, 2.0, 3.0],
        }
    }
}

/// Volcano category: direction crossed with significance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolcanoCategory {
    IncreaseTier3,
    IncreaseTier2,
    IncreaseTier1,
    DecreaseTier3,
    DecreaseTier2,
    DecreaseTier1,
    NotSignificant,
}

impl VolcanoCategory {
    /// Classify a point.
    ///
    /// Comparisons are strict, so values on a cutoff fall into the less
    /// significant bucket. Fold change alone never makes a point
    /// significant, and NaN inputs are not significant.
    pub fn classify(log2_fc: f64, neg_log10_p: f64, cutoffs: &VolcanoCutoffs) -> Self {
        let [t1, t2, t3] = cutoffs.tiers;
        let tier = if neg_log10_p > t3 {
            3
        } else if neg_log10_p > t2 {
            2
        } else if neg_log10_p > t1 {
            1
        } else {
            return Self::NotSignificant;
        };

        if log2_fc > cutoffs.fc_cutoff {
            match tier {
                3 => Self::IncreaseTier3,
                2 => Self::IncreaseTier2,
                _ => Self::IncreaseTier1,
            }
        } else if log2_fc < -cutoffs.fc_cutoff {
            match tier {
                3 => Self::DecreaseTier3,
                2 => Self::DecreaseTier2,
                _ => Self::DecreaseTier1,
            }
        } else {
            Self::NotSignificant
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IncreaseTier3 => "increase_tier3",
            Self::IncreaseTier2 => "increase_tier2",
            Self::IncreaseTier1 => "increase_tier1",
            Self::DecreaseTier3 => "decrease_tier3",
            Self::DecreaseTier2 => "decrease_tier2",
            Self::DecreaseTier1 => "decrease_tier1",
            Self::NotSignificant => "not_significant",
        }
    }

    pub fn is_significant(&self) -> bool {
        !matches!(self, Self::NotSignificant)
    }
}

/// Statistics of one compound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolcanoRow {
    /// Mean of the control replicates.
    pub value_ctrl: f64,
    /// Mean of the condition replicates.
    pub value_cond: f64,
    /// log2(condition mean / control mean); NaN when a mean is not positive.
    pub log2_fc: f64,
    pub p_value: PValueResult,
}

/// Compute fold change and p-value for one compound with default test settings.
pub fn compute_volcano_row(control: &[f64], condition: &[f64]) -> VolcanoRow {
    compute_volcano_row_with_config(control, condition, &CompareConfig::default())
}

/// Compute fold change and p-value for one compound.
///
/// Means are taken over the raw replicates, skipping missing values. The
/// p-value comes from the zero-filtered Welch test.
pub fn compute_volcano_row_with_config(
    control: &[f64],
    condition: &[f64],
    config: &CompareConfig,
) -> VolcanoRow {
    let present = |x: &[f64]| x.iter().copied().filter(|v| !v.is_nan()).collect::<Vec<f64>>();
    let value_ctrl = mean(&present(control));
    let value_cond = mean(&present(condition));
    let log2_fc = if value_ctrl > 0.0 && value_cond > 0.0 {
        (value_cond / value_ctrl).log2()
    } else {
        f64::NAN
    };
    VolcanoRow {
        value_ctrl,
        value_cond,
        log2_fc,
        p_value: compare_with_config(control, condition, config),
    }
}

/// One point of a volcano plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolcanoRecord {
    pub met_name: String,
    pub value_ctrl: f64,
    pub value_cond: f64,
    pub log2_fc: f64,
    pub p_value: f64,
    pub neg_log10_p: f64,
    pub category: VolcanoCategory,
}

/// Volcano points of every compound for one control/condition pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolcanoSet {
    pub control: String,
    pub condition: String,
    pub cutoffs: VolcanoCutoffs,
    pub records: Vec<VolcanoRecord>,
}

impl VolcanoSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a compound.
    pub fn get(&self, met_name: &str) -> Option<&VolcanoRecord> {
        self.records.iter().find(|r| r.met_name == met_name)
    }

    /// Records outside the not-significant bucket.
    pub fn significant(&self) -> Vec<&VolcanoRecord> {
        self.records
            .iter()
            .filter(|r| r.category.is_significant())
            .collect()
    }

    /// Write results to TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "MetNames\tvalue_ctrl\tvalue_cond\tlog2FC\tp-value\tlogp-value\tcolor_category"
        )?;
        for r in &self.records {
            writeln!(
                writer,
                "{}\t{:.6}\t{:.6}\t{:.4}\t{:.2e}\t{:.4}\t{}",
                r.met_name,
                r.value_ctrl,
                r.value_cond,
                r.log2_fc,
                r.p_value,
                r.neg_log10_p,
                r.category.name()
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Compute volcano points for every compound.
///
/// Zero replacement is not applied here; callers substitute a floor value
/// beforehand when fold changes of undetected compounds should be finite.
///
/// # Arguments
/// * `table` - Normalized values
/// * `groups` - Sample groups
/// * `control` - Control group name
/// * `condition` - Condition group name
/// * `cutoffs` - Classification cutoffs
/// * `config` - Welch test settings
pub fn volcano_table(
    table: &MetaboliteTable,
    groups: &SampleGroups,
    control: &str,
    condition: &str,
    cutoffs: &VolcanoCutoffs,
    config: &CompareConfig,
) -> Result<VolcanoSet> {
    let ctrl_cols = table.sample_indices(groups.samples_of(control)?)?;
    let cond_cols = table.sample_indices(groups.samples_of(condition)?)?;

    let records: Vec<VolcanoRecord> = (0..table.n_compounds())
        .into_par_iter()
        .map(|i| {
            let row = compute_volcano_row_with_config(
                &table.values(i, &ctrl_cols),
                &table.values(i, &cond_cols),
                config,
            );
            let p_value = row.p_value.p_value();
            let neg_log10_p = -p_value.log10();
            VolcanoRecord {
                met_name: table.compounds()[i].clone(),
                value_ctrl: row.value_ctrl,
                value_cond: row.value_cond,
                log2_fc: row.log2_fc,
                p_value,
                neg_log10_p,
                category: VolcanoCategory::classify(row.log2_fc, neg_log10_p, cutoffs),
            }
        })
        .collect();

    Ok(VolcanoSet {
        control: control.to_string(),
        condition: condition.to_string(),
        cutoffs: *cutoffs,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_classify_tiers() {
        let cutoffs = VolcanoCutoffs::default();
        assert_eq!(
            VolcanoCategory::classify(1.5, 2.5, &cutoffs),
            VolcanoCategory::IncreaseTier2
        );
        assert_eq!(
            VolcanoCategory::classify(1.5, 1.0, &cutoffs),
            VolcanoCategory::NotSignificant
        );
        assert_eq!(
            VolcanoCategory::classify(-3.0, 4.0, &cutoffs),
            VolcanoCategory::DecreaseTier3
        );
        assert_eq!(
            VolcanoCategory::classify(0.5, 4.0, &cutoffs),
            VolcanoCategory::NotSignificant
        );
        assert_eq!(VolcanoCategory::IncreaseTier2.name(), "increase_tier2");
    }

    #[test]
    fn test_classify_boundaries_are_conservative() {
        let cutoffs = VolcanoCutoffs::default();
        assert_eq!(
            VolcanoCategory::classify(1.0, 5.0, &cutoffs),
            VolcanoCategory::NotSignificant
        );
        assert_eq!(
            VolcanoCategory::classify(2.0, 2.0, &cutoffs),
            VolcanoCategory::IncreaseTier1
        );
        assert_eq!(
            VolcanoCategory::classify(2.0, 1.3, &cutoffs),
            VolcanoCategory::NotSignificant
        );
        assert_eq!(
            VolcanoCategory::classify(f64::NAN, f64::NAN, &cutoffs),
            VolcanoCategory::NotSignificant
        );
    }

    #[test]
    fn test_volcano_row() {
        let row = compute_volcano_row(&[10.0, 12.0, 11.0], &[40.0, 48.0, 44.0]);
        assert_relative_eq!(row.value_ctrl, 11.0, epsilon = 1e-12);
        assert_relative_eq!(row.value_cond, 44.0, epsilon = 1e-12);
        assert_relative_eq!(row.log2_fc, 2.0, epsilon = 1e-12);
        assert!(row.p_value.is_valid());
    }

    #[test]
    fn test_zero_mean_gives_nan_fold_change() {
        let row = compute_volcano_row(&[0.0, 0.0, 0.0], &[4.0, 5.0, 6.0]);
        assert!(row.log2_fc.is_nan());
        assert!(!row.p_value.is_valid());
    }

    #[test]
    fn test_volcano_table() {
        let table = MetaboliteTable::from_rows(
            &["up", "flat"],
            &["C1", "C2", "C3", "T1", "T2", "T3"],
            &[
                vec![10.0, 11.0, 12.0, 80.0, 82.0, 84.0],
                vec![10.0, 11.0, 12.0, 10.5, 11.0, 11.5],
            ],
        )
        .unwrap();
        let groups = SampleGroups::from_pairs(vec![
            ("ctrl", vec!["C1", "C2", "C3"]),
            ("trt", vec!["T1", "T2", "T3"]),
        ])
        .unwrap();

        let set = volcano_table(
            &table,
            &groups,
            "ctrl",
            "trt",
            &VolcanoCutoffs::default(),
            &CompareConfig::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("up").unwrap().category.is_significant());
        assert_eq!(set.get("flat").unwrap().category, VolcanoCategory::NotSignificant);
        assert_eq!(set.significant().len(), 1);
    }
}
