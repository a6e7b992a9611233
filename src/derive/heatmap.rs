//! Heatmap value derivation with not-detected handling.

use crate::data::{MetaboliteTable, SampleGroups};
use crate::error::Result;
use crate::normalize::to_control_relative_log2;
use crate::test::GroupSignificance;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Value shown in one heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapCell {
    /// Detected; control-relative log2 value (or raw value without a control).
    Value(f64),
    /// Raw value was 0.
    NotDetected,
    /// Detected, but the control group has no detected value in this row
    /// (all control cells zero or missing).
    ControlAbsent,
    /// Raw value missing.
    Missing,
}

impl HeatmapCell {
    /// Color value: 0 for not detected and control-absent cells.
    pub fn z(&self) -> f64 {
        match self {
            Self::Value(v) => *v,
            Self::NotDetected | Self::ControlAbsent => 0.0,
            Self::Missing => f64::NAN,
        }
    }

    /// Text drawn over the cell, if any.
    pub fn annotation(&self) -> Option<&'static str> {
        match self {
            Self::NotDetected => Some("nd"),
            Self::ControlAbsent => Some("0"),
            Self::Value(_) | Self::Missing => None,
        }
    }
}

/// Cells of a heatmap with their row and column labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapMatrix {
    pub compounds: Vec<String>,
    pub pathway_classes: Option<Vec<String>>,
    /// Sample columns in group display order.
    pub sample_ids: Vec<String>,
    /// Group of each sample column.
    pub column_groups: Vec<String>,
    /// Cells (compounds × samples).
    pub cells: Vec<Vec<HeatmapCell>>,
    /// Significant group pairs per row.
    pub significance: Vec<Vec<(String, String)>>,
}

impl HeatmapMatrix {
    /// Derive heatmap cells from a raw (normalized) table.
    ///
    /// Columns are the grouped samples in group order. With a control group
    /// the values are control-relative log2 fold changes. Rows without any
    /// detected control value (every control cell zero or missing) have no
    /// reference, so their detected cells become [`HeatmapCell::ControlAbsent`].
    /// Without a control group (bulk isotopologue heatmaps) raw values are shown.
    ///
    /// # Arguments
    /// * `raw` - Untransformed values
    /// * `groups` - Sample groups defining the column order
    /// * `control` - Control group name, if any
    pub fn derive(
        raw: &MetaboliteTable,
        groups: &SampleGroups,
        control: Option<&str>,
    ) -> Result<Self> {
        let raw = raw.select_samples(&groups.all_samples())?;
        let (values, control_cols) = match control {
            Some(name) => (
                to_control_relative_log2(&raw, groups, name)?,
                raw.sample_indices(groups.samples_of(name)?)?,
            ),
            None => (raw.clone(), Vec::new()),
        };

        let cells = (0..raw.n_compounds())
            .map(|row| {
                let control_absent = !control_cols.is_empty()
                    && raw
                        .values(row, &control_cols)
                        .iter()
                        .all(|&v| v.is_nan() || v == 0.0);

                (0..raw.n_samples())
                    .map(|col| {
                        let r = raw.get(row, col);
                        if r.is_nan() {
                            HeatmapCell::Missing
                        } else if r == 0.0 {
                            HeatmapCell::NotDetected
                        } else if control_absent {
                            HeatmapCell::ControlAbsent
                        } else {
                            HeatmapCell::Value(values.get(row, col))
                        }
                    })
                    .collect()
            })
            .collect();

        let column_groups = groups
            .iter()
            .flat_map(|g| g.samples().iter().map(move |_| g.name().to_string()))
            .collect();

        Ok(Self {
            compounds: raw.compounds().to_vec(),
            pathway_classes: raw.pathway_classes().map(|c| c.to_vec()),
            sample_ids: raw.sample_ids().to_vec(),
            column_groups,
            cells,
            significance: vec![Vec::new(); raw.n_compounds()],
        })
    }

    /// Attach the significant group pairs of each row.
    pub fn with_significance(mut self, significance: &GroupSignificance) -> Self {
        self.significance = self
            .compounds
            .iter()
            .map(|c| significance.get(c).map(|p| p.to_vec()).unwrap_or_default())
            .collect();
        self
    }

    pub fn n_rows(&self) -> usize {
        self.cells.len()
    }

    /// Color values (compounds × samples).
    pub fn z_matrix(&self) -> Vec<Vec<f64>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(HeatmapCell::z).collect())
            .collect()
    }

    /// Write cell values to a TSV file; annotated cells are written as their text.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut header = vec!["Compound".to_string()];
        if self.pathway_classes.is_some() {
            header.push("pathway_class".to_string());
        }
        header.extend(self.sample_ids.iter().cloned());
        header.push("significant_pairs".to_string());
        writeln!(writer, "{}", header.join("\t"))?;

        for (i, row) in self.cells.iter().enumerate() {
            let mut fields = vec![self.compounds[i].clone()];
            if let Some(classes) = &self.pathway_classes {
                fields.push(classes[i].clone());
            }
            for cell in row {
                fields.push(match (cell.annotation(), cell) {
                    (Some(text), _) => text.to_string(),
                    (None, HeatmapCell::Value(v)) => format!("{:.4}", v),
                    (None, _) => String::new(),
                });
            }
            let pairs: Vec<String> = self.significance[i]
                .iter()
                .map(|(a, b)| format!("{}|{}", a, b))
                .collect();
            fields.push(pairs.join(";"));
            writeln!(writer, "{}", fields.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }
}
