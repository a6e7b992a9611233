//! Session configuration and the analyses driven by it.
//!
//! A [`SessionConfig`] holds the user-held state of one analysis: sample
//! groups, selected classes, normalization compounds, comparisons, the
//! correction method and per-feature settings. Each analysis method rebuilds
//! its tables from the uploaded data, so nothing is cached between calls.

use super::runner::{Pipeline, PipelineContext};
use crate::correct::{CorrectionMethod, DEFAULT_ALPHA};
use crate::data::{
    dedup_comparisons, Comparison, MetaboliteTable, PValueTable, ReferenceData, RegressionSet,
    SampleGroups, SampleSelection, VariableTable,
};
use crate::derive::{label_sum, HeatmapMatrix, RatioSpec, RATIO_CLASS};
use crate::error::{MetaboError, Result};
use crate::filter::order_by_class;
use crate::model::{lingress_table, volcano_table, VolcanoCutoffs, VolcanoSet};
use crate::normalize::normalize;
use crate::test::{
    comparison_annotation, generate_group_significance_at, pvalue_table, CompareConfig,
    GroupSignificance, ZeroPolicy, DEFAULT_VARIANCE_FLOOR,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Value substituted for zeros on the volcano and regression paths.
pub const DEFAULT_ZERO_FLOOR: f64 = 1000.0;

/// Numeric settings consumed by the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub variance_floor: f64,
    /// Threshold of the group significance overlay.
    pub alpha: f64,
    pub volcano: VolcanoCutoffs,
    /// Zero replacement before normalization on the volcano and regression
    /// paths; `None` keeps zeros.
    pub zero_floor: Option<f64>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            variance_floor: DEFAULT_VARIANCE_FLOOR,
            alpha: DEFAULT_ALPHA,
            volcano: VolcanoCutoffs::default(),
            zero_floor: Some(DEFAULT_ZERO_FLOOR),
        }
    }
}

impl AnalysisSettings {
    /// Welch test configuration under the zero policy of the calling analysis.
    pub fn compare_config(&self, zero_policy: ZeroPolicy) -> CompareConfig {
        CompareConfig {
            variance_floor: self.variance_floor,
            zero_policy,
        }
    }
}

/// Granularity of isotopologue p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsoGranularity {
    /// Labelled isotopologues summed per compound.
    Summed,
    /// One row per `(Compound, C_Label)`.
    PerLabel,
}

/// State of one analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub sample_groups: SampleGroups,
    #[serde(default)]
    pub selected_pathway_classes: Vec<String>,
    #[serde(default)]
    pub normalization_compound_names: Vec<String>,
    /// `[index_a, index_b]` pairs into the display order of `sample_groups`.
    #[serde(default)]
    pub comparisons: Vec<[usize; 2]>,
    #[serde(default)]
    pub correction_method: CorrectionMethod,
    #[serde(default)]
    pub ratio_specs: Vec<RatioSpec>,
    #[serde(default)]
    pub control_group: Option<String>,
    #[serde(default)]
    pub condition_group: Option<String>,
    #[serde(default)]
    pub external_variable: Option<String>,
    #[serde(default)]
    pub settings: AnalysisSettings,
}

impl SessionConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(MetaboError::from)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(MetaboError::from)
    }

    /// A small session for a two-group experiment.
    pub fn example() -> Self {
        let sample_groups = SampleGroups::from_pairs(vec![
            ("control", vec!["ctrl_1", "ctrl_2", "ctrl_3"]),
            ("treated", vec!["trt_1", "trt_2", "trt_3"]),
        ])
        .unwrap_or_default();
        Self {
            name: "example".to_string(),
            sample_groups,
            selected_pathway_classes: vec!["glycolysis".to_string(), RATIO_CLASS.to_string()],
            normalization_compound_names: vec!["protein".to_string()],
            comparisons: vec![[0, 1]],
            correction_method: CorrectionMethod::BenjaminiHochberg,
            ratio_specs: vec![RatioSpec::new("lactate", "pyruvate")],
            control_group: Some("control".to_string()),
            condition_group: Some("treated".to_string()),
            external_variable: None,
            settings: AnalysisSettings::default(),
        }
    }

    /// Resolve and deduplicate the stored comparisons.
    pub fn comparisons(&self) -> Result<Vec<Comparison>> {
        let resolved = self
            .comparisons
            .iter()
            .map(|pair| Comparison::from_indices(&self.sample_groups, *pair))
            .collect::<Result<Vec<_>>>()?;
        Ok(dedup_comparisons(&resolved))
    }

    fn context<'a>(&'a self, reference: &'a ReferenceData) -> PipelineContext<'a> {
        PipelineContext {
            groups: Some(&self.sample_groups),
            reference: Some(reference),
        }
    }

    fn ratios_selected(&self) -> bool {
        self.selected_pathway_classes.iter().any(|c| c == RATIO_CLASS)
    }

    fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str> {
        value
            .as_deref()
            .ok_or_else(|| MetaboError::InvalidParameter(format!("No {} selected", what)))
    }

    /// Normalize the grouped samples of the pool table.
    pub fn normalized_pool(&self, pool: &MetaboliteTable) -> Result<MetaboliteTable> {
        normalize(
            pool,
            SampleSelection::Groups(&self.sample_groups),
            &self.normalization_compound_names,
        )
    }

    /// Normalize, then keep the selected classes.
    pub fn normalized_grouped(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<MetaboliteTable> {
        Pipeline::new()
            .name("normalized_grouped")
            .normalize(&self.normalization_compound_names)
            .group_classes(&self.selected_pathway_classes)
            .run(pool, &self.context(reference))
    }

    /// Normalized, grouped pool table with ratio rows when ratios are selected.
    pub fn prepared_pool(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<MetaboliteTable> {
        self.prepared_pipeline().run(pool, &self.context(reference))
    }

    fn prepared_pipeline(&self) -> Pipeline {
        let pipeline = Pipeline::new()
            .name("prepared_pool")
            .normalize(&self.normalization_compound_names)
            .group_classes(&self.selected_pathway_classes);
        if self.ratios_selected() {
            pipeline.append_ratios(&self.ratio_specs)
        } else {
            pipeline
        }
    }

    /// Normalized pool table for download, without the class column.
    pub fn normalized_pool_download(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<MetaboliteTable> {
        self.prepared_pipeline()
            .name("normalized_pool_download")
            .drop_pathway_class()
            .run(pool, &self.context(reference))
    }

    /// Corrected pairwise p-values of the prepared pool table.
    pub fn pool_pvalues(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<PValueTable> {
        let prepared = self.prepared_pool(pool, reference)?;
        pvalue_table(
            &prepared,
            &self.sample_groups,
            &self.comparisons()?,
            self.correction_method,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )
    }

    /// Figure annotation of one compound in one comparison of the prepared pool.
    ///
    /// The comparison is re-tested with zeros included in the degenerate-data
    /// checks; the `q` part comes from the batch p-value table.
    pub fn pool_annotation(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
        compound: &str,
        comparison: &Comparison,
        numeric: bool,
    ) -> Result<String> {
        let prepared = self.prepared_pool(pool, reference)?;
        let row = prepared
            .find_compound(compound)
            .ok_or_else(|| MetaboError::UnknownCompound(compound.to_string()))?;
        let corrected = pvalue_table(
            &prepared,
            &self.sample_groups,
            &self.comparisons()?,
            self.correction_method,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )?;
        comparison_annotation(
            &prepared,
            &self.sample_groups,
            row,
            comparison,
            Some(&corrected),
            self.settings.variance_floor,
            numeric,
        )
    }

    /// Class-ordered isotopologue rows of the grouped samples.
    fn ordered_iso(
        &self,
        iso: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<MetaboliteTable> {
        order_by_class(iso, &self.selected_pathway_classes, reference)?
            .select_samples(&self.sample_groups.all_samples())
    }

    /// Corrected pairwise p-values of isotopologue data.
    pub fn iso_pvalues(
        &self,
        iso: &MetaboliteTable,
        reference: &ReferenceData,
        granularity: IsoGranularity,
    ) -> Result<PValueTable> {
        let ordered = self.ordered_iso(iso, reference)?;
        let table = match granularity {
            IsoGranularity::Summed => label_sum(&ordered, SampleSelection::All)?,
            IsoGranularity::PerLabel => ordered,
        };
        pvalue_table(
            &table,
            &self.sample_groups,
            &self.comparisons()?,
            self.correction_method,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )
    }

    /// Significant group pairs per compound of the prepared pool table.
    pub fn group_significance(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<GroupSignificance> {
        let prepared = self.prepared_pool(pool, reference)?;
        generate_group_significance_at(
            &prepared,
            &self.sample_groups,
            self.settings.alpha,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )
    }

    /// Pool heatmap relative to the control group, with significance overlay.
    pub fn pool_heatmap(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<HeatmapMatrix> {
        let control = Self::required(&self.control_group, "control group")?;
        let prepared = self.prepared_pool(pool, reference)?;
        let significance = generate_group_significance_at(
            &prepared,
            &self.sample_groups,
            self.settings.alpha,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )?;
        Ok(HeatmapMatrix::derive(&prepared, &self.sample_groups, Some(control))?
            .with_significance(&significance))
    }

    /// Bulk isotopologue heatmap of summed labelled fractions.
    pub fn iso_heatmap(
        &self,
        iso: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<HeatmapMatrix> {
        let ordered = self.ordered_iso(iso, reference)?;
        let summed = label_sum(&ordered, SampleSelection::All)?;
        HeatmapMatrix::derive(&summed, &self.sample_groups, None)
    }

    fn floored_grouped(
        &self,
        pool: &MetaboliteTable,
        reference: &ReferenceData,
    ) -> Result<MetaboliteTable> {
        let mut pipeline = Pipeline::new().name("floored_grouped");
        if let Some(floor) = self.settings.zero_floor {
            pipeline = pipeline.replace_zeros(floor);
        }
        pipeline
            .normalize(&self.normalization_compound_names)
            .group_classes(&self.selected_pathway_classes)
            .drop_pathway_class()
            .run(pool, &self.context(reference))
    }

    /// Volcano points of the condition group against the control group.
    pub fn volcano(&self, pool: &MetaboliteTable, reference: &ReferenceData) -> Result<VolcanoSet> {
        let control = Self::required(&self.control_group, "control group")?;
        let condition = Self::required(&self.condition_group, "condition group")?;
        let table = self.floored_grouped(pool, reference)?;
        volcano_table(
            &table,
            &self.sample_groups,
            control,
            condition,
            &self.settings.volcano,
            &self.settings.compare_config(ZeroPolicy::ExcludeBeforeChecks),
        )
    }

    /// Regress every selected compound on the external variable.
    pub fn lingress(
        &self,
        pool: &MetaboliteTable,
        variables: &VariableTable,
        reference: &ReferenceData,
    ) -> Result<RegressionSet> {
        let variable = Self::required(&self.external_variable, "external variable")?;
        let table = self.floored_grouped(pool, reference)?;
        lingress_table(&table, variables, variable, &self.sample_groups)
    }
}
