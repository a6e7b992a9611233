//! Pipeline runner for composing and executing table preparation steps.

use crate::data::{MetaboliteTable, ReferenceData, SampleGroups, SampleSelection};
use crate::derive::{compile_ratios, RatioSpec};
use crate::error::{MetaboError, Result};
use crate::filter::group_by_class;
use crate::normalize::normalize;
use crate::zero::replace_zeros;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A step in the preparation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineStep {
    // === Sample Selection ===
    /// Keep only grouped sample columns, in group order.
    SelectSamples,

    // === Zero Handling ===
    /// Replace exact zeros with a positive floor value.
    ReplaceZeros { floor: f64 },

    // === Normalization ===
    /// Divide each sample by the product of the normalization compounds.
    Normalize { compounds: Vec<String> },

    // === Class Grouping ===
    /// Keep compounds of the selected pathway classes, in reference order.
    GroupClasses { classes: Vec<String> },

    // === Derived Rows ===
    /// Append ratio rows computed from the normalized table.
    AppendRatios { specs: Vec<RatioSpec> },

    // === Output Shape ===
    /// Remove the `pathway_class` column.
    DropPathwayClass,
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Steps to execute.
    pub steps: Vec<PipelineStep>,
}

impl PipelineConfig {
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
}

/// Inputs shared by every step of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineContext<'a> {
    /// Sample groups; `None` means all samples.
    pub groups: Option<&'a SampleGroups>,
    /// Class reference, required by [`PipelineStep::GroupClasses`].
    pub reference: Option<&'a ReferenceData>,
}

/// Builder for constructing and running preparation pipelines.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
    name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            steps: config.steps.clone(),
            name: config.name.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Keep only the grouped samples.
    pub fn select_samples(mut self) -> Self {
        self.steps.push(PipelineStep::SelectSamples);
        self
    }

    /// Replace zeros with `floor`.
    ///
    /// Fold changes near the floor are biased toward 0, so only add this
    /// step where finite fold changes of undetected compounds are wanted.
    pub fn replace_zeros(mut self, floor: f64) -> Self {
        self.steps.push(PipelineStep::ReplaceZeros { floor });
        self
    }

    /// Add product normalization.
    pub fn normalize<S: AsRef<str>>(mut self, compounds: &[S]) -> Self {
        self.steps.push(PipelineStep::Normalize {
            compounds: compounds.iter().map(|c| c.as_ref().to_string()).collect(),
        });
        self
    }

    /// Add class grouping.
    pub fn group_classes<S: AsRef<str>>(mut self, classes: &[S]) -> Self {
        self.steps.push(PipelineStep::GroupClasses {
            classes: classes.iter().map(|c| c.as_ref().to_string()).collect(),
        });
        self
    }

    /// Append ratio rows.
    pub fn append_ratios(mut self, specs: &[RatioSpec]) -> Self {
        self.steps.push(PipelineStep::AppendRatios {
            specs: specs.to_vec(),
        });
        self
    }

    /// Drop the pathway class column.
    pub fn drop_pathway_class(mut self) -> Self {
        self.steps.push(PipelineStep::DropPathwayClass);
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            steps: self.steps.clone(),
        }
    }

    /// Run the pipeline on a table.
    ///
    /// The input table is not modified.
    pub fn run(
        &self,
        table: &MetaboliteTable,
        context: &PipelineContext<'_>,
    ) -> Result<MetaboliteTable> {
        let mut state = PipelineState::new(table.clone());

        for (i, step) in self.steps.iter().enumerate() {
            state = state.apply(step, context).map_err(|e| {
                MetaboError::Pipeline(format!("Step {} ({:?}) failed: {}", i + 1, step, e))
            })?;
        }

        log::debug!(
            "pipeline '{}' produced {} compounds x {} samples",
            self.name,
            state.table.n_compounds(),
            state.table.n_samples()
        );
        Ok(state.table)
    }
}

/// Internal state during pipeline execution.
struct PipelineState {
    table: MetaboliteTable,
    /// Snapshot after normalization, before class grouping.
    normalized: Option<MetaboliteTable>,
}

impl PipelineState {
    fn new(table: MetaboliteTable) -> Self {
        Self {
            table,
            normalized: None,
        }
    }

    fn apply(mut self, step: &PipelineStep, context: &PipelineContext<'_>) -> Result<Self> {
        match step {
            PipelineStep::SelectSamples => {
                let groups = context.groups.ok_or_else(|| {
                    MetaboError::Pipeline("Sample selection requires sample groups".to_string())
                })?;
                self.table = self.table.select_samples(&groups.all_samples())?;
            }

            PipelineStep::ReplaceZeros { floor } => {
                self.table = replace_zeros(&self.table, *floor)?;
            }

            PipelineStep::Normalize { compounds } => {
                let selection = match context.groups {
                    Some(groups) => SampleSelection::Groups(groups),
                    None => SampleSelection::All,
                };
                self.table = normalize(&self.table, selection, compounds)?;
                self.normalized = Some(self.table.clone());
            }

            PipelineStep::GroupClasses { classes } => {
                let reference = context.reference.ok_or_else(|| {
                    MetaboError::Pipeline("Class grouping requires reference data".to_string())
                })?;
                self.table = group_by_class(&self.table, classes, reference)?;
            }

            PipelineStep::AppendRatios { specs } => {
                let source = self.normalized.as_ref().unwrap_or(&self.table);
                let ratios = compile_ratios(source, specs)?;
                if !ratios.is_empty() {
                    self.table = self.table.concat(&ratios)?;
                }
            }

            PipelineStep::DropPathwayClass => {
                self.table = self.table.without_pathway_classes();
            }
        }
        Ok(self)
    }
}
