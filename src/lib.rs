//! Metabolomics Statistics Library
//!
//! This library provides the statistical transformation pipeline behind a
//! metabolomics dashboard: normalization of pool-size tables, pathway-class
//! grouping, ratio rows, pairwise Welch tests with multiple-testing
//! correction, control-relative heatmap values, volcano classification and
//! regression against external variables.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (MetaboliteTable, SampleGroups, ReferenceData, results)
//! - **normalize**: Product normalization and zero-preserving log2 transforms
//! - **filter**: Pathway-class grouping and ordering
//! - **zero**: Zero handling (floor replacement)
//! - **derive**: Ratio rows, isotopologue sums and heatmap cells
//! - **test**: Welch t-test with degenerate-data guards, batch significance
//! - **correct**: Multiple testing correction (Bonferroni, Benjamini-Hochberg)
//! - **model**: Simple linear regression and volcano statistics
//! - **pipeline**: Pipeline composition and session-driven analyses
//!
//! # Example
//!
//! ```no_run
//! use metabostat::prelude::*;
//!
//! let pool = MetaboliteTable::from_tsv("pool.tsv").unwrap();
//! let reference = ReferenceData::from_csv("classes.csv").unwrap();
//! let session = SessionConfig::from_yaml_file("session.yaml").unwrap();
//!
//! let pvalues = session.pool_pvalues(&pool, &reference).unwrap();
//! pvalues.to_tsv("pvalues.tsv").unwrap();
//!
//! let volcano = session.volcano(&pool, &reference).unwrap();
//! volcano.to_tsv("volcano.tsv").unwrap();
//! ```

pub mod correct;
pub mod data;
pub mod derive;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod test;
pub mod zero;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{correct, CorrectionMethod, DEFAULT_ALPHA};
    pub use crate::data::{
        annotation, render_pvalue, ClassEntry, Comparison, GroupId, MetaboliteTable, PValueRow,
        PValueTable, ReferenceData, RegressionOutcome, RegressionRecord, RegressionSet,
        SampleGroup, SampleGroups, SampleSelection, SignificanceSymbol, VariableTable,
    };
    pub use crate::derive::{
        compile_ratios, label_sum, HeatmapCell, HeatmapMatrix, RatioSpec, RATIO_CLASS,
    };
    pub use crate::error::{MetaboError, Result};
    pub use crate::filter::{group_by_class, order_by_class, split_by_class};
    pub use crate::model::{
        compute_volcano_row, lingress_table, simple_linear_regression, volcano_table, LinearFit,
        VolcanoCategory, VolcanoCutoffs, VolcanoRecord, VolcanoSet,
    };
    pub use crate::normalize::{log2_or_zero, normalize, to_control_relative_log2};
    pub use crate::pipeline::{
        AnalysisSettings, IsoGranularity, Pipeline, PipelineConfig, PipelineContext,
        PipelineStep, SessionConfig,
    };
    pub use crate::test::{
        compare, compare_with_config, comparison_annotation, generate_group_significance,
        pvalue_table, CompareConfig, GroupSignificance, NanReason, PValueResult, ZeroPolicy,
    };
    pub use crate::zero::replace_zeros;
}
