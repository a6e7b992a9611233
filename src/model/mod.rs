//! Regression and fold-change models.

pub mod lm;
pub mod volcano;

pub use lm::{lingress_table, simple_linear_regression, LinearFit, INSUFFICIENT_POINTS};
pub use volcano::{
    compute_volcano_row, compute_volcano_row_with_config, volcano_table, VolcanoCategory,
    VolcanoCutoffs, VolcanoRecord, VolcanoRow, VolcanoSet,
};
