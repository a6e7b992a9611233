//! Data structures for metabolomics tables, sample groups and results.

mod groups;
mod reference;
mod result;
mod table;
mod variables;

pub use groups::{
    dedup_comparisons, Comparison, GroupId, GroupSpec, SampleGroup, SampleGroups, SampleSelection,
};
pub use reference::{ClassEntry, ReferenceData};
pub use result::{
    annotation, render_pvalue, PValueRow, PValueTable, RegressionOutcome, RegressionRecord,
    RegressionSet, SignificanceSymbol,
};
pub use table::{MetaboliteTable, COMPOUND_COLUMN, C_LABEL_COLUMN, PATHWAY_CLASS_COLUMN};
pub use variables::{VariableTable, VARIABLE_COLUMN};
