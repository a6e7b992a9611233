//! Statistical hypothesis testing between sample groups.

pub mod significance;

pub use significance::{
    comparison_annotation, generate_group_significance, generate_group_significance_at,
    pvalue_table, GroupSignificance,
};
pub use welch::{
    compare, compare_with_config, welch_t_test, CompareConfig, NanReason, PValueResult,
    WelchResult, ZeroPolicy, DEFAULT_VARIANCE_FLOOR,
};
