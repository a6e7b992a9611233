//! Derived tables: metabolite ratios, isotopologue sums and heatmap cells.

pub mod heatmap;
pub mod isotope;
pub mod ratio;

pub use heatmap::{HeatmapCell, HeatmapMatrix};
pub use isotope::label_sum;
pub use ratio::{compile_ratios, RatioSpec, RATIO_CLASS};
