//! Normalization and log transforms for metabolite tables.
//!
//! - **product**: divide samples by the product of normalization compounds
//! - **log2**: zero-preserving log2 and control-relative log2 fold change

pub mod log2;
pub mod product;

pub use log2::{control_averages, log2_or_zero, log2_transform, to_control_relative_log2};
pub use product::{normalization_factors, normalize};
