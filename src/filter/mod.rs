//! Filtering primitives for metabolite tables.

pub mod class;

pub use class::{group_by_class, order_by_class, split_by_class};
