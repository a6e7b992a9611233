//! Zero handling strategies.

pub mod floor;

pub use floor::replace_zeros;
