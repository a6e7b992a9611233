//! Pipeline composition and session-driven analyses.

mod runner;
mod session;

pub use runner::{Pipeline, PipelineConfig, PipelineContext, PipelineStep};
pub use session::{AnalysisSettings, IsoGranularity, SessionConfig, DEFAULT_ZERO_FLOOR};
