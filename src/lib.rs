//! Multi-region trending video pipeline: fetch, enrich, label, classify and
//! persist a dataset for a separate serving layer.

pub mod api_types;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod fetch;
pub mod forest;
pub mod label;
pub mod language;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod reader;
pub mod render;
pub mod scaler;
pub mod sentiment;
pub mod writer;

pub use error::PipelineError;
pub use models::{Dataset, EnrichedRecord, VideoRecord};
