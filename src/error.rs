use thiserror::Error;

/// Conditions the orchestrator (or `main`) needs to tell apart.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no API key configured; set YOUTUBE_API_KEY or pass --api-key")]
    MissingApiKey,
    #[error("no data fetched from any region ({regions}); check API key and quota")]
    NoRegionData { regions: String },
    #[error("not enough records to train and evaluate: {0} (need at least 2)")]
    InsufficientData(usize),
    #[error("insufficient label diversity: training partition only contains viral={0}")]
    InsufficientLabelDiversity(u8),
}
