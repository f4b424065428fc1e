use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Fundamentals missing: {0}")]
    FundamentalsMissing(String),

    #[error("Degenerate valuation: {0}")]
    DegenerateValuation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Cache error: {0}")]
    Cache(String),
}
