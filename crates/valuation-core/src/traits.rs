use crate::{EngineError, FairValueOverride, MarketSnapshot};
use async_trait::async_trait;

/// Source of raw price history and fundamentals. May fail transiently
/// (network, rate limit, unknown symbol); the orchestrator treats any
/// failure as a per-instrument skip.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, EngineError>;
}

/// Currency conversion for display. Engine math is currency-agnostic;
/// rates are applied only at presentation boundaries.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_rate(&self, pair: &str) -> Result<f64, EngineError>;
}

/// Persistent watchlist membership
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn list_instruments(&self) -> Result<Vec<String>, EngineError>;
    async fn add_instrument(&self, symbol: &str) -> Result<(), EngineError>;
}

/// Persisted manual fair-value overrides. The engine only reads;
/// writes come from an external editing surface.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn get_override(&self, symbol: &str) -> Result<Option<FairValueOverride>, EngineError>;
    async fn set_override(&self, symbol: &str, value: f64) -> Result<(), EngineError>;
}
