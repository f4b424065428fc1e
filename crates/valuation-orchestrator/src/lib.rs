pub mod cache;
pub mod clock;


pub use cache::SnapshotCache;
pub use clock::{Clock, SystemClock};

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use fair_value::FairValueCalculator;
use futures_util::stream::{self, StreamExt};
use signal_engine::{entry_tranches, generate_signal, upside_pct, MarginOfSafety};
use technical_profile::TechnicalProfileCalculator;
use valuation_core::{
    validate_symbol, CombinationRule, EngineError, ExchangeRateProvider, FairValue,
    MarketDataProvider, MarketSnapshot, OverrideStore, RankedResult, WatchlistStore,
};

/// Operator-facing engine configuration. Invalid values are rejected
/// at construction, before any fetch is attempted.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub margin: MarginOfSafety,
    /// How long a fetched snapshot stays fresh
    pub snapshot_ttl: Duration,
    /// Per-instrument fetch deadline
    pub fetch_timeout: StdDuration,
    /// Hard upper bound on concurrent fetches (upstream rate limits)
    pub max_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margin: MarginOfSafety::default(),
            snapshot_ttl: Duration::hours(1),
            fetch_timeout: StdDuration::from_secs(10),
            max_concurrency: 4,
        }
    }
}

/// Outcome of one watchlist pass. `results` is sorted by (rank asc,
/// upside desc, original watchlist position); `skipped` counts the
/// instruments dropped for per-instrument failures.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchOutcome {
    pub results: Vec<RankedResult>,
    pub skipped: usize,
}

impl BatchOutcome {
    /// Every instrument failed: a distinct condition, not an error
    pub fn no_data(&self) -> bool {
        self.results.is_empty() && self.skipped > 0
    }
}

/// Evaluates a watchlist: per instrument, fetch (memoized) market
/// data, derive the technical profile and fair value, apply a manual
/// override when one exists, generate the signal, then rank the whole
/// set deterministically. Per-instrument failures are skipped; the
/// batch always completes.
pub struct ValuationOrchestrator<P, O> {
    provider: P,
    overrides: O,
    profiler: TechnicalProfileCalculator,
    calculator: FairValueCalculator,
    cache: SnapshotCache,
    config: EngineConfig,
}

impl<P, O> ValuationOrchestrator<P, O>
where
    P: MarketDataProvider,
    O: OverrideStore,
{
    pub fn new(provider: P, overrides: O, config: EngineConfig) -> Self {
        let cache = SnapshotCache::new(config.snapshot_ttl, Arc::new(SystemClock));
        Self {
            provider,
            overrides,
            profiler: TechnicalProfileCalculator::new(),
            calculator: FairValueCalculator::new(),
            cache,
            config,
        }
    }

    /// Swap the cache clock (tests drive TTL expiry manually)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = SnapshotCache::new(self.config.snapshot_ttl, clock);
        self
    }

    pub fn with_profiler(mut self, profiler: TechnicalProfileCalculator) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn with_calculator(mut self, calculator: FairValueCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Evaluate every instrument in the watchlist. Surfaces only
    /// configuration errors; data failures shrink the result set.
    pub async fn evaluate_watchlist(&self, symbols: &[String]) -> Result<BatchOutcome, EngineError> {
        // Fail fast on malformed identifiers before any fetch
        for symbol in symbols {
            validate_symbol(symbol)?;
        }

        // Unique, original order preserved
        let mut unique: Vec<&String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }

        tracing::info!("Evaluating watchlist of {} instruments", unique.len());

        let evaluations: Vec<(usize, Result<RankedResult, EngineError>)> =
            stream::iter(unique.iter().enumerate().map(|(position, symbol)| async move {
                (position, self.evaluate_symbol(symbol.as_str()).await)
            }))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let total = unique.len();
        let mut ranked: Vec<(usize, RankedResult)> = Vec::with_capacity(total);
        for (position, evaluation) in evaluations {
            match evaluation {
                Ok(result) => ranked.push((position, result)),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", unique[position], e);
                }
            }
        }

        // Deterministic order: rank asc, upside desc, watchlist
        // position as the stable tie-break. Fetch completion order
        // never leaks into the output.
        ranked.sort_by(|(pos_a, a), (pos_b, b)| {
            a.rank
                .cmp(&b.rank)
                .then(
                    b.upside_pct
                        .partial_cmp(&a.upside_pct)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(pos_a.cmp(pos_b))
        });

        let results: Vec<RankedResult> = ranked.into_iter().map(|(_, r)| r).collect();
        let skipped = total - results.len();
        if skipped > 0 {
            tracing::warn!("Batch completed with {} of {} instruments skipped", skipped, total);
        }

        Ok(BatchOutcome { results, skipped })
    }

    /// Convenience pass over a persisted watchlist
    pub async fn evaluate_from_store<W: WatchlistStore>(
        &self,
        watchlist: &W,
    ) -> Result<BatchOutcome, EngineError> {
        let symbols = watchlist.list_instruments().await?;
        self.evaluate_watchlist(&symbols).await
    }

    /// Evaluate a single instrument end to end
    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<RankedResult, EngineError> {
        validate_symbol(symbol)?;

        let snapshot = self.snapshot(symbol).await?;
        let price = snapshot
            .last_close()
            .ok_or_else(|| EngineError::DataUnavailable(format!("{}: no closing price", symbol)))?;

        let profile = self.profiler.profile(&snapshot.bars)?;
        let computed = self.calculator.fair_value(&snapshot.fundamentals, price);
        if computed.is_degraded() {
            tracing::debug!("{}: no valuation method applicable, using price fallback", symbol);
        }
        let fair_value = self.resolve_override(symbol, computed).await;

        let signal = generate_signal(price, fair_value.value, profile.rsi_14, self.config.margin);
        let upside = upside_pct(price, fair_value.value);
        let (tranche_1, tranche_2) = entry_tranches(profile.all_time_high);

        Ok(RankedResult {
            symbol: symbol.to_string(),
            price,
            upside_pct: upside,
            rank: signal.rank(),
            signal,
            fair_value,
            profile,
            tranche_1,
            tranche_2,
        })
    }

    /// Memoized snapshot fetch with per-instrument timeout
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, EngineError> {
        if let Some(snapshot) = self.cache.get(symbol) {
            tracing::debug!("Cache hit for {}", symbol);
            return Ok(snapshot);
        }

        let fetched = tokio::time::timeout(
            self.config.fetch_timeout,
            self.provider.fetch_snapshot(symbol),
        )
        .await
        .map_err(|_| EngineError::DataUnavailable(format!("{}: fetch timed out", symbol)))??;

        fetched.validate()?;
        self.cache.insert(symbol, fetched.clone());
        Ok(fetched)
    }

    /// A persisted positive override supersedes the computed estimate
    /// entirely; anything else passes the computed value through.
    async fn resolve_override(&self, symbol: &str, computed: FairValue) -> FairValue {
        match self.overrides.get_override(symbol).await {
            Ok(Some(stored)) if stored.fair_value > 0.0 => FairValue {
                value: stored.fair_value,
                currency: computed.currency,
                methods: vec![],
                combination: CombinationRule::ManualOverride,
            },
            Ok(_) => computed,
            Err(e) => {
                tracing::warn!("Override lookup failed for {}: {}", symbol, e);
                computed
            }
        }
    }

    /// Accessor for the underlying provider (used by callers that
    /// need out-of-band fetches, and by tests)
    pub fn provider_ref(&self) -> &P {
        &self.provider
    }

    /// Idempotent manual invalidation; the next pass re-fetches
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Snapshot cache cleared");
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Convert an engine value into a display currency. The engine's own
/// math is currency-agnostic; this belongs to the presentation
/// boundary only.
pub async fn convert_display<R: ExchangeRateProvider>(
    rates: &R,
    pair: &str,
    value: f64,
) -> Result<f64, EngineError> {
    let rate = rates.fetch_rate(pair).await?;
    Ok(value * rate)
}
