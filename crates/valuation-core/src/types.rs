use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// OHLCV bar data (one trading day)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Fundamental inputs for valuation. Any field may be absent; methods
/// fall back to documented defaults instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub eps_trailing: Option<f64>,
    pub eps_forward: Option<f64>,
    pub pe_trailing: Option<f64>,
    pub pe_forward: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub book_value: Option<f64>,
    pub net_income: Option<f64>,
    pub current_price: Option<f64>,
}

/// Full history plus fundamentals for one instrument, owned by a
/// single evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub fundamentals: Fundamentals,
}

impl MarketSnapshot {
    /// Enforce the series invariant: non-empty, strictly ascending by date.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.bars.is_empty() {
            return Err(EngineError::DataUnavailable(format!(
                "{}: empty price history",
                self.symbol
            )));
        }
        for window in self.bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(EngineError::DataUnavailable(format!(
                    "{}: price history not strictly ordered at {}",
                    self.symbol, window[1].date
                )));
            }
        }
        Ok(())
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}

/// A single valuation method's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationMethod {
    MultipleBased,
    CashFlowBased,
    DividendDiscount,
    DiscountedCashFlow,
}

impl ValuationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ValuationMethod::MultipleBased => "Earnings Multiple",
            ValuationMethod::CashFlowBased => "Cash Flow Multiple",
            ValuationMethod::DividendDiscount => "Dividend Discount",
            ValuationMethod::DiscountedCashFlow => "Discounted Cash Flow",
        }
    }
}

/// One method's output. A value of 0 means "not applicable", never
/// "instrument worthless".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationEstimate {
    pub method: ValuationMethod,
    pub value: f64,
}

impl ValuationEstimate {
    pub fn not_applicable(method: ValuationMethod) -> Self {
        Self { method, value: 0.0 }
    }

    pub fn is_applicable(&self) -> bool {
        self.value > 0.0
    }
}

/// How the contributing estimates were merged into a FairValue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationRule {
    /// Mean of two or more applicable methods
    Average,
    /// Only one method was applicable
    Single,
    /// No method applicable: fixed fraction of current price (degraded)
    PriceFallback,
    /// A persisted manual override superseded the computed estimate
    ManualOverride,
}

/// Combined fair-value estimate for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValue {
    pub value: f64,
    pub currency: String,
    pub methods: Vec<ValuationMethod>,
    pub combination: CombinationRule,
}

impl FairValue {
    pub fn is_degraded(&self) -> bool {
        self.combination == CombinationRule::PriceFallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Unknown,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Bullish => "Bull",
            Trend::Bearish => "Bear",
            Trend::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumePressure {
    BuyPressure,
    SellPressure,
    Normal,
}

impl VolumePressure {
    pub fn label(&self) -> &'static str {
        match self {
            VolumePressure::BuyPressure => "Buy Pressure",
            VolumePressure::SellPressure => "Sell Pressure",
            VolumePressure::Normal => "Normal",
        }
    }
}

/// Technical read of one instrument's price history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalProfile {
    /// RSI(14), always in [0, 100]
    pub rsi_14: f64,
    pub trend: Trend,
    /// Long moving average; None when fewer than 200 observations exist
    pub sma_200: Option<f64>,
    pub volume_pressure: VolumePressure,
    pub all_time_high: f64,
    /// Distance from the all-time high in percent, always <= 0
    pub correction_pct: f64,
    /// Mean of historical drawdowns deeper than the noise threshold,
    /// in percent, always <= 0 (0 when no qualifying drawdown exists)
    pub avg_drawdown_pct: f64,
}

/// Categorical trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Watch,
    Wait,
}

impl Signal {
    /// Sort rank: lower is more actionable
    pub fn rank(&self) -> u8 {
        match self {
            Signal::Buy => 1,
            Signal::Watch => 2,
            Signal::Wait => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Watch => "Watch",
            Signal::Wait => "Wait",
        }
    }
}

/// One fully evaluated watchlist entry. Built fresh per pass, never
/// mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub symbol: String,
    pub price: f64,
    pub fair_value: FairValue,
    pub profile: TechnicalProfile,
    pub upside_pct: f64,
    pub signal: Signal,
    pub rank: u8,
    /// First accumulation tranche (10% off the all-time high)
    pub tranche_1: f64,
    /// Second accumulation tranche (20% off the all-time high)
    pub tranche_2: f64,
}

/// Persisted manual fair value, read-only input to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueOverride {
    pub symbol: String,
    pub fair_value: f64,
    pub updated_at: DateTime<Utc>,
}

const SYMBOL_MAX_LEN: usize = 10;

/// Ticker symbols are uppercase, 1-10 characters, ASCII alphanumeric
/// plus '.' and '-'. Rejected before any fetch is attempted.
pub fn validate_symbol(symbol: &str) -> Result<(), EngineError> {
    if symbol.is_empty() || symbol.len() > SYMBOL_MAX_LEN {
        return Err(EngineError::Configuration(format!(
            "symbol '{}' must be 1-{} characters",
            symbol, SYMBOL_MAX_LEN
        )));
    }
    let valid = symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    if !valid {
        return Err(EngineError::Configuration(format!(
            "symbol '{}' must be uppercase ASCII alphanumeric",
            symbol
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000.0,
        }
    }

    #[test]
    fn test_validate_symbol_accepts_tickers() {
        for s in ["AAPL", "BRK.B", "MSFT", "A", "0700.HK"] {
            assert!(validate_symbol(s).is_ok(), "{} should be valid", s);
        }
    }

    #[test]
    fn test_validate_symbol_rejects_bad_input() {
        for s in ["", "aapl", "TOOLONGTICKER", "AA PL", "AB$"] {
            assert!(
                matches!(validate_symbol(s), Err(EngineError::Configuration(_))),
                "{} should be rejected",
                s
            );
        }
    }

    #[test]
    fn test_snapshot_validate_rejects_empty_series() {
        let snapshot = MarketSnapshot {
            symbol: "AAPL".to_string(),
            bars: vec![],
            fundamentals: Fundamentals::default(),
        };
        assert!(matches!(
            snapshot.validate(),
            Err(EngineError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_snapshot_validate_rejects_unordered_series() {
        let snapshot = MarketSnapshot {
            symbol: "AAPL".to_string(),
            bars: vec![bar("2024-01-03", 100.0), bar("2024-01-02", 101.0)],
            fundamentals: Fundamentals::default(),
        };
        assert!(snapshot.validate().is_err());

        // Duplicate dates violate strict ordering too
        let snapshot = MarketSnapshot {
            symbol: "AAPL".to_string(),
            bars: vec![bar("2024-01-02", 100.0), bar("2024-01-02", 101.0)],
            fundamentals: Fundamentals::default(),
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_snapshot_validate_accepts_ordered_series() {
        let snapshot = MarketSnapshot {
            symbol: "AAPL".to_string(),
            bars: vec![bar("2024-01-02", 100.0), bar("2024-01-03", 101.0)],
            fundamentals: Fundamentals::default(),
        };
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.last_close(), Some(101.0));
    }

    #[test]
    fn test_signal_rank_ordering() {
        assert_eq!(Signal::Buy.rank(), 1);
        assert_eq!(Signal::Watch.rank(), 2);
        assert_eq!(Signal::Wait.rank(), 3);
    }

    #[test]
    fn test_estimate_applicability() {
        let estimate = ValuationEstimate::not_applicable(ValuationMethod::MultipleBased);
        assert!(!estimate.is_applicable());
        assert_eq!(estimate.value, 0.0);
    }
}
