//! Pure signal generation: maps (price, fair value, RSI, margin of
//! safety) to a categorical trading signal. Same inputs always yield
//! the same output; no hidden state.

use serde::{Deserialize, Serialize};
use valuation_core::{EngineError, Signal};

/// RSI below this confirms a Buy; above it a discounted price only
/// rates a Watch
const BUY_RSI_CEILING: f64 = 40.0;

/// Tranche discounts off the all-time high
const TRANCHE_1_DISCOUNT: f64 = 0.10;
const TRANCHE_2_DISCOUNT: f64 = 0.20;

/// Fractional discount below fair value required before a Buy signal,
/// validated to lie strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginOfSafety(f64);

impl MarginOfSafety {
    pub fn new(margin: f64) -> Result<Self, EngineError> {
        if !(margin > 0.0 && margin < 1.0) {
            return Err(EngineError::Configuration(format!(
                "margin of safety {} must lie strictly between 0 and 1",
                margin
            )));
        }
        Ok(Self(margin))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for MarginOfSafety {
    fn default() -> Self {
        Self(0.15)
    }
}

/// Signal ladder:
/// price <= fv*(1-m) and RSI < 40  => Buy
/// price <= fv*(1+m) otherwise     => Watch
/// everything else                 => Wait
pub fn generate_signal(price: f64, fair_value: f64, rsi: f64, margin: MarginOfSafety) -> Signal {
    let buy_limit = fair_value * (1.0 - margin.value());
    let watch_limit = fair_value * (1.0 + margin.value());

    if price <= buy_limit && rsi < BUY_RSI_CEILING {
        Signal::Buy
    } else if price <= watch_limit {
        Signal::Watch
    } else {
        Signal::Wait
    }
}

/// Percentage upside of fair value over price
pub fn upside_pct(price: f64, fair_value: f64) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    (fair_value / price - 1.0) * 100.0
}

/// Accumulation tranches anchored to the all-time high: first entry
/// 10% below it, second entry 20% below it.
pub fn entry_tranches(all_time_high: f64) -> (f64, f64) {
    (
        all_time_high * (1.0 - TRANCHE_1_DISCOUNT),
        all_time_high * (1.0 - TRANCHE_2_DISCOUNT),
    )
}
