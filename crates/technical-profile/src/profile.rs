use serde::{Deserialize, Serialize};
use valuation_core::{Bar, EngineError, TechnicalProfile, Trend, VolumePressure};

use crate::indicators::{rolling_drawdowns, rsi, sma};

/// Windows and thresholds for the technical profile. Injected rather
/// than hard-coded so alternate policies can be swapped in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub rsi_period: usize,
    pub trend_period: usize,
    pub volume_lookback: usize,
    pub buy_pressure_ratio: f64,
    pub sell_pressure_ratio: f64,
    /// Drawdowns shallower than this (percent) are treated as noise
    pub drawdown_threshold_pct: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            trend_period: 200,
            volume_lookback: 20,
            buy_pressure_ratio: 1.5,
            sell_pressure_ratio: 0.8,
            drawdown_threshold_pct: -10.0,
        }
    }
}

/// Derives a TechnicalProfile from a price series
pub struct TechnicalProfileCalculator {
    config: ProfileConfig,
}

impl Default for TechnicalProfileCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnicalProfileCalculator {
    pub fn new() -> Self {
        Self {
            config: ProfileConfig::default(),
        }
    }

    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Compute the profile. Needs at least rsi_period + 1 bars; a
    /// series shorter than trend_period disables the trend signal
    /// instead of failing. Numeric degeneracies (zero denominators,
    /// empty windows) yield documented defaults, never a panic.
    pub fn profile(&self, bars: &[Bar]) -> Result<TechnicalProfile, EngineError> {
        if bars.len() < self.config.rsi_period + 1 {
            return Err(EngineError::DataUnavailable(format!(
                "need at least {} bars for RSI({}), got {}",
                self.config.rsi_period + 1,
                self.config.rsi_period,
                bars.len()
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let current = *closes.last().unwrap_or(&0.0);

        let rsi_14 = rsi(&closes, self.config.rsi_period)
            .last()
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        let sma_200 = sma(&closes, self.config.trend_period).last().copied();
        let trend = match sma_200 {
            Some(avg) if current > avg => Trend::Bullish,
            Some(_) => Trend::Bearish,
            None => Trend::Unknown,
        };

        let volume_pressure = self.volume_pressure(bars);

        let all_time_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let correction_pct = if all_time_high > 0.0 {
            ((current / all_time_high) - 1.0) * 100.0
        } else {
            0.0
        }
        .min(0.0);

        let avg_drawdown_pct = self.average_drawdown(&closes);

        Ok(TechnicalProfile {
            rsi_14,
            trend,
            sma_200,
            volume_pressure,
            all_time_high,
            correction_pct,
            avg_drawdown_pct,
        })
    }

    /// Most recent volume against the mean of the trailing window
    fn volume_pressure(&self, bars: &[Bar]) -> VolumePressure {
        let lookback = self.config.volume_lookback.min(bars.len());
        if lookback == 0 {
            return VolumePressure::Normal;
        }

        let tail = &bars[bars.len() - lookback..];
        let mean_volume = tail.iter().map(|b| b.volume).sum::<f64>() / lookback as f64;
        if mean_volume <= 0.0 {
            return VolumePressure::Normal;
        }

        let last_volume = bars[bars.len() - 1].volume;
        let ratio = last_volume / mean_volume;

        if ratio > self.config.buy_pressure_ratio {
            VolumePressure::BuyPressure
        } else if ratio < self.config.sell_pressure_ratio {
            VolumePressure::SellPressure
        } else {
            VolumePressure::Normal
        }
    }

    /// Mean of drawdowns deeper than the noise threshold, in percent.
    /// 0 when no drawdown qualifies.
    fn average_drawdown(&self, closes: &[f64]) -> f64 {
        let qualifying: Vec<f64> = rolling_drawdowns(closes)
            .into_iter()
            .map(|dd| dd * 100.0)
            .filter(|dd| *dd < self.config.drawdown_threshold_pct)
            .collect();

        if qualifying.is_empty() {
            return 0.0;
        }
        qualifying.iter().sum::<f64>() / qualifying.len() as f64
    }
}
