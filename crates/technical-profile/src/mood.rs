use crate::indicators::sma;

const MOOD_SMA_PERIOD: usize = 125;
const NEUTRAL_MOOD: u32 = 50;

/// Fear & greed proxy from a benchmark index close series: the ratio
/// of the last close to its 125-period moving average, scaled so that
/// a market trading at its average reads 50. Clamped to [0, 100];
/// returns the neutral reading when the series is too short.
pub fn fear_greed_proxy(index_closes: &[f64]) -> u32 {
    let Some(avg) = sma(index_closes, MOOD_SMA_PERIOD).last().copied() else {
        return NEUTRAL_MOOD;
    };
    if avg <= 0.0 {
        return NEUTRAL_MOOD;
    }

    let current = match index_closes.last() {
        Some(&c) => c,
        None => return NEUTRAL_MOOD,
    };

    ((current / avg) * 50.0).clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_when_series_too_short() {
        assert_eq!(fear_greed_proxy(&[100.0; 50]), 50);
        assert_eq!(fear_greed_proxy(&[]), 50);
    }

    #[test]
    fn test_flat_market_reads_neutral() {
        assert_eq!(fear_greed_proxy(&[100.0; 200]), 50);
    }

    #[test]
    fn test_rally_reads_greedy() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        assert!(fear_greed_proxy(&closes) > 55);
    }

    #[test]
    fn test_selloff_reads_fearful_and_bounded() {
        let closes: Vec<f64> = (0..200).map(|i| 300.0 - i as f64).collect();
        let mood = fear_greed_proxy(&closes);
        assert!(mood < 45);
    }
}
