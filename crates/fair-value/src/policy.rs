use serde::{Deserialize, Serialize};

/// Named valuation constants. Every heuristic the methods rely on
/// lives here with a documented default, so an alternate policy can be
/// injected without touching the algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationPolicy {
    /// Safety haircut applied to the multiple-based upper bound
    pub haircut: f64,
    /// Growth rate assumed when fundamentals carry none
    pub growth_default: f64,
    /// Upper clamp on any growth rate fed into a projection
    pub growth_cap: f64,
    /// Compounding horizon for the multiple-based projection (years)
    pub multiple_horizon_years: u32,
    /// Projection horizon for the DCF (years)
    pub dcf_horizon_years: u32,
    /// Required return (k) for the dividend-discount model
    pub required_return: f64,
    /// WACC-like discount rate for the DCF
    pub discount_rate: f64,
    /// Perpetuity growth used for the DCF terminal value
    pub terminal_growth: f64,
    /// Upper clamp on the dividend growth fed into the Gordon model;
    /// must stay below required_return for the model to apply
    pub dividend_growth_cap: f64,
    /// Cash-flow multiple as a fraction of the earnings multiple
    pub cash_flow_multiple_factor: f64,
    /// P/E assumed when fundamentals carry neither forward nor trailing
    pub pe_default: f64,
    /// Upper clamp on any instrument-reported earnings multiple
    pub pe_cap: f64,
    /// Fraction of current price used when no method is applicable
    pub fallback_price_fraction: f64,
}

impl Default for ValuationPolicy {
    fn default() -> Self {
        Self {
            haircut: 0.20,
            growth_default: 0.10,
            growth_cap: 0.25,
            multiple_horizon_years: 5,
            dcf_horizon_years: 10,
            required_return: 0.08,
            discount_rate: 0.09,
            terminal_growth: 0.03,
            dividend_growth_cap: 0.05,
            cash_flow_multiple_factor: 0.9,
            pe_default: 15.0,
            pe_cap: 40.0,
            fallback_price_fraction: 0.9,
        }
    }
}
