use serde::{Deserialize, Serialize};
use valuation_core::{CombinationRule, FairValue, Fundamentals, ValuationEstimate, ValuationMethod};

use crate::policy::ValuationPolicy;

/// Ordered field resolution: the first present candidate wins, the
/// documented default closes the chain. Missing-field behavior is
/// declared per call site, not scattered through the formulas.
fn resolve(candidates: &[Option<f64>], default: f64) -> f64 {
    candidates.iter().find_map(|c| *c).unwrap_or(default)
}

/// Computes independent valuation estimates from fundamentals and
/// combines them into a single FairValue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueCalculator {
    policy: ValuationPolicy,
    /// Method set to run; configuration, not a fixed list
    methods: Vec<ValuationMethod>,
    /// Native currency tag carried into the FairValue
    currency: String,
}

impl Default for FairValueCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl FairValueCalculator {
    pub fn new() -> Self {
        Self {
            policy: ValuationPolicy::default(),
            methods: vec![
                ValuationMethod::MultipleBased,
                ValuationMethod::CashFlowBased,
                ValuationMethod::DividendDiscount,
                ValuationMethod::DiscountedCashFlow,
            ],
            currency: "USD".to_string(),
        }
    }

    pub fn with_policy(mut self, policy: ValuationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_methods(mut self, methods: Vec<ValuationMethod>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Run every configured method. Estimates of 0 mean "not
    /// applicable" and are excluded from combination.
    pub fn estimates(&self, fundamentals: &Fundamentals) -> Vec<ValuationEstimate> {
        self.methods
            .iter()
            .map(|method| {
                let value = match method {
                    ValuationMethod::MultipleBased => self.multiple_based(fundamentals),
                    ValuationMethod::CashFlowBased => self.cash_flow_based(fundamentals),
                    ValuationMethod::DividendDiscount => self.dividend_discount(fundamentals),
                    ValuationMethod::DiscountedCashFlow => self.discounted_cash_flow(fundamentals),
                };
                ValuationEstimate {
                    method: *method,
                    value: value.max(0.0),
                }
            })
            .collect()
    }

    /// Combine estimates into a FairValue: mean of the applicable
    /// methods, the single applicable one, or a flagged fraction of
    /// current price when nothing is applicable.
    pub fn fair_value(&self, fundamentals: &Fundamentals, current_price: f64) -> FairValue {
        let estimates = self.estimates(fundamentals);
        let applicable: Vec<&ValuationEstimate> =
            estimates.iter().filter(|e| e.is_applicable()).collect();

        match applicable.len() {
            0 => FairValue {
                value: current_price * self.policy.fallback_price_fraction,
                currency: self.currency.clone(),
                methods: vec![],
                combination: CombinationRule::PriceFallback,
            },
            1 => FairValue {
                value: applicable[0].value,
                currency: self.currency.clone(),
                methods: vec![applicable[0].method],
                combination: CombinationRule::Single,
            },
            n => FairValue {
                value: applicable.iter().map(|e| e.value).sum::<f64>() / n as f64,
                currency: self.currency.clone(),
                methods: applicable.iter().map(|e| e.method).collect(),
                combination: CombinationRule::Average,
            },
        }
    }

    /// Projected EPS times an earnings multiple, averaged with a
    /// haircut bound to stay conservative. Non-positive EPS means the
    /// method is not applicable.
    fn multiple_based(&self, f: &Fundamentals) -> f64 {
        let eps = resolve(&[f.eps_forward, f.eps_trailing], 0.0);
        if eps <= 0.0 {
            return 0.0;
        }

        let growth = self.capped_growth(f);
        let multiple = self.earnings_multiple(f);

        let projected = eps * (1.0 + growth).powi(self.policy.multiple_horizon_years as i32);
        let upper = projected * multiple;
        let conservative = upper * (1.0 - self.policy.haircut);

        (upper + conservative) / 2.0
    }

    /// Free cash flow per share times a discounted earnings multiple.
    /// Needs positive shares outstanding and positive FCF per share.
    fn cash_flow_based(&self, f: &Fundamentals) -> f64 {
        let shares = resolve(&[f.shares_outstanding], 0.0);
        if shares <= 0.0 {
            return 0.0;
        }
        let fcf_per_share = resolve(&[f.free_cash_flow], 0.0) / shares;
        if fcf_per_share <= 0.0 {
            return 0.0;
        }

        fcf_per_share * self.earnings_multiple(f) * self.policy.cash_flow_multiple_factor
    }

    /// Gordon growth model. Applicable only with a positive dividend
    /// rate and dividend growth strictly below the required return.
    fn dividend_discount(&self, f: &Fundamentals) -> f64 {
        let dividend = resolve(&[f.dividend_rate], 0.0);
        if dividend <= 0.0 {
            return 0.0;
        }

        let k = self.policy.required_return;
        let g = self.capped_growth(f).min(self.policy.dividend_growth_cap);
        if g >= k {
            return 0.0;
        }

        dividend * (1.0 + g) / (k - g)
    }

    /// Project a per-share flow over the horizon, discount each year,
    /// and add a discounted perpetuity terminal value. Degrades to a
    /// fixed-multiple estimate when the discount rate does not clear
    /// the terminal growth rate.
    fn discounted_cash_flow(&self, f: &Fundamentals) -> f64 {
        let shares = resolve(&[f.shares_outstanding], 0.0);
        let fcf_per_share = if shares > 0.0 {
            resolve(&[f.free_cash_flow], 0.0) / shares
        } else {
            0.0
        };
        // FCF per share when available, EPS as the flow proxy otherwise
        let flow = if fcf_per_share > 0.0 {
            fcf_per_share
        } else {
            resolve(&[f.eps_forward, f.eps_trailing], 0.0)
        };
        if flow <= 0.0 {
            return 0.0;
        }

        let growth = self.capped_growth(f);
        let r = self.policy.discount_rate;
        let tg = self.policy.terminal_growth;
        let years = self.policy.dcf_horizon_years as i32;

        if r <= tg {
            // Diverging perpetuity denominator
            return flow * self.policy.pe_default;
        }

        let projected: f64 = (1..=years)
            .map(|year| flow * (1.0 + growth).powi(year) / (1.0 + r).powi(year))
            .sum();
        let terminal =
            flow * (1.0 + growth).powi(years) * (1.0 + tg) / (r - tg) / (1.0 + r).powi(years);

        projected + terminal
    }

    fn capped_growth(&self, f: &Fundamentals) -> f64 {
        resolve(&[f.earnings_growth], self.policy.growth_default)
            .clamp(0.0, self.policy.growth_cap)
    }

    fn earnings_multiple(&self, f: &Fundamentals) -> f64 {
        let pe = resolve(&[f.pe_forward, f.pe_trailing], self.policy.pe_default);
        if pe <= 0.0 {
            return self.policy.pe_default;
        }
        pe.min(self.policy.pe_cap)
    }
}
