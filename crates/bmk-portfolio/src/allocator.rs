//! bmk-portfolio: allocator
//!
//! Responsibilities (pure, no IO, no broker):
//! - Buy-and-hold: spend the same capital on every ticker, whole shares only.
//! - Target weights: turn externally optimised weights into whole shares
//!   without exceeding the portfolio value.
//!
//! Design notes:
//! - Shares are purchased once at the first price of the test window and
//!   never rebalanced.
//! - Buy-and-hold leftover capital (the floor-division remainder) is NOT
//!   redistributed to other tickers. It stays uninvested.
//! - Every input ticker appears in the output, zero holdings included.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::ShareAllocation;
use crate::{PriceMap, WeightMap};

// ─── Error ───────────────────────────────────────────────────────────────────

/// Errors produced during allocation.
#[derive(Clone, Debug, PartialEq)]
pub enum AllocationError {
    /// A price is zero, negative, NaN or infinite.
    InvalidPrice { ticker: String, price: f64 },
    /// A weighted ticker has no price.
    MissingPrice { ticker: String },
    /// A target weight is negative, NaN or infinite.
    InvalidWeight { ticker: String, weight: f64 },
    /// Capital (per ticker or total) is zero, negative or not finite.
    NonPositiveCapital,
    /// No tickers to allocate.
    EmptyUniverse,
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrice { ticker, price } => {
                write!(f, "invalid price {price} for ticker '{ticker}' (must be > 0)")
            }
            Self::MissingPrice { ticker } => write!(f, "no price for ticker '{ticker}'"),
            Self::InvalidWeight { ticker, weight } => {
                write!(f, "invalid weight {weight} for ticker '{ticker}' (must be finite, >= 0)")
            }
            Self::NonPositiveCapital => write!(f, "capital must be finite and > 0"),
            Self::EmptyUniverse => write!(f, "no tickers to allocate"),
        }
    }
}

impl std::error::Error for AllocationError {}

// ─── Buy-and-hold ────────────────────────────────────────────────────────────

/// Buy-and-hold outcome with the unspent remainder made explicit.
#[derive(Clone, Debug, PartialEq)]
pub struct BuyAndHoldAllocation {
    pub allocation: ShareAllocation,
    /// Σ (capital_per_ticker − shares × price). Discarded, not reinvested.
    pub uninvested_capital: f64,
}

/// `shares[t] = floor(capital_per_ticker / initial_prices[t])` for every ticker.
///
/// The remainder of each ticker's capital is left unused; see
/// [`allocate_with_leftover`] to observe it.
pub fn allocate(
    capital_per_ticker: f64,
    initial_prices: &PriceMap,
) -> Result<ShareAllocation, AllocationError> {
    allocate_with_leftover(capital_per_ticker, initial_prices).map(|r| r.allocation)
}

/// Same as [`allocate`], also reporting the uninvested remainder.
pub fn allocate_with_leftover(
    capital_per_ticker: f64,
    initial_prices: &PriceMap,
) -> Result<BuyAndHoldAllocation, AllocationError> {
    if !(capital_per_ticker.is_finite() && capital_per_ticker > 0.0) {
        return Err(AllocationError::NonPositiveCapital);
    }
    if initial_prices.is_empty() {
        return Err(AllocationError::EmptyUniverse);
    }
    validate_prices(initial_prices)?;

    let mut allocation = ShareAllocation::new();
    let mut uninvested_capital = 0.0;

    for (ticker, price) in initial_prices {
        let shares = whole_shares(capital_per_ticker, *price);
        uninvested_capital += capital_per_ticker - shares as f64 * price;
        allocation.set(ticker.clone(), shares);
    }

    Ok(BuyAndHoldAllocation {
        allocation,
        uninvested_capital,
    })
}

// ─── Target weights ──────────────────────────────────────────────────────────

/// Discrete allocation derived from target weights.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteAllocation {
    pub allocation: ShareAllocation,
    /// total_value − committed capital (always >= 0).
    pub leftover: f64,
}

/// Convert target weights into whole shares within `total_value`.
///
/// # Algorithm (greedy, two rounds)
///
/// Weights are normalised by their sum, then tickers are visited by weight
/// descending (ticker name breaks ties).
///
/// 1. Buy `floor(w · total_value / price)` shares of each ticker, capped by
///    the cash still available.
/// 2. With what is left, repeatedly buy a single share of the affordable
///    ticker whose current value weight is furthest below target, until no
///    under-weight ticker fits the remaining cash.
///
/// Postconditions: every weighted ticker is present (0 shares included) and
/// committed capital ≤ `total_value`.
pub fn allocate_from_weights(
    weights: &WeightMap,
    prices: &PriceMap,
    total_value: f64,
) -> Result<DiscreteAllocation, AllocationError> {
    if !(total_value.is_finite() && total_value > 0.0) {
        return Err(AllocationError::NonPositiveCapital);
    }
    if weights.is_empty() {
        return Err(AllocationError::EmptyUniverse);
    }

    // ── 0. Guard inputs ──────────────────────────────────────────────────────
    let mut legs: Vec<(&str, f64, f64)> = Vec::with_capacity(weights.len());
    for (ticker, w) in weights {
        if !(w.is_finite() && *w >= 0.0) {
            return Err(AllocationError::InvalidWeight {
                ticker: ticker.clone(),
                weight: *w,
            });
        }
        let price = *prices
            .get(ticker)
            .ok_or_else(|| AllocationError::MissingPrice {
                ticker: ticker.clone(),
            })?;
        if !(price.is_finite() && price > 0.0) {
            return Err(AllocationError::InvalidPrice {
                ticker: ticker.clone(),
                price,
            });
        }
        legs.push((ticker.as_str(), *w, price));
    }

    let weight_sum: f64 = legs.iter().map(|(_, w, _)| w).sum();
    let mut shares: BTreeMap<&str, u64> = legs.iter().map(|(t, _, _)| (*t, 0)).collect();
    let mut available = total_value;

    if weight_sum > 0.0 {
        for leg in legs.iter_mut() {
            leg.1 /= weight_sum;
        }

        // ── 1. Sort by weight desc, ticker asc ───────────────────────────────
        legs.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.0.cmp(b.0),
            other => other,
        });

        // ── 2. Round one: floor of the ideal share count ─────────────────────
        for (ticker, w, price) in &legs {
            let mut n = whole_shares(w * total_value, *price);
            if n as f64 * price > available {
                n = whole_shares(available, *price);
            }
            available -= n as f64 * price;
            shares.insert(*ticker, n);
        }

        // ── 3. Round two: one share at a time into the largest deficit ───────
        loop {
            let committed: f64 = legs
                .iter()
                .map(|(t, _, px)| shares[t] as f64 * px)
                .sum();

            let mut best: Option<(usize, f64)> = None;
            for (i, (ticker, w, price)) in legs.iter().enumerate() {
                if *price > available {
                    continue;
                }
                let current = if committed > 0.0 {
                    shares[ticker] as f64 * price / committed
                } else {
                    0.0
                };
                let deficit = w - current;
                if deficit <= 0.0 {
                    continue;
                }
                if best.map_or(true, |(_, d)| deficit > d) {
                    best = Some((i, deficit));
                }
            }

            let Some((i, _)) = best else { break };
            let (ticker, _, price) = legs[i];
            if let Some(n) = shares.get_mut(ticker) {
                *n += 1;
            }
            available -= price;
        }
    }

    let allocation: ShareAllocation = shares.into_iter().collect();
    let committed = allocation.committed_capital(prices);

    Ok(DiscreteAllocation {
        allocation,
        leftover: (total_value - committed).max(0.0),
    })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn validate_prices(prices: &PriceMap) -> Result<(), AllocationError> {
    for (ticker, price) in prices {
        if !(price.is_finite() && *price > 0.0) {
            return Err(AllocationError::InvalidPrice {
                ticker: ticker.clone(),
                price: *price,
            });
        }
    }
    Ok(())
}

/// Integer division toward zero on non-negative operands.
fn whole_shares(capital: f64, price: f64) -> u64 {
    let n = (capital / price).floor();
    if n <= 0.0 {
        0
    } else {
        n as u64
    }
}
