//! bmk-portfolio
//!
//! Allocation resolver: capital + initial prices -> integer share counts.
//! - Buy-and-hold: equal capital per ticker, floor division, remainder unused
//! - Target weights: externally optimised weights -> discrete shares within budget
//! - Pure deterministic logic (no IO, no time, no broker wiring)

pub mod allocator;
mod types;

pub use allocator::{
    allocate, allocate_from_weights, allocate_with_leftover, AllocationError,
    BuyAndHoldAllocation, DiscreteAllocation,
};
pub use types::ShareAllocation;

use std::collections::BTreeMap;

/// Canonical price map type (ticker -> price).
pub type PriceMap = BTreeMap<String, f64>;

/// Canonical target-weight map type (ticker -> weight fraction).
pub type WeightMap = BTreeMap<String, f64>;

/// Helper to build a PriceMap (or WeightMap) with minimal boilerplate.
pub fn price_map<I, S>(items: I) -> PriceMap
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let mut m = PriceMap::new();
    for (ticker, px) in items {
        m.insert(ticker.into(), px);
    }
    m
}
