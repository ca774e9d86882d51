use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PriceMap;

/// Ticker -> number of shares, fixed for the whole test window.
///
/// Backed by a `BTreeMap` so iteration order is the ticker order, never the
/// order in which entries happened to be inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareAllocation {
    shares: BTreeMap<String, u64>,
}

impl ShareAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<S: Into<String>>(&mut self, ticker: S, shares: u64) {
        self.shares.insert(ticker.into(), shares);
    }

    pub fn get(&self, ticker: &str) -> Option<u64> {
        self.shares.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.shares.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.shares.iter().map(|(t, n)| (t.as_str(), *n))
    }

    /// True when every ticker holds zero shares (or there are no tickers).
    pub fn is_flat(&self) -> bool {
        self.shares.values().all(|n| *n == 0)
    }

    pub fn total_shares(&self) -> u64 {
        self.shares.values().sum()
    }

    /// Σ shares × price over tickers present in both maps.
    pub fn committed_capital(&self, prices: &PriceMap) -> f64 {
        self.shares
            .iter()
            .filter_map(|(t, n)| prices.get(t).map(|px| *n as f64 * px))
            .sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ShareAllocation {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut a = Self::new();
        for (t, n) in iter {
            a.set(t, n);
        }
        a
    }
}
