//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Rates for one base currency, as returned by a single fetch.
///
/// Each value is the number of units of that currency per one unit of the
/// base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Rates {
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Rates {
    pub fn new(base_currency: &str, rates: HashMap<String, f64>) -> Self {
        Rates {
            base_currency: base_currency.to_uppercase(),
            rates,
            updated_at: None,
        }
    }

    /// Looks up a usable rate for `code`, ignoring case.
    ///
    /// Zero, negative and non-finite values are treated as absent.
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<Rates>;
}
