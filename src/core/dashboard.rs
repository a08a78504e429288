//! Dashboard state and the reducer that drives it.
//!
//! All UI state lives in [`DashboardState`]. User actions and fetch
//! completions arrive as [`Event`]s and [`reduce`] maps `(state, event)` to the
//! next state plus, at most, one [`Effect`] for the runtime to execute.

use super::currency::{self, Currency};
use super::rates::Rates;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub mounted: bool,
    /// Raw amount text in the base currency; parsed only on convert.
    pub amount: String,
    pub search_query: String,
    pub base_currency: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub currencies: Vec<Currency>,
    pub selected: Option<Currency>,
    pub search_result: Option<Currency>,
    pub converted_amount: Option<f64>,
    pub last_error: Option<String>,
    /// Sequence number of the latest search submission.
    pub search_seq: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState {
            mounted: false,
            amount: "0".to_string(),
            search_query: String::new(),
            base_currency: None,
            updated_at: None,
            currencies: Vec::new(),
            selected: None,
            search_result: None,
            converted_amount: None,
            last_error: None,
            search_seq: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Mounted,
    RatesLoaded(Result<Rates, String>),
    AmountChanged(String),
    SearchChanged(String),
    SearchSubmitted,
    SearchCompleted {
        seq: u64,
        query: String,
        outcome: Result<Rates, String>,
    },
    /// Pick a currency by code from the display list or the search result.
    Selected(String),
    SearchResultSelected,
    Convert,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadRates,
    Search { seq: u64, query: String },
    Reload,
}

pub fn reduce(mut state: DashboardState, event: Event) -> (DashboardState, Option<Effect>) {
    match event {
        Event::Mounted => {
            if state.mounted {
                debug!("Dashboard already mounted");
                return (state, None);
            }
            state.mounted = true;
            (state, Some(Effect::LoadRates))
        }
        Event::RatesLoaded(Ok(rates)) => {
            state.currencies = currency::build_display_list(&rates);
            debug!(
                shown = state.currencies.len(),
                received = rates.len(),
                "Built display list"
            );
            state.base_currency = Some(rates.base_currency);
            state.updated_at = rates.updated_at;
            state.last_error = None;
            (state, None)
        }
        Event::RatesLoaded(Err(e)) => {
            warn!(error = %e, "Failed to load rates");
            state.last_error = Some(e);
            (state, None)
        }
        Event::AmountChanged(amount) => {
            state.amount = amount;
            (state, None)
        }
        Event::SearchChanged(query) => {
            state.search_query = query;
            (state, None)
        }
        Event::SearchSubmitted => {
            let query = state.search_query.trim().to_string();
            if query.is_empty() {
                return (state, None);
            }
            state.search_seq += 1;
            let seq = state.search_seq;
            (state, Some(Effect::Search { seq, query }))
        }
        Event::SearchCompleted {
            seq,
            query,
            outcome,
        } => {
            if seq != state.search_seq {
                debug!(seq, latest = state.search_seq, %query, "Discarding stale search");
                return (state, None);
            }
            match outcome {
                Ok(rates) => {
                    state.search_result = currency::lookup(&rates, &query);
                    state.last_error = None;
                }
                Err(e) => {
                    warn!(error = %e, %query, "Search failed");
                    state.last_error = Some(e);
                }
            }
            (state, None)
        }
        Event::Selected(code) => {
            let found = state
                .currencies
                .iter()
                .chain(state.search_result.iter())
                .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
                .cloned();
            match found {
                Some(c) => state.selected = Some(c),
                None => debug!(%code, "Ignoring selection of a currency not on screen"),
            }
            (state, None)
        }
        Event::SearchResultSelected => {
            if let Some(result) = &state.search_result {
                state.selected = Some(result.clone());
            }
            (state, None)
        }
        Event::Convert => {
            if state.amount.is_empty() {
                return (state, None);
            }
            let Some(selected) = &state.selected else {
                return (state, None);
            };
            state.converted_amount = parse_amount(&state.amount).map(|a| selected.convert(a));
            (state, None)
        }
        Event::Refresh => (state, Some(Effect::Reload)),
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|a| a.is_finite())
}
