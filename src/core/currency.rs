//! Currency entries and the static display-name table

use super::rates::Rates;

/// Label used for a searched code that has a rate but no display name.
pub const UNKNOWN_CURRENCY: &str = "Unknown Currency";

/// Codes shown on the dashboard, in display order.
pub const CURRENCY_NAMES: [(&str, &str); 10] = [
    ("USD", "United States Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("SEK", "Swedish Krona"),
    ("NZD", "New Zealand Dollar"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub rate: f64,
}

impl Currency {
    /// Converts `amount` of the base currency into this currency.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

pub fn display_name(code: &str) -> Option<&'static str> {
    CURRENCY_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Joins the static table against `rates`. Codes without a usable rate are
/// left out rather than shown with an empty value.
pub fn build_display_list(rates: &Rates) -> Vec<Currency> {
    CURRENCY_NAMES
        .iter()
        .filter_map(|(code, name)| {
            rates.get(code).map(|rate| Currency {
                code: code.to_string(),
                name: name.to_string(),
                rate,
            })
        })
        .collect()
}

/// Looks up `query` in `rates`. Returns `None` for a blank query or a code
/// with no usable rate.
pub fn lookup(rates: &Rates, query: &str) -> Option<Currency> {
    let code = query.trim().to_uppercase();
    if code.is_empty() {
        return None;
    }
    let rate = rates.get(&code)?;
    let name = display_name(&code).unwrap_or(UNKNOWN_CURRENCY).to_string();
    Some(Currency { code, name, rate })
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
