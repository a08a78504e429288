//! Core business logic: rates, currencies and the dashboard state machine

pub mod config;
pub mod currency;
pub mod dashboard;
pub mod log;
pub mod rates;
pub mod runtime;

// Re-export main types for cleaner imports
pub use currency::Currency;
pub use dashboard::{DashboardState, Effect, Event};
pub use rates::{RateSource, Rates};
pub use runtime::DashboardRuntime;
