//! Single-shot commands that drive the dashboard without the interactive loop.

use super::ui;
use crate::core::currency::format_amount;
use crate::core::{DashboardRuntime, Event, RateSource};
use anyhow::{Result, anyhow, bail};

async fn mount<S: RateSource + 'static>(runtime: &mut DashboardRuntime<S>) -> Result<()> {
    runtime.dispatch(Event::Mounted);
    let pb = ui::new_spinner("Fetching rates...");
    runtime.settle().await;
    pb.finish_and_clear();

    if let Some(error) = &runtime.state().last_error {
        bail!("Failed to load rates: {error}");
    }
    Ok(())
}

async fn search<S: RateSource + 'static>(
    runtime: &mut DashboardRuntime<S>,
    code: &str,
) -> Result<()> {
    runtime.dispatch(Event::SearchChanged(code.to_string()));
    runtime.dispatch(Event::SearchSubmitted);
    runtime.settle().await;

    if let Some(error) = &runtime.state().last_error {
        bail!("Search failed: {error}");
    }
    Ok(())
}

pub async fn rates<S: RateSource + 'static>(runtime: &mut DashboardRuntime<S>) -> Result<String> {
    mount(runtime).await?;
    let state = runtime.state();
    let base = state.base_currency.as_deref().unwrap_or_default();
    Ok(format!(
        "{}\n\n{}",
        ui::style_text(&format!("{base} to Other Currencies"), ui::StyleType::Title),
        state.rates_table()
    ))
}

pub async fn lookup<S: RateSource + 'static>(
    runtime: &mut DashboardRuntime<S>,
    code: &str,
) -> Result<String> {
    search(runtime, code).await?;
    let state = runtime.state();
    Ok(match &state.search_result {
        Some(result) => format!(
            "{}  {}  {}",
            ui::style_text(&result.code, ui::StyleType::Label),
            result.name,
            format_amount(result.rate)
        ),
        None => ui::style_text(
            &format!("No rate for {}", code.trim().to_uppercase()),
            ui::StyleType::Error,
        ),
    })
}

/// Converts `amount` into `code`, picking the currency from the display list
/// or, for codes outside it, from a search.
pub async fn convert<S: RateSource + 'static>(
    runtime: &mut DashboardRuntime<S>,
    amount: &str,
    code: &str,
) -> Result<String> {
    mount(runtime).await?;

    runtime.dispatch(Event::Selected(code.to_string()));
    if runtime.state().selected.is_none() {
        search(runtime, code).await?;
        runtime.dispatch(Event::SearchResultSelected);
    }
    let selected = runtime
        .state()
        .selected
        .clone()
        .ok_or_else(|| anyhow!("No rate for {}", code.trim().to_uppercase()))?;

    runtime.dispatch(Event::AmountChanged(amount.to_string()));
    runtime.dispatch(Event::Convert);

    let converted = runtime
        .state()
        .converted_amount
        .ok_or_else(|| anyhow!("Invalid amount: {amount}"))?;
    Ok(format!(
        "{} {} = {}",
        amount.trim(),
        runtime.state().base_currency.as_deref().unwrap_or_default(),
        ui::style_text(
            &format!("{} {}", format_amount(converted), selected.code),
            ui::StyleType::Value
        )
    ))
}
