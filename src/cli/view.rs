use super::ui;
use crate::core::DashboardState;
use crate::core::currency::format_amount;
use comfy_table::Cell;

impl DashboardState {
    fn base(&self) -> &str {
        self.base_currency.as_deref().unwrap_or("Base")
    }

    pub fn rates_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Code"),
            ui::header_cell("Name"),
            ui::header_cell("Rate"),
        ]);

        let selected_code = self.selected.as_ref().map(|c| c.code.as_str());
        for currency in &self.currencies {
            table.add_row(vec![
                ui::code_cell(&currency.code, selected_code == Some(currency.code.as_str())),
                Cell::new(&currency.name),
                ui::rate_cell(format_amount(currency.rate)),
            ]);
        }
        table.to_string()
    }

    pub fn display(&self) -> String {
        let base = self.base();
        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("{base} to Other Currencies"), ui::StyleType::Title)
        );

        output.push_str(&format!(
            "{} {} {}\n",
            ui::style_text("Amount:", ui::StyleType::Label),
            self.amount,
            base
        ));
        if !self.search_query.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                ui::style_text("Search:", ui::StyleType::Label),
                self.search_query
            ));
        }

        if let Some(result) = &self.search_result {
            output.push_str(&format!(
                "\n{} {}  {}  {}  {}\n",
                ui::style_text("Found:", ui::StyleType::Label),
                result.code,
                result.name,
                format_amount(result.rate),
                ui::style_text("(pick to select)", ui::StyleType::Subtle)
            ));
        }

        if self.currencies.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                ui::style_text("No rates loaded", ui::StyleType::Subtle)
            ));
        } else {
            output.push('\n');
            output.push_str(&self.rates_table());
            output.push('\n');
        }

        if let Some(selected) = &self.selected {
            output.push_str(&format!(
                "\nConvert {} {} to {} ({}):\n",
                self.amount, base, selected.name, selected.code
            ));
            if let Some(converted) = self.converted_amount {
                output.push_str(&format!(
                    "{}\n",
                    ui::style_text(
                        &format!("{} {}", format_amount(converted), selected.code),
                        ui::StyleType::Value
                    )
                ));
            }
        }

        if let Some(updated_at) = self.updated_at {
            output.push_str(&format!(
                "\n{}\n",
                ui::style_text(
                    &format!("Rates updated {}", updated_at.format("%Y-%m-%d %H:%M UTC")),
                    ui::StyleType::Subtle
                )
            ));
        }
        if let Some(error) = &self.last_error {
            output.push_str(&format!(
                "{}\n",
                ui::style_text(error, ui::StyleType::Error)
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use crate::core::dashboard::{DashboardState, Event, reduce};
    use crate::core::rates::Rates;
    use std::collections::HashMap;

    fn render(state: &DashboardState) -> String {
        console::strip_ansi_codes(&state.display()).to_string()
    }

    #[test]
    fn test_display_before_load() {
        let output = render(&DashboardState::default());
        assert!(output.contains("Base to Other Currencies"));
        assert!(output.contains("No rates loaded"));
    }

    #[test]
    fn test_display_with_conversion() {
        let rates = Rates::new(
            "INR",
            HashMap::from([("USD".to_string(), 83.1), ("EUR".to_string(), 0.011)]),
        );
        let state = [
            Event::RatesLoaded(Ok(rates)),
            Event::AmountChanged("100".to_string()),
            Event::Selected("USD".to_string()),
            Event::Convert,
        ]
        .into_iter()
        .fold(DashboardState::default(), |s, e| reduce(s, e).0);

        let output = render(&state);
        assert!(output.contains("INR to Other Currencies"));
        assert!(output.contains("United States Dollar"));
        assert!(output.contains("83.10"));
        assert!(output.contains("0.01"));
        assert!(output.contains("Convert 100 INR to United States Dollar (USD):"));
        assert!(output.contains("8310.00 USD"));
    }

    #[test]
    fn test_display_shows_error() {
        let (state, _) = reduce(
            DashboardState::default(),
            Event::RatesLoaded(Err("HTTP error: 500".to_string())),
        );
        assert!(render(&state).contains("HTTP error: 500"));
    }
}
