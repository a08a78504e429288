use super::ui;
use crate::core::{DashboardRuntime, DashboardState, Event, RateSource};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
Commands:
  amount <value>     set the amount in the base currency
  search <code>      look up a currency code
  select <code>      select a currency from the list or the search result
  pick               select the current search result
  convert [value]    convert the amount (optionally setting it first)
  refresh            reload rates from the provider
  help               show this message
  quit               exit";

#[derive(Debug, PartialEq)]
pub enum Input {
    Events(Vec<Event>),
    Help,
    Quit,
    Unknown(String),
}

/// Maps one line of user input to dashboard events.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "" => Input::Events(Vec::new()),
        "amount" | "a" => Input::Events(vec![Event::AmountChanged(arg.to_string())]),
        "search" | "s" => Input::Events(vec![
            Event::SearchChanged(arg.to_string()),
            Event::SearchSubmitted,
        ]),
        "select" => Input::Events(vec![Event::Selected(arg.to_string())]),
        "pick" | "p" => Input::Events(vec![Event::SearchResultSelected]),
        "convert" | "c" if arg.is_empty() => Input::Events(vec![Event::Convert]),
        "convert" | "c" => Input::Events(vec![
            Event::AmountChanged(arg.to_string()),
            Event::Convert,
        ]),
        "refresh" | "r" => Input::Events(vec![Event::Refresh]),
        "help" | "h" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

fn render(out: &mut impl Write, state: &DashboardState) -> Result<()> {
    writeln!(out, "\n{}", state.display())?;
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Mounts the dashboard and processes input lines until `quit` or end of input.
pub async fn run<S, R>(
    runtime: &mut DashboardRuntime<S>,
    reader: R,
    out: &mut impl Write,
) -> Result<()>
where
    S: RateSource + 'static,
    R: AsyncBufRead + Unpin,
{
    runtime.dispatch(Event::Mounted);
    let pb = ui::new_spinner("Fetching rates...");
    runtime.settle().await;
    pb.finish_and_clear();

    writeln!(out, "{}", ui::style_text(HELP, ui::StyleType::Subtle))?;
    render(out, runtime.state())?;

    let mut lines = reader.lines();
    loop {
        tokio::select! {
            biased;
            applied = runtime.apply_next_completion(), if runtime.has_pending() => {
                if applied {
                    render(out, runtime.state())?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };
                match parse_input(&line) {
                    Input::Events(events) => {
                        for event in events {
                            runtime.dispatch(event);
                        }
                    }
                    Input::Help => writeln!(out, "{HELP}")?,
                    Input::Quit => break,
                    Input::Unknown(text) => writeln!(
                        out,
                        "{}",
                        ui::style_text(&format!("Unknown command: {text}"), ui::StyleType::Error)
                    )?,
                }
                render(out, runtime.state())?;
            }
        }
    }

    runtime.settle().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::caching::tests::MockRateSource;
    use std::sync::Arc;

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("amount 250.5"),
            Input::Events(vec![Event::AmountChanged("250.5".to_string())])
        );
        assert_eq!(
            parse_input("  search   usd "),
            Input::Events(vec![
                Event::SearchChanged("usd".to_string()),
                Event::SearchSubmitted
            ])
        );
        assert_eq!(
            parse_input("convert 10"),
            Input::Events(vec![
                Event::AmountChanged("10".to_string()),
                Event::Convert
            ])
        );
        assert_eq!(parse_input("convert"), Input::Events(vec![Event::Convert]));
        assert_eq!(parse_input("PICK"), Input::Events(vec![Event::SearchResultSelected]));
        assert_eq!(parse_input(""), Input::Events(Vec::new()));
        assert_eq!(parse_input("quit"), Input::Quit);
        assert_eq!(parse_input("?"), Input::Help);
        assert_eq!(
            parse_input("launch rockets"),
            Input::Unknown("launch rockets".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_converts_selected_currency() {
        let mut runtime = DashboardRuntime::new(Arc::new(MockRateSource::default()));
        let input: &[u8] = b"amount 100\nselect usd\nconvert\nquit\n";
        let mut out = Vec::new();

        run(&mut runtime, input, &mut out).await.unwrap();

        let output = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string();
        assert!(output.contains("INR to Other Currencies"));
        assert!(output.contains("8310.00 USD"));
        assert_eq!(
            runtime.state().selected.as_ref().map(|c| c.code.as_str()),
            Some("USD")
        );
    }

    #[tokio::test]
    async fn test_run_reports_unknown_command() {
        let mut runtime = DashboardRuntime::new(Arc::new(MockRateSource::default()));
        let input: &[u8] = b"dance\n";
        let mut out = Vec::new();

        run(&mut runtime, input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Unknown command: dance"));
    }
}
