pub mod cli;
pub mod core;
pub mod providers;

use crate::core::DashboardRuntime;
use crate::core::config::AppConfig;
use crate::providers::exchange_rate_api::ExchangeRateApiProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Dashboard,
    Rates,
    Search { code: String },
    Convert { amount: String, code: String },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_with_env(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_currency = %config.base_currency,
        has_api_key = config.provider.api_key.is_some(),
        "Loaded config"
    );
    Ok(config)
}

/// Builds a dashboard runtime backed by the configured rate provider.
pub fn build_runtime(config: &AppConfig) -> Result<DashboardRuntime<ExchangeRateApiProvider>> {
    let provider = ExchangeRateApiProvider::from_config(config)?;
    Ok(DashboardRuntime::new(provider))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxdash starting...");

    let config = load_config(config_path)?;
    let mut runtime = build_runtime(&config)?;

    match command {
        AppCommand::Dashboard => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            cli::dashboard::run(&mut runtime, stdin, &mut stdout).await
        }
        AppCommand::Rates => {
            println!("{}", cli::oneshot::rates(&mut runtime).await?);
            Ok(())
        }
        AppCommand::Search { code } => {
            println!("{}", cli::oneshot::lookup(&mut runtime, &code).await?);
            Ok(())
        }
        AppCommand::Convert { amount, code } => {
            println!(
                "{}",
                cli::oneshot::convert(&mut runtime, &amount, &code).await?
            );
            Ok(())
        }
    }
}
