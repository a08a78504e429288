use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::config::AppConfig;
use crate::core::rates::{RateSource, Rates};

/// Client for the exchangerate-api.com `latest` endpoint.
pub struct ExchangeRateApiProvider {
    url: String,
    base_currency: String,
}

impl ExchangeRateApiProvider {
    /// `url` is the fully expanded endpoint, API key included.
    pub fn new(url: &str, base_currency: &str) -> Self {
        ExchangeRateApiProvider {
            url: url.to_string(),
            base_currency: base_currency.to_uppercase(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(&config.endpoint_url()?, &config.base_currency))
    }

    /// The request URL carries the API key, so it is stripped from transport errors.
    fn transport_error(&self, context: &str, e: reqwest::Error) -> anyhow::Error {
        anyhow!(
            "{}: {} for base currency: {}",
            context,
            e.without_url(),
            self.base_currency
        )
    }
}

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(alias = "error-type")]
    error_type: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    conversion_rates: Option<HashMap<String, f64>>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    #[serde(alias = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(base = %self.base_currency)
    )]
    async fn fetch_rates(&self) -> Result<Rates> {
        debug!("Requesting latest rates");

        let client = reqwest::Client::builder().user_agent("fxdash/0.1").build()?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error("Request error", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error("Failed to read response", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error_type)
                .map(|t| format!(" ({t})"))
                .unwrap_or_default();
            return Err(anyhow!(
                "HTTP error: {}{} for base currency: {}",
                status,
                detail,
                self.base_currency
            ));
        }

        let data: LatestRatesResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow!(
                "Failed to parse JSON response for {}: {}",
                self.base_currency,
                e
            )
        })?;

        if data.result.as_deref() == Some("error") {
            return Err(anyhow!(
                "Provider error: {} for base currency: {}",
                data.error_type.as_deref().unwrap_or("unknown"),
                self.base_currency
            ));
        }

        let conversion_rates = data.conversion_rates.ok_or_else(|| {
            anyhow!(
                "No conversion rates found for base currency: {}",
                self.base_currency
            )
        })?;
        debug!(count = conversion_rates.len(), "Received rates");

        let base = data.base_code.as_deref().unwrap_or(&self.base_currency);
        let mut rates = Rates::new(base, conversion_rates);
        rates.updated_at = data
            .time_last_update_unix
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATES_PATH: &str = "/v6/test-key/latest/INR";

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RATES_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider_for(mock_server: &MockServer) -> ExchangeRateApiProvider {
        ExchangeRateApiProvider::new(&format!("{}{}", mock_server.uri(), RATES_PATH), "INR")
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "INR",
            "time_last_update_unix": 1700000000,
            "conversion_rates": {
                "INR": 1,
                "USD": 0.012,
                "EUR": 0.011
            }
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;

        let rates = provider_for(&mock_server).fetch_rates().await.unwrap();
        assert_eq!(rates.base_currency, "INR");
        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get("USD"), Some(0.012));
        assert_eq!(
            rates.updated_at,
            Utc.timestamp_opt(1_700_000_000, 0).single()
        );
    }

    #[tokio::test]
    async fn test_only_conversion_rates_required() {
        let mock_server = create_mock_server(200, r#"{"conversion_rates": {"USD": 0.012}}"#).await;

        let rates = provider_for(&mock_server).fetch_rates().await.unwrap();
        assert_eq!(rates.base_currency, "INR");
        assert!(rates.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let mock_server = create_mock_server(500, "").await;

        let result = provider_for(&mock_server).fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for base currency: INR"
        );
    }

    #[tokio::test]
    async fn test_http_error_with_error_type() {
        let mock_server =
            create_mock_server(403, r#"{"result": "error", "error-type": "invalid-key"}"#).await;

        let result = provider_for(&mock_server).fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 403 Forbidden (invalid-key) for base currency: INR"
        );
    }

    #[tokio::test]
    async fn test_provider_error_payload() {
        let mock_server =
            create_mock_server(200, r#"{"result": "error", "error-type": "quota-reached"}"#).await;

        let result = provider_for(&mock_server).fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Provider error: quota-reached for base currency: INR"
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider = ExchangeRateApiProvider::new(
            &format!("http://127.0.0.1:{port}/v6/secret-key/latest/INR"),
            "INR",
        );
        let err = provider.fetch_rates().await.unwrap_err().to_string();
        assert!(err.starts_with("Request error: "), "{err}");
        assert!(err.ends_with("for base currency: INR"), "{err}");
        assert!(!err.contains("secret-key"), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(200, r#"{"conversion_rates": ["USD"]}"#).await;

        let result = provider_for(&mock_server).fetch_rates().await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for INR")
        );
    }

    #[tokio::test]
    async fn test_missing_conversion_rates() {
        let mock_server = create_mock_server(200, r#"{"result": "success"}"#).await;

        let result = provider_for(&mock_server).fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No conversion rates found for base currency: INR"
        );
    }
}
