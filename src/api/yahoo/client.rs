use reqwest::Client as HttpClient;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use super::models::{Endpoint, ErrorResponse, RawPayload};
use crate::config::ProviderConfig;
use crate::models::{ChartInterval, ChartRange};
use crate::utils::errors::{FetchError, FetchErrorKind};

/// Longest slice of an error body kept in a `FetchError`
const MAX_ERROR_BODY: usize = 200;

/// Yahoo Finance client for historical price downloads
#[derive(Debug, Clone)]
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
    endpoint: Endpoint,
}

impl YahooClient {
    /// Create a new client from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let mut builder = HttpClient::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url.clone(),
            endpoint: config.endpoint,
        })
    }

    /// Create a new client with custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String, endpoint: Endpoint) -> Result<Self, reqwest::Error> {
        Self::new(&ProviderConfig {
            base_url,
            endpoint,
            ..ProviderConfig::default()
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// `{base}/{endpoint path}/{symbol}`, with the symbol percent-encoded
    fn history_url(&self, symbol: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("Base URL '{}' cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(self.endpoint.path().split('/'))
            .push(symbol);
        Ok(url)
    }

    /// Map a non-success response to a fetch error kind
    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> FetchErrorKind {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            404 => {
                debug!("Provider returned 404: {}", body_text);
                FetchErrorKind::NotFound
            }
            _ => {
                let body = serde_json::from_str::<ErrorResponse>(&body_text)
                    .ok()
                    .and_then(|e| e.description())
                    .unwrap_or_else(|| body_text.trim().chars().take(MAX_ERROR_BODY).collect());
                if status.is_server_error() {
                    warn!("Server error {}: {}", status_code, body);
                }
                FetchErrorKind::Status {
                    code: status_code,
                    body,
                }
            }
        }
    }

    /// GET the price history for `symbol`.
    ///
    /// Issues exactly one request. Some range/interval pairs are refused by
    /// Yahoo with a 404 (e.g. `1d` with `5m`); those come back as
    /// [`FetchErrorKind::NotFound`], the same as an unknown ticker.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        range: ChartRange,
        interval: ChartInterval,
    ) -> Result<RawPayload, FetchError> {
        let fail = |kind: FetchErrorKind| FetchError {
            symbol: symbol.to_string(),
            range,
            interval,
            kind,
        };

        if symbol.trim().is_empty() {
            return Err(fail(FetchErrorKind::InvalidSymbol));
        }

        let url = self
            .history_url(symbol)
            .map_err(|e| fail(FetchErrorKind::Network(e)))?;
        debug!("GET {} (range={}, interval={})", url, range, interval);

        let response = self
            .http_client
            .get(url)
            .query(&[
                ("range", range.as_str()),
                ("interval", interval.as_str()),
                ("events", "history"),
            ])
            .send()
            .await
            .map_err(|e| fail(FetchErrorKind::Network(format!("Request failed: {}", e))))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(fail(Self::handle_error_response(status, response).await));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fail(FetchErrorKind::Network(format!("Failed to read response: {}", e))))?;
        debug!("Received {} bytes for {}", body.len(), symbol);

        Ok(RawPayload {
            format: self.endpoint.format(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::yahoo::PayloadFormat;
    use crate::test_support::serve_once;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_fetch_history_returns_body() {
        let csv = "Date,Open,High,Low,Close,Adj Close,Volume\n2024-01-02,10,11,9,10.5,10.5,100\n";
        let (base_url, server) = serve_once("200 OK", csv).await;
        let client = YahooClient::with_base_url(base_url, Endpoint::Download).unwrap();

        let payload = client
            .fetch_history("SPY", ChartRange::TwoYears, ChartInterval::OneWeek)
            .await
            .unwrap();
        assert_eq!(payload.format, PayloadFormat::Csv);
        assert_eq!(payload.body, csv);

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /v7/finance/download/SPY?range=2y&interval=1wk&events=history HTTP/1.1"
        ));
        assert!(request.to_lowercase().contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_unsupported_combination_is_not_found() {
        let (base_url, server) = serve_once("404 Not Found", "404 Not Found: No data found").await;
        let client = YahooClient::with_base_url(base_url, Endpoint::Download).unwrap();

        let err = client
            .fetch_history("SPY", ChartRange::OneDay, ChartInterval::FiveMinutes)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::NotFound);
        assert_eq!(err.symbol, "SPY");
        assert_eq!(err.range, ChartRange::OneDay);
        assert_eq!(err.interval, ChartInterval::FiveMinutes);
        assert_eq!(err.status_code(), Some(404));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_status_keeps_provider_description() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Unprocessable Entity","description":"Invalid input"}}}"#;
        let (base_url, server) = serve_once("422 Unprocessable Entity", body).await;
        let client = YahooClient::with_base_url(base_url, Endpoint::Chart).unwrap();

        let err = client
            .fetch_history("SPY", ChartRange::OneYear, ChartInterval::OneDay)
            .await
            .unwrap_err();
        assert_eq!(
            err.kind,
            FetchErrorKind::Status {
                code: 422,
                body: "Unprocessable Entity: Invalid input".to_string()
            }
        );
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v8/finance/chart/SPY?"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = YahooClient::with_base_url(format!("http://{}", addr), Endpoint::Download).unwrap();
        let err = client
            .fetch_history("SPY", ChartRange::OneYear, ChartInterval::OneDay)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Network(_)));
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_empty_symbol_is_rejected_without_request() {
        let client = YahooClient::with_base_url("http://127.0.0.1:9".to_string(), Endpoint::Download).unwrap();
        let err = client
            .fetch_history("  ", ChartRange::OneYear, ChartInterval::OneDay)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::InvalidSymbol);
    }

    #[test]
    fn test_history_url_encodes_symbol() {
        let client = YahooClient::with_base_url("https://example.com/".to_string(), Endpoint::Chart).unwrap();
        let url = client.history_url("BRK/B").unwrap();
        assert_eq!(url.as_str(), "https://example.com/v8/finance/chart/BRK%2FB");
    }
}
