use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder, Request, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::types::{DrawQuery, DrawResult};

/// Anything that can answer "what was drawn on this date".
///
/// `Ok(None)` means no draw was held that day.
#[allow(async_fn_in_trait)]
pub trait DrawSource {
    async fn fetch_draw_results(&self, date: NaiveDate) -> Result<Option<DrawResult>, FetchError>;
}

/// HTTP client for the lotto.pl open API.
pub struct LottoClient {
    client: Client,
    endpoint: String,
    api_key: String,
    user_agent: String,
}

impl LottoClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = client_builder(config)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn build_request(&self, date: NaiveDate) -> reqwest::Result<Request> {
        self.client
            .get(&self.endpoint)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header("secret", &self.api_key)
            .query(&DrawQuery::new(date).query_params())
            .build()
    }
}

pub(crate) fn client_builder(config: &Config) -> ClientBuilder {
    Client::builder().timeout(config.request_timeout)
}

impl DrawSource for LottoClient {
    async fn fetch_draw_results(&self, date: NaiveDate) -> Result<Option<DrawResult>, FetchError> {
        let request = self
            .build_request(date)
            .map_err(|source| FetchError::Transport { date, source })?;
        debug!("GET {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Transport { date, source })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status { date, status });
        }

        let result = response
            .json::<DrawResult>()
            .await
            .map_err(|source| FetchError::Decode { date, source })?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn config_for(endpoint: String) -> Config {
        Config {
            api_key: "test-key".to_string(),
            endpoint,
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        }
    }

    fn local_client(endpoint: String) -> LottoClient {
        client_with(config_for(endpoint))
    }

    fn client_with(config: Config) -> LottoClient {
        let client = client_builder(&config).no_proxy().build().unwrap();
        LottoClient::with_client(client, &config)
    }

    /// Accepts one connection and never answers it.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        format!("http://{addr}/draw-results")
    }

    /// Serves a single canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}/draw-results")
    }

    #[test]
    fn test_request_carries_query_and_headers() {
        let client = LottoClient::new(&config_for("https://example.test/draws".to_string())).unwrap();
        let request = client.build_request(date()).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://example.test/draws?gameType=Lotto&drawDate=2024-03-07&index=1&size=2&sort=drawSystemId&order=ASC"
        );
        assert_eq!(request.headers()["secret"], "test-key");
        assert_eq!(request.headers()[reqwest::header::USER_AGENT], "rczajka.me");
    }

    #[tokio::test]
    async fn test_not_found_means_no_draw() {
        let endpoint = serve_once("404 Not Found", "").await;
        let client = local_client(endpoint);

        assert!(client.fetch_draw_results(date()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_success_returns_payload_unmodified() {
        let body = r#"{"items":[{"results":[{"resultsJson":[1,2,3,4,5,6]}]}],"totalRows":1}"#;
        let endpoint = serve_once("200 OK", body).await;
        let client = local_client(endpoint);

        let payload = client.fetch_draw_results(date()).await.unwrap().unwrap();
        assert_eq!(payload, serde_json::from_str::<DrawResult>(body).unwrap());
    }

    #[tokio::test]
    async fn test_other_error_status_is_fatal() {
        let endpoint = serve_once("401 Unauthorized", "").await;
        let client = local_client(endpoint);

        let err = client.fetch_draw_results(date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_decode_error() {
        let endpoint = serve_once("200 OK", "<html>maintenance</html>").await;
        let client = local_client(endpoint);

        let err = client.fetch_draw_results(date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(format!("http://{addr}/draw-results"));
        let err = client.fetch_draw_results(date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out_as_transport_error() {
        let endpoint = serve_silence().await;
        let client = client_with(Config {
            request_timeout: Duration::from_millis(100),
            ..config_for(endpoint)
        });

        let started = std::time::Instant::now();
        let err = client.fetch_draw_results(date()).await.unwrap_err();

        match err {
            FetchError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected a timeout, got {other}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
