//! Block-explorer API client (Etherscan-compatible `?module=..&action=..` API)

use crate::config::ApiConfig;
use crate::error::{HistoryError, Result};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an unexpected body echoed back in an error
const MAX_ECHOED_BODY: usize = 200;

/// Anything that can answer an explorer listing request. The HTTP client is
/// the production source; tests drive the aggregator with canned data.
#[allow(async_fn_in_trait)]
pub trait TransactionSource {
    /// Returns the `result` list of one explorer call, unchanged.
    async fn fetch_list(
        &self,
        module: &str,
        action: &str,
        address: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>>;
}

#[derive(Clone)]
pub struct ExplorerClient {
    // reqwest::Client is internally reference counted
    client: Client,
    base_url: String,
    api_key: String,
}

impl ExplorerClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("txhistory/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| HistoryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Full request URL: fixed parameters first, then the action-specific ones
    pub fn request_url(
        &self,
        module: &str,
        action: &str,
        address: &str,
        params: &[(&str, String)],
    ) -> Result<Url> {
        let mut query: Vec<(&str, &str)> = vec![
            ("module", module),
            ("action", action),
            ("address", address),
            ("apikey", self.api_key.as_str()),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        Url::parse_with_params(&self.base_url, &query).map_err(|e| {
            HistoryError::ConfigError(format!("Invalid base URL {}: {}", self.base_url, e))
        })
    }
}

impl TransactionSource for ExplorerClient {
    async fn fetch_list(
        &self,
        module: &str,
        action: &str,
        address: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>> {
        let url = self.request_url(module, action, address, params)?;
        debug!(module, action, address, "requesting explorer listing");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "explorer responded");

        extract_result_list(&body)
    }
}

/// Pull the `result` list out of an explorer response body.
///
/// Only a JSON array is accepted; an error string in `result` (bad key, rate
/// limit) or any other shape is reported as `UnexpectedShape`.
pub fn extract_result_list(body: &str) -> Result<Vec<Value>> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| HistoryError::MalformedResponse(format!("{}: {}", e, truncate(body))))?;

    match data.get("result") {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::String(reason)) => {
            let message = data.get("message").and_then(Value::as_str).unwrap_or("");
            Err(HistoryError::UnexpectedShape(if message.is_empty() {
                reason.clone()
            } else {
                format!("{}: {}", message, reason)
            }))
        }
        _ => Err(HistoryError::UnexpectedShape(truncate(body))),
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ECHOED_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ExplorerClient {
        let config = ApiConfig {
            api_key: "KEY".to_string(),
            ..ApiConfig::default()
        };
        ExplorerClient::new(&config).unwrap()
    }

    #[test]
    fn test_result_list_returned_unchanged() {
        let body = json!({
            "status": "1",
            "message": "OK",
            "result": [{"hash": "0x1", "timeStamp": "5"}, {"hash": "0x2"}]
        })
        .to_string();
        let list = extract_result_list(&body).unwrap();
        assert_eq!(list, vec![json!({"hash": "0x1", "timeStamp": "5"}), json!({"hash": "0x2"})]);
    }

    #[test]
    fn test_empty_result_list_is_not_an_error() {
        let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(extract_result_list(body).unwrap().is_empty());
    }

    #[test]
    fn test_error_string_is_unexpected_shape() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        assert_eq!(
            extract_result_list(body).unwrap_err(),
            HistoryError::UnexpectedShape("NOTOK: Invalid API Key".to_string())
        );
    }

    #[test]
    fn test_missing_result_is_unexpected_shape() {
        let err = extract_result_list(r#"{"status":"1"}"#).unwrap_err();
        assert!(matches!(err, HistoryError::UnexpectedShape(_)));

        let err = extract_result_list(r#"{"result": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, HistoryError::UnexpectedShape(_)));

        let err = extract_result_list("[1, 2]").unwrap_err();
        assert!(matches!(err, HistoryError::UnexpectedShape(_)));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = extract_result_list("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, HistoryError::MalformedResponse(_)));
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), MAX_ECHOED_BODY + 3);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_request_url_parameter_order() {
        let url = client()
            .request_url(
                "account",
                "txlist",
                "0xabc",
                &[("startblock", "0".to_string()), ("sort", "asc".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.etherscan.io/api?module=account&action=txlist&address=0xabc&apikey=KEY&startblock=0&sort=asc"
        );
    }

    /// Answer one HTTP request on a loopback port with `body`; the handle
    /// yields the raw request head that was received.
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{}/api", addr), handle)
    }

    // loopback only; ignore any proxy set in the environment
    fn client_for(base_url: String) -> ExplorerClient {
        ExplorerClient {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            base_url,
            api_key: "KEY".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_list_over_http() {
        let (base_url, server) = serve_once(
            r#"{"status":"1","message":"OK","result":[{"hash":"0x1","timeStamp":"7"}]}"#,
        )
        .await;
        let list = client_for(base_url)
            .fetch_list("account", "txlistinternal", "0xabc", &[("sort", "asc".to_string())])
            .await
            .unwrap();
        assert_eq!(list, vec![json!({"hash": "0x1", "timeStamp": "7"})]);

        let head = server.await.unwrap();
        assert!(head.starts_with(
            "GET /api?module=account&action=txlistinternal&address=0xabc&apikey=KEY&sort=asc HTTP/1.1"
        ));
    }

    #[tokio::test]
    async fn test_fetch_list_rejects_html_body() {
        let (base_url, server) = serve_once("<html>502 Bad Gateway</html>").await;
        let err = client_for(base_url)
            .fetch_list("account", "txlist", "0xabc", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::MalformedResponse(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_list_refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{}/api", addr))
            .fetch_list("account", "txlist", "0xabc", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::TransportError(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        let client = ExplorerClient::new(&config).unwrap();
        let err = client.request_url("account", "txlist", "0x0", &[]).unwrap_err();
        assert!(matches!(err, HistoryError::ConfigError(_)));
    }
}
