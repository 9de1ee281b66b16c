//! reqwest-backed config transport.

use std::sync::Arc;

use async_trait::async_trait;
use chatgate_core::{ConfigTransport, Error, GateConfig, HeaderProvider, Result, ServerConfig};

use crate::headers::StaticHeaders;

/// Fetches server config with an empty-body `POST`.
#[derive(Clone)]
pub struct HttpConfigTransport {
    url: String,
    client: reqwest::Client,
    headers: Arc<dyn HeaderProvider>,
}

impl HttpConfigTransport {
    /// Creates a transport for the given endpoint URL.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the config endpoint
    /// * `headers` - Source of request headers, consulted on every call
    pub fn new(url: impl Into<String>, headers: impl HeaderProvider + 'static) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            headers: Arc::new(headers),
        }
    }

    /// Creates a transport for the endpoint named in `config`, without
    /// extra headers.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.config_url(), StaticHeaders::new())
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ConfigTransport for HttpConfigTransport {
    async fn fetch_config(&self) -> Result<ServerConfig> {
        let mut request = self.client.post(&self.url);
        for (name, value) in self.headers.headers() {
            request = request.header(name, value);
        }

        tracing::debug!(url = %self.url, "Requesting server config");
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("Failed to call {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::transport(format!(
                "Config endpoint returned {status}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read config response: {e}")))?;

        ServerConfig::from_json(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CredentialHeaders;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_from_config_url() {
        let mut config = GateConfig::default();
        config.server.base_url = "https://chat.example.com".into();
        let transport = HttpConfigTransport::from_config(&config);
        assert_eq!(transport.url(), "https://chat.example.com/api/config");
    }

    #[tokio::test]
    async fn test_fetch_config_success() {
        let router = Router::new().route(
            "/api/config",
            post(|| async {
                axum::Json(serde_json::json!({
                    "needCode": false,
                    "enableGPT4": true,
                    "botHello": "Hi!"
                }))
            }),
        );
        let base = serve(router).await;

        let transport =
            HttpConfigTransport::new(format!("{base}/api/config"), StaticHeaders::new());
        let config = transport.fetch_config().await.unwrap();

        assert_eq!(config.need_code, Some(false));
        assert!(config.enable_gpt4);
        assert_eq!(config.greeting(), Some("Hi!"));
    }

    #[tokio::test]
    async fn test_fetch_config_sends_headers() {
        let router = Router::new().route(
            "/api/config",
            post(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(serde_json::json!({ "botHello": auth }))
            }),
        );
        let base = serve(router).await;

        let transport = HttpConfigTransport::new(
            format!("{base}/api/config"),
            CredentialHeaders::new("", "xyz"),
        );
        let config = transport.fetch_config().await.unwrap();
        assert_eq!(config.greeting(), Some("Bearer nk-xyz"));
    }

    #[tokio::test]
    async fn test_fetch_config_non_json_is_parse_error() {
        let router = Router::new().route("/api/config", post(|| async { "<html></html>" }));
        let base = serve(router).await;

        let transport =
            HttpConfigTransport::new(format!("{base}/api/config"), StaticHeaders::new());
        let err = transport.fetch_config().await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_config_http_error_is_transport_error() {
        let router = Router::new().route(
            "/api/config",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let transport =
            HttpConfigTransport::new(format!("{base}/api/config"), StaticHeaders::new());
        let err = transport.fetch_config().await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_fetch_config_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport =
            HttpConfigTransport::new(format!("http://{addr}/api/config"), StaticHeaders::new());
        let err = transport.fetch_config().await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(matches!(err, Error::Transport(_)));
    }
}
