use std::time::Duration;

use async_trait::async_trait;
use chat_core::Config;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Proxy, Url};

use crate::api::models::{ChatReply, ChatRequest, ClearHistoryResponse, HealthStatus, HistoryPage};
use crate::client_trait::ChatGateway;
use crate::error::{GatewayError, Result};
use crate::utils::http_utils::{execute_request, read_success_body};

const CLIENT_USER_AGENT: &str = concat!("router-chat/", env!("CARGO_PKG_VERSION"));

/// Gateway to the router's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    client: Client,
    api_base: Url,
}

impl HttpChatGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Self::build_http_client(config)?;
        Self::with_client(client, config.api_base())
    }

    /// Use a prebuilt client, e.g. one shared with other gateways.
    pub fn with_client(client: Client, api_base: &str) -> Result<Self> {
        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let normalized = format!("{}/", api_base.trim_end_matches('/'));
        let api_base = Url::parse(&normalized)
            .map_err(|e| GatewayError::InvalidUrl(format!("{api_base}: {e}")))?;
        Ok(Self { client, api_base })
    }

    fn build_http_client(config: &Config) -> Result<Client> {
        let mut builder = Client::builder().default_headers(Self::get_default_headers());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        if !config.http_proxy.is_empty() {
            builder = builder.proxy(Proxy::http(&config.http_proxy)?);
        }
        if !config.https_proxy.is_empty() {
            builder = builder.proxy(Proxy::https(&config.https_proxy)?);
        }
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        } else {
            warn!("Request timeout disabled; a hung backend keeps the session busy");
        }
        Ok(builder.build()?)
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut header = HeaderMap::new();
        header.insert(ACCEPT, HeaderValue::from_static("application/json"));
        header.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        header.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        header
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }

    /// `GET /health` on the server root, outside the API prefix.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("/health")?;
        let response = execute_request::<()>(&self.client, Method::GET, url, None).await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Most recent `limit` stored messages for `user_id`, oldest first.
    pub async fn history(&self, user_id: &str, limit: usize) -> Result<HistoryPage> {
        let mut url = self.endpoint("history/")?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .push(user_id);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let response = execute_request::<()>(&self.client, Method::GET, url, None).await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn clear_history(&self, user_id: &str) -> Result<ClearHistoryResponse> {
        let mut url = self.endpoint("history/")?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .push(user_id);

        let response = execute_request::<()>(&self.client, Method::DELETE, url, None).await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let url = self.endpoint("chat")?;
        let request = ChatRequest { user_id, message };
        debug!("Chat request for {} ({} chars)", user_id, message.len());

        let response = execute_request(&self.client, Method::POST, url, Some(&request)).await?;
        let body = read_success_body(response).await?;
        let reply = ChatReply::from_body(&body)?;

        info!(
            "Router answered via {} with {} source(s)",
            reply.route,
            reply.sources.len()
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(api_base: &str) -> HttpChatGateway {
        HttpChatGateway::with_client(Client::new(), api_base).unwrap()
    }

    #[test]
    fn test_endpoints_resolve_under_api_base() {
        let gw = gateway("http://localhost:8000/api");
        assert_eq!(
            gw.endpoint("chat").unwrap().as_str(),
            "http://localhost:8000/api/chat"
        );

        let with_slash = gateway("http://localhost:8000/api/");
        assert_eq!(
            with_slash.endpoint("chat").unwrap().as_str(),
            "http://localhost:8000/api/chat"
        );
    }

    #[test]
    fn test_health_lives_at_server_root() {
        let gw = gateway("http://localhost:8000/api");
        assert_eq!(
            gw.endpoint("/health").unwrap().as_str(),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn test_invalid_api_base() {
        let err = HttpChatGateway::with_client(Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl(_)));
    }

    #[test]
    fn test_build_from_config() {
        let config = Config {
            use_system_proxy: false,
            request_timeout_secs: 3,
            ..Config::default()
        };
        let gw = HttpChatGateway::new(&config).unwrap();
        assert_eq!(gw.api_base().as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let config = Config {
            http_proxy: "http://exa mple.com".to_string(),
            ..Config::default()
        };
        assert!(HttpChatGateway::new(&config).is_err());
    }
}
