use super::{Endpoint, Gateway, RequestContext};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::NetworkError;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// [`Gateway`] over a shared reqwest client.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        match endpoint.query() {
            Some(query) => format!("{}{}?{}", self.base_url, endpoint.path(), query),
            None => format!("{}{}", self.base_url, endpoint.path()),
        }
    }

    fn map_transport_error(&self, endpoint: &Endpoint, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: endpoint.name().to_string(),
            }
        } else {
            NetworkError::Transport {
                endpoint: endpoint.name().to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Empty bodies decode to `Null`; anything else must be JSON.
pub fn decode_body(endpoint: &Endpoint, text: &str) -> Result<Value, NetworkError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| NetworkError::InvalidResponse {
        endpoint: endpoint.name().to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(
        &self,
        ctx: &RequestContext,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, NetworkError> {
        let method = endpoint.method();
        let url = self.url_for(endpoint);

        let mut headers = ctx.headers().clone();
        for (name, value) in endpoint.extra_headers() {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        if let Some(token) = ctx.token().filter(|_| endpoint.requires_token()) {
            if let Ok(value) = HeaderValue::from_str(&token.bearer()) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let mut request = self.client.request(method.clone(), &url).headers(headers);
        if method == Method::POST {
            let empty = Value::Object(Default::default());
            request = request
                .header(CONTENT_TYPE, "application/json")
                .json(body.unwrap_or(&empty));
        }

        debug!("{} {}", method, endpoint.path());
        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: endpoint.name().to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(endpoint, e))?;
        decode_body(endpoint, &text)
    }
}
