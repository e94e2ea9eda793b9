use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::config::{load_config, save_config, CliConfig};

/// A non-success reply from the API, carrying its error envelope.
#[derive(Debug, Error)]
#[error("{message} ({status})")]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<String>,
}

/// HTTP client bound to the saved CLI config.
pub struct ApiClient {
    http: reqwest::Client,
    config: CliConfig,
}

impl ApiClient {
    pub fn load() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            config: load_config()?,
        })
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CliConfig {
        &mut self.config
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save_config(&self.config)
    }

    pub async fn get(&mut self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> anyhow::Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&mut self, path: &str, body: Value) -> anyhow::Result<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&mut self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::DELETE, path, None).await
    }

    /// Send a request and unwrap the `data` of the success envelope.
    ///
    /// A 401 on an authenticated request drops the saved token.
    pub async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let url = self.config.url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Could not reach {}: {}", self.config.server_url, e))?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;
        let envelope: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(envelope.get("data").cloned().unwrap_or(envelope));
        }

        if status == StatusCode::UNAUTHORIZED && self.config.token.is_some() {
            self.config.clear_session();
            self.save()?;
            tracing::info!("Cleared saved token after 401");
        }

        Err(failure(status, &envelope, &text).into())
    }
}

fn failure(status: StatusCode, envelope: &Value, raw: &str) -> ApiFailure {
    let message = envelope
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                raw.to_string()
            }
        });

    ApiFailure {
        status,
        message,
        code: envelope.get("code").and_then(Value::as_str).map(str::to_string),
    }
}
