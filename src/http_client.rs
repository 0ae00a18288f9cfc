use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout of the first caller wins.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// The backend API as seen by the cache, the resolver and the search probe.
///
/// `path` is always relative to the configured base URL and starts with `/`.
pub trait Transport: Send + Sync {
    /// GET `path` and decode the body as JSON. Non-2xx statuses are errors.
    fn get_json(&self, path: &str) -> Result<Value>;

    /// HEAD `path` and report the status without reading a body.
    fn head(&self, path: &str) -> Result<StatusCode>;
}

pub struct HttpTransport {
    client: &'static Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, path: &str) -> Result<Value> {
        let resp = self
            .client
            .get(self.url(path))
            .header(USER_AGENT, "winr8te-terminal")
            .header(ACCEPT, "application/json")
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {}: {}", status, body));
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(trimmed).with_context(|| format!("invalid json from {path}"))
    }

    fn head(&self, path: &str) -> Result<StatusCode> {
        let resp = self
            .client
            .head(self.url(path))
            .header(USER_AGENT, "winr8te-terminal")
            .send()
            .context("request failed")?;
        Ok(resp.status())
    }
}
