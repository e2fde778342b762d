//! HTTP clients for the admin API and the bundle builder.
//!
//! Thin wrappers: each call maps to one endpoint and every failure is wrapped
//! as `Failed to <action>: <cause>`. Validation happens before these are
//! called, never inside them.

use anyhow::{anyhow, bail, Result};
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::client_config::ClientConfig;
use crate::config::{ApiConfig, BuilderConfig};
use crate::console::{LogEntry, SseDecoder};
use crate::content::ContentSpec;
use crate::status::ClientStatus;

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Parse a response body leniently: empty becomes null, non-JSON becomes text.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Client for the Chatipelago admin API.
#[derive(Debug, Clone)]
pub struct AdminApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AdminApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = join_url(&self.base_url, path);
        debug!("API Request: {} {}", method, url);
        self.client.request(method, url).timeout(self.timeout)
    }

    async fn send(&self, builder: RequestBuilder, action: &str) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| anyhow!("Failed to {}: {}", action, e))?;
        debug!("API Response: {} {}", response.status(), response.url());
        response
            .error_for_status()
            .map_err(|e| anyhow!("Failed to {}: {}", action, e))
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path), action).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Failed to {}: {}", action, e))
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        action: &str,
    ) -> Result<Value> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder, action).await?;
        let text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to {}: {}", action, e))?;
        Ok(decode_body(&text))
    }

    pub async fn get_config(&self) -> Result<ClientConfig> {
        self.fetch("/api/config", "fetch configuration").await
    }

    pub async fn update_config(&self, config: &ClientConfig) -> Result<Value> {
        self.write(Method::PUT, "/api/config", Some(config), "update configuration")
            .await
    }

    pub async fn list_message_files(&self) -> Result<Vec<String>> {
        self.fetch("/api/messages", "fetch message files").await
    }

    pub async fn get_message_file(&self, filename: &str) -> Result<Value> {
        let path = format!("/api/messages/{}", urlencoding::encode(filename));
        self.fetch(&path, "fetch message file").await
    }

    pub async fn update_message_file(&self, filename: &str, content: &Value) -> Result<Value> {
        let path = format!("/api/messages/{}", urlencoding::encode(filename));
        self.write(Method::PUT, &path, Some(content), "update message file")
            .await
    }

    pub async fn restart_client(&self) -> Result<Value> {
        self.write::<Value>(Method::POST, "/api/restart", None, "restart client")
            .await
    }

    pub async fn connect_streamerbot(&self) -> Result<Value> {
        self.write::<Value>(
            Method::POST,
            "/api/streamerbot/connect",
            None,
            "connect to Streamer.bot",
        )
        .await
    }

    pub async fn connect_archipelago(&self) -> Result<Value> {
        self.write::<Value>(
            Method::POST,
            "/api/archipelago/connect",
            None,
            "connect to Archipelago",
        )
        .await
    }

    pub async fn get_status(&self) -> Result<ClientStatus> {
        self.fetch("/api/status", "fetch status").await
    }

    pub fn download_url(&self, filename: &str) -> String {
        join_url(
            &self.base_url,
            &format!("/api/download/{}", urlencoding::encode(filename)),
        )
    }

    /// Follow the console stream, calling `on_entry` per log line, until the
    /// server closes it. The request has no timeout.
    pub async fn stream_console<F>(&self, mut on_entry: F) -> Result<()>
    where
        F: FnMut(LogEntry),
    {
        let url = join_url(&self.base_url, "/api/console");
        info!("Connecting to console stream at {}", url);
        let mut response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| anyhow!("Failed to open console stream: {}", e))?;

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| anyhow!("Console stream interrupted: {}", e))?
        {
            for entry in decoder.feed(&chunk) {
                on_entry(entry);
            }
        }
        if let Some(entry) = decoder.finish() {
            on_entry(entry);
        }
        info!("Console stream closed by server");
        Ok(())
    }
}

/// Client for the local bundle builder service.
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BundleBuilder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn download_url(&self) -> String {
        join_url(&self.base_url, "/apworld/download")
    }

    /// Submit a content list; returns the artifact download URL.
    pub async fn build(&self, spec: &ContentSpec) -> Result<String> {
        let payload = spec.to_yaml()?;
        let url = join_url(&self.base_url, "/apworld/build");
        debug!("Posting {} bytes of content to {}", payload.len(), url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-yaml")
            .body(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach bundle builder: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let info: Value = response.json().await.unwrap_or_default();
            match info.get("error").and_then(Value::as_str) {
                Some(message) => bail!("{}", message),
                None => bail!("Build failed with status {}", status),
            }
        }

        info!("Bundle build accepted ({})", status);
        Ok(self.download_url())
    }

    /// Save the last built artifact to `dest`; returns the byte count.
    pub async fn download(&self, dest: &Path) -> Result<usize> {
        let response = self
            .client
            .get(self.download_url())
            .timeout(self.timeout)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| anyhow!("Failed to download bundle: {}", e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to download bundle: {}", e))?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| anyhow!("Failed to write {}: {}", dest.display(), e))?;
        Ok(bytes.len())
    }
}
