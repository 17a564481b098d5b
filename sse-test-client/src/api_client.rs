use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Thin wrapper over the platform's JSON endpoints.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn broadcast(&self, message: &str, notification_type: Option<&str>) -> Result<Value> {
        let url = format!("{}/sse/broadcast", self.base_url);

        let mut body = json!({ "message": message });
        if let Some(t) = notification_type {
            body["type"] = json!(t);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send broadcast request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Broadcast failed: {} - Response: {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Send to one connection. Returns the status and parsed body so callers
    /// can assert on the not-found and write-failed paths too.
    pub async fn send_to(
        &self,
        connection_id: &str,
        message: &str,
        notification_type: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        let url = format!("{}/sse/send/{}", self.base_url, connection_id);

        let mut body = json!({ "message": message });
        if let Some(t) = notification_type {
            body["type"] = json!(t);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send unicast request")?;

        let status = response.status();
        let value: Value = response.json().await.context("Failed to parse response")?;
        Ok((status, value))
    }

    pub async fn list_connections(&self) -> Result<Value> {
        let url = format!("{}/sse/connections", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to list connections")?;

        if !response.status().is_success() {
            anyhow::bail!("Listing connections failed: {}", response.status());
        }

        response.json().await.context("Failed to parse response")
    }
}
