use std::time::Duration;

use async_trait::async_trait;

use super::{Transport, TransportError, TransportRequest, TransportResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default transport backed by a pooled `reqwest` client.
///
/// Built once and shared across adapters; connection pooling and TLS
/// live here, retry policy does not (failures surface once).
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut req = match request.method.to_uppercase().as_str() {
            "POST" => self.client.post(&request.url),
            "PUT" => self.client.put(&request.url),
            "DELETE" => self.client.delete(&request.url),
            _ => self.client.get(&request.url),
        };

        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        if let Some(body) = &request.body {
            req = req.json(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(TransportResponse { status, body })
    }
}
