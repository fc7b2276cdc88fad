//! Plugging a custom transport into the secure file client
//!
//! The client never retries on its own. This example wraps the default
//! HTTP transport with a small retry loop for connection failures. Upload
//! forms are consumed by sending, so uploads go through once.
//!
//! Run with: CERBERUS_URL=... cargo run --example custom_transport

use async_trait::async_trait;
use securefile_client::{
    Config, HttpTransport, Method, MultipartBody, SecureFileClient, Transport, TransportError,
    TransportResponse,
};
use std::time::Duration;
use tracing::warn;

struct RetryingTransport {
    inner: HttpTransport,
    attempts: u32,
}

impl RetryingTransport {
    async fn backoff(&self, attempt: u32, err: &TransportError) {
        let delay = Duration::from_millis(200 * 2u64.pow(attempt));
        warn!("Attempt {} failed ({}), retrying in {:?}", attempt + 1, err, delay);
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<TransportResponse, TransportError> {
        let mut attempt = 0;
        loop {
            match self.inner.request(method.clone(), path, query).await {
                Err(e) if attempt + 1 < self.attempts => {
                    self.backoff(attempt, &e).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn request_with_body(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: MultipartBody,
    ) -> Result<TransportResponse, TransportError> {
        self.inner.request_with_body(method, path, query, body).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint =
        std::env::var("CERBERUS_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let config = Config::new(endpoint);
    let transport = RetryingTransport {
        inner: HttpTransport::new(&config)?,
        attempts: 3,
    };

    let client = SecureFileClient::with_transport(transport, &config);
    match client.list_all().await {
        Ok(files) => println!("{} secure files", files.total_file_count),
        Err(e) => println!("listing failed: {}", e),
    }

    Ok(())
}
