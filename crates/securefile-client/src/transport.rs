//! HTTP transport seam
//!
//! The secure file operations never talk to the network directly. They hand a
//! method, a route and an optional body to a [`Transport`] and interpret the
//! status, headers and body stream that come back. Authentication, retries
//! and timeouts are the transport's business.

use crate::{Config, MultipartBody, Result, SecureFileError, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client, Method, StatusCode,
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Header carrying the Cerberus client token
pub const CERBERUS_TOKEN_HEADER: &str = "x-cerberus-token";

/// Response body as a stream of chunks
pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, TransportError>>;

/// A response as seen by the secure file operations
///
/// Dropping the response releases the underlying connection.
pub struct TransportResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: BodyStream,
}

impl TransportResponse {
    /// Assemble a response from its parts
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build a response whose body is already in memory
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, headers, stream::once(async move { Ok(body) }).boxed())
    }

    /// Read the whole body into memory
    pub async fn bytes(self) -> std::result::Result<Bytes, TransportError> {
        let chunks: Vec<Bytes> = self.body.try_collect().await?;
        Ok(Bytes::from(chunks.concat()))
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Request dispatcher used by [`SecureFileClient`](crate::SecureFileClient)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request without a body
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<TransportResponse, TransportError>;

    /// Send a request with a multipart body
    ///
    /// The request's content type must be `body.content_type()`.
    async fn request_with_body(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: MultipartBody,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<TransportResponse, TransportError> {
        (**self).request(method, path, query).await
    }

    async fn request_with_body(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: MultipartBody,
    ) -> std::result::Result<TransportResponse, TransportError> {
        (**self).request_with_body(method, path, query, body).await
    }
}

/// reqwest-backed transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: Url,
    http: Client,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            SecureFileError::Config(format!("invalid endpoint {}: {}", config.endpoint, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SecureFileError::Config(format!(
                "endpoint {} cannot carry a path",
                config.endpoint
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| SecureFileError::Config(format!("invalid user agent: {}", e)))?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| SecureFileError::Config(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(CERBERUS_TOKEN_HEADER), value);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SecureFileError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    /// Resolve a route against the endpoint, percent-encoding each segment
    pub fn url_for(&self, path: &str) -> std::result::Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Other(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<MultipartBody>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.url_for(path)?;
        let mut req = self.http.request(method.clone(), url.clone());

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body) = body {
            // reqwest derives the same boundary content type from the form
            req = req.multipart(body.into_form());
        }

        debug!("Sending {} request to {}", method, url);
        let response = req.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        debug!("Received {} from {}", status, url);

        let body = response.bytes_stream().map_err(TransportError::from).boxed();
        Ok(TransportResponse::new(status, headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.send(method, path, query, None).await
    }

    async fn request_with_body(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: MultipartBody,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.send(method, path, query, Some(body)).await
    }
}
