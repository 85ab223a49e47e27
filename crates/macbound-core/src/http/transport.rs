//! Transport collaborator interface and the reqwest-backed implementation
//!
//! The protocol layer issues exactly one send per call and owns no
//! connection state; timeouts and cancellation live entirely on this side
//! of the boundary.

use std::borrow::Cow;
use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::builder::{OutboundRequest, PendingHeaders};
use super::client::ClientConfig;
use crate::{Error, Result};

/// A response as seen by the protocol layer
///
/// Owned snapshot of status, headers, and body bytes; header lookup is
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status falls in the success range [200, 299]
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body bytes as text, lossy on invalid UTF-8
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Trait for the HTTP transport consumed by the protocol layer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round trip with the staged headers and form parameters
    async fn send(
        &self,
        request: &OutboundRequest,
        staged: &PendingHeaders,
    ) -> Result<TransportResponse>;
}

/// Parse an HTTP method string
fn parse_method(method: &str) -> Result<reqwest::Method> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(reqwest::Method::GET),
        "POST" => Ok(reqwest::Method::POST),
        "PUT" => Ok(reqwest::Method::PUT),
        "DELETE" => Ok(reqwest::Method::DELETE),
        "PATCH" => Ok(reqwest::Method::PATCH),
        "HEAD" => Ok(reqwest::Method::HEAD),
        _ => Err(Error::Transport {
            message: format!("Unsupported HTTP method: {}", method),
            source: None,
        }),
    }
}

/// Parse an HTTP version string onto the reqwest version enum
fn parse_version(version: &str) -> Result<reqwest::Version> {
    match version {
        "HTTP/0.9" => Ok(reqwest::Version::HTTP_09),
        "HTTP/1.0" => Ok(reqwest::Version::HTTP_10),
        "HTTP/1.1" => Ok(reqwest::Version::HTTP_11),
        "HTTP/2" | "HTTP/2.0" => Ok(reqwest::Version::HTTP_2),
        "HTTP/3" | "HTTP/3.0" => Ok(reqwest::Version::HTTP_3),
        _ => Err(Error::Transport {
            message: format!("Unsupported HTTP version: {}", version),
            source: None,
        }),
    }
}

/// Reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| Error::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(anyhow::anyhow!("{}", e)),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        staged: &PendingHeaders,
    ) -> Result<TransportResponse> {
        let method = parse_method(&request.method)?;
        let version = parse_version(&request.http_version)?;
        let url = Url::parse(&request.uri).map_err(|e| Error::Transport {
            message: format!("Invalid request URI: {}", request.uri),
            source: Some(anyhow::anyhow!("{}", e)),
        })?;

        let mut builder = self.client.request(method, url).version(version);

        for (name, value) in staged.headers() {
            builder = builder.header(name, value);
        }

        // Form parameters take the body slot when present
        if !staged.form_params().is_empty() {
            builder = builder.form(staged.form_params());
        } else if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| Error::Transport {
            message: format!("Request failed: {}", e),
            source: Some(anyhow::anyhow!("{}", e)),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport {
                message: format!("Failed to read response body: {}", e),
                source: Some(anyhow::anyhow!("{}", e)),
            })?
            .to_vec();

        Ok(TransportResponse::new(status, headers, body))
    }
}
