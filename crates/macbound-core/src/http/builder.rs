//! Pending request state and per-call options
//!
//! Headers and form parameters accumulate here before the send: caller
//! overrides are merged in first, then the signer stages the authentication
//! header. The whole map is cleared and rebuilt on every call; nothing
//! persists across exchanges.

use std::collections::HashMap;

use serde_json::Value;

/// Headers and form parameters staged for the next send
///
/// Merges are last-write-wins per key within each kind.
#[derive(Debug, Clone, Default)]
pub struct PendingHeaders {
    headers: HashMap<String, String>,
    form_params: HashMap<String, String>,
}

impl PendingHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a single header, replacing any previous value
    pub fn stage_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Merge caller-supplied header overrides, last write wins
    pub fn merge_headers(&mut self, overrides: &HashMap<String, String>) {
        for (name, value) in overrides {
            self.headers.insert(name.clone(), value.clone());
        }
    }

    /// Merge caller-supplied form-parameter overrides, last write wins
    pub fn merge_form_params(&mut self, overrides: &HashMap<String, String>) {
        for (name, value) in overrides {
            self.form_params.insert(name.clone(), value.clone());
        }
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn form_params(&self) -> &HashMap<String, String> {
        &self.form_params
    }

    /// Drop all staged state ahead of a new exchange
    pub fn clear(&mut self) {
        self.headers.clear();
        self.form_params.clear();
    }
}

/// One outbound request as handed to the transport
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: String,
    pub uri: String,
    pub body: Option<Value>,
    pub http_version: String,
}

/// Per-call overrides for [`HmacClient::call`](crate::http::client::HmacClient::call)
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub headers: HashMap<String, String>,
    pub form_params: HashMap<String, String>,
    pub body: Option<Value>,
    /// Overrides the client-wide HTTP version string for this call
    pub http_version: Option<String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header override
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a form-parameter override
    pub fn with_form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.insert(name.into(), value.into());
        self
    }

    /// Set the JSON request body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the HTTP version string for this call
    pub fn with_http_version(mut self, version: impl Into<String>) -> Self {
        self.http_version = Some(version.into());
        self
    }
}
