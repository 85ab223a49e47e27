//! The orchestrator: one authenticated exchange per call
//!
//! Composes signer, transport, classifier, and verifier around a single
//! round trip. The client owns the per-exchange mutable state (pending
//! headers, retained canonical message, exchange counter) and is meant for
//! one exchange at a time; callers needing concurrency use one client per
//! logical session.

use std::sync::Arc;

use tracing::{debug, warn};

use super::builder::{CallOptions, OutboundRequest, PendingHeaders};
use super::transport::{ReqwestTransport, Transport, TransportResponse};
use crate::mac::{MacProvider, SessionMode};
use crate::protocol::{ExchangeGuard, FailureClassifier, RequestSigner, ResponseVerifier};
use crate::{Error, Result};

/// Configuration for the HMAC client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
    /// HTTP version string used when a call does not override it
    pub http_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            validate_tls: true,
            http_version: "HTTP/1.1".to_string(),
        }
    }
}

/// Everything that exists only once a MAC provider is installed
struct AuthState {
    signer: RequestSigner,
    verifier: ResponseVerifier,
    classifier: FailureClassifier,
    guard: ExchangeGuard,
    /// Canonical message of the in-flight exchange, retained between sign
    /// and verify
    canonical: Option<String>,
}

impl AuthState {
    fn new(provider: Arc<dyn MacProvider>) -> Self {
        let mode = provider.session_mode();
        Self {
            signer: RequestSigner::new(provider.clone()),
            verifier: ResponseVerifier::new(provider),
            classifier: FailureClassifier::new(mode),
            guard: ExchangeGuard::new(mode),
            canonical: None,
        }
    }
}

/// HTTP client speaking the HMAC request-authentication protocol
pub struct HmacClient<T: Transport> {
    transport: T,
    config: ClientConfig,
    auth: Option<AuthState>,
    pending: PendingHeaders,
}

impl HmacClient<ReqwestTransport> {
    /// Create a client backed by a reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::from_transport(transport, config))
    }

    /// Create with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> HmacClient<T> {
    /// Create a client over a custom transport
    pub fn from_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            auth: None,
            pending: PendingHeaders::new(),
        }
    }

    /// Install the MAC provider backing all exchanges of this client
    pub fn with_provider(mut self, provider: Arc<dyn MacProvider>) -> Self {
        self.auth = Some(AuthState::new(provider));
        self
    }

    /// Validate that the client is properly configured
    pub fn validate(&self) -> Result<()> {
        if self.auth.is_none() {
            return Err(no_provider());
        }
        Ok(())
    }

    /// Exchange discipline of the installed provider, if any
    pub fn session_mode(&self) -> Option<SessionMode> {
        self.auth.as_ref().map(|auth| auth.guard.mode())
    }

    /// Number of fully verified exchanges completed by this client
    pub fn completed_exchanges(&self) -> u64 {
        self.auth
            .as_ref()
            .map(|auth| auth.guard.completed())
            .unwrap_or(0)
    }

    /// Perform one authenticated exchange
    ///
    /// Signs the request, performs exactly one transport round trip, and
    /// handles the response by status: 401 is classified and surfaced as
    /// [`Error::RemoteAuthentication`]; [200, 299] is verified against the
    /// retained canonical message and counted; anything else bypasses
    /// verification and is returned as-is.
    pub async fn call(
        &mut self,
        method: &str,
        uri: &str,
        options: CallOptions,
    ) -> Result<TransportResponse> {
        let auth = self.auth.as_mut().ok_or_else(no_provider)?;

        self.pending.clear();
        self.pending.merge_headers(&options.headers);
        self.pending.merge_form_params(&options.form_params);

        let request = OutboundRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            body: options.body,
            http_version: options
                .http_version
                .unwrap_or_else(|| self.config.http_version.clone()),
        };

        let canonical =
            auth.signer
                .sign(&request.method, &request.uri, &mut auth.guard, &mut self.pending)?;
        auth.canonical = Some(canonical.clone());

        debug!("Sending {} {}", request.method, request.uri);
        let response = self.transport.send(&request, &self.pending).await?;

        if response.status() == 401 {
            let failure = auth.classifier.classify(&response.body_text());
            warn!("Remote authentication rejected: {}", failure);
            return Err(Error::RemoteAuthentication {
                diagnostic: failure.message(),
                status_code: 401,
            });
        }

        if response.is_success() {
            auth.verifier.verify(&response, &canonical)?;
            auth.guard.record_success();
            auth.canonical = None;
            debug!("Exchange verified ({} completed)", auth.guard.completed());
        }

        Ok(response)
    }
}

fn no_provider() -> Error {
    Error::Configuration {
        message: "no MAC provider configured".to_string(),
        source: None,
    }
}
