//! Request signing
//!
//! Builds the canonical signable string for an outbound request, computes
//! the request-leg MAC, and stages the encoded authentication header into
//! the pending request headers. Nothing is sent from here.

use std::sync::Arc;

use tracing::debug;

use super::codec;
use super::session::ExchangeGuard;
use super::{AUTH_HEADER_NAME, PROTOCOL_VERSION};
use crate::http::builder::PendingHeaders;
use crate::mac::{MacProvider, RequestPhase};
use crate::Result;

/// Signs outbound requests with the configured MAC provider
pub struct RequestSigner {
    provider: Arc<dyn MacProvider>,
}

impl RequestSigner {
    pub fn new(provider: Arc<dyn MacProvider>) -> Self {
        Self { provider }
    }

    /// Canonical signable message for protocol version 1
    ///
    /// The method concatenated with the full request URI, verbatim, no
    /// separator and no normalization. This is a versioned wire contract:
    /// the same byte sequence is signed here and re-validated against the
    /// paired response.
    pub fn canonical_message(method: &str, uri: &str) -> String {
        format!("{}{}", method, uri)
    }

    /// Sign one outbound request
    ///
    /// Checks the exchange guard, computes the request-leg MAC over the
    /// canonical message, and stages the encoded header under
    /// [`AUTH_HEADER_NAME`]. Returns the canonical message, which the
    /// caller retains until the paired response is verified.
    pub fn sign(
        &self,
        method: &str,
        uri: &str,
        guard: &mut ExchangeGuard,
        pending: &mut PendingHeaders,
    ) -> Result<String> {
        guard.ensure_may_sign()?;

        let canonical = Self::canonical_message(method, uri);
        let mac = self.provider.compute_mac(&canonical, RequestPhase::Request)?;
        let value = codec::encode(
            PROTOCOL_VERSION,
            self.provider.key_id(),
            &self.provider.nonce_value(),
            &mac,
        );

        pending.stage_header(AUTH_HEADER_NAME, &value);
        guard.mark_sent();

        debug!("Signed {} {} with key {}", method, uri, self.provider.key_id());
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::{KeyMaterial, SessionHmac, SessionMode, SingleExchangeHmac};
    use crate::Error;

    fn session_provider() -> Arc<dyn MacProvider> {
        Arc::new(SessionHmac::establish(KeyMaterial::new("key-1", "secret")))
    }

    #[test]
    fn test_canonical_message_is_plain_concatenation() {
        assert_eq!(
            RequestSigner::canonical_message("GET", "https://x/y"),
            "GEThttps://x/y"
        );
        // Case-preserved, no normalization
        assert_eq!(
            RequestSigner::canonical_message("post", "HTTPS://X/Y?a=1"),
            "postHTTPS://X/Y?a=1"
        );
    }

    #[test]
    fn test_sign_stages_header_and_returns_canonical() {
        let provider = session_provider();
        let signer = RequestSigner::new(provider.clone());
        let mut guard = ExchangeGuard::new(SessionMode::Session);
        let mut pending = PendingHeaders::new();

        let canonical = signer
            .sign("GET", "https://x/y", &mut guard, &mut pending)
            .unwrap();
        assert_eq!(canonical, "GEThttps://x/y");

        let staged = pending.headers().get(AUTH_HEADER_NAME).unwrap();
        let header = codec::decode(staged).unwrap();
        assert_eq!(header.version, PROTOCOL_VERSION);
        assert_eq!(header.key_id, "key-1");
        assert_eq!(
            header.mac,
            provider
                .compute_mac("GEThttps://x/y", RequestPhase::Request)
                .unwrap()
        );
    }

    #[test]
    fn test_second_sign_with_stateless_provider_fails() {
        let provider: Arc<dyn MacProvider> =
            Arc::new(SingleExchangeHmac::new(KeyMaterial::new("key-1", "secret")));
        let signer = RequestSigner::new(provider);
        let mut guard = ExchangeGuard::new(SessionMode::Stateless);
        let mut pending = PendingHeaders::new();

        signer
            .sign("GET", "https://x/y", &mut guard, &mut pending)
            .unwrap();
        let second = signer.sign("GET", "https://x/z", &mut guard, &mut pending);

        assert!(matches!(second, Err(Error::SessionViolation { .. })));
    }

    #[test]
    fn test_failed_guard_check_stages_nothing() {
        let provider = session_provider();
        let signer = RequestSigner::new(provider);
        let mut guard = ExchangeGuard::new(SessionMode::Stateless);
        guard.mark_sent();
        let mut pending = PendingHeaders::new();

        assert!(signer
            .sign("GET", "https://x/y", &mut guard, &mut pending)
            .is_err());
        assert!(pending.headers().is_empty());
    }
}
