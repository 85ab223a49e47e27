//! Response verification
//!
//! Parses the authentication header of a success response, checks the
//! protocol version, and delegates MAC validation to the provider against
//! the canonical message retained at sign time. Only responses in the
//! [200, 299] range reach this path; 401s go to the failure classifier and
//! every other status bypasses verification entirely.

use std::sync::Arc;

use super::codec;
use super::{AUTH_HEADER_NAME, PROTOCOL_VERSION};
use crate::http::transport::TransportResponse;
use crate::mac::{MacProvider, RequestPhase};
use crate::{Error, Result};

/// Verifies the authentication header on success responses
pub struct ResponseVerifier {
    provider: Arc<dyn MacProvider>,
}

impl ResponseVerifier {
    pub fn new(provider: Arc<dyn MacProvider>) -> Self {
        Self { provider }
    }

    /// Verify one success response against the retained canonical message
    pub fn verify(&self, response: &TransportResponse, canonical_message: &str) -> Result<()> {
        let raw = response
            .header(AUTH_HEADER_NAME)
            .ok_or_else(|| Error::MissingAuthHeader {
                header_name: AUTH_HEADER_NAME.to_string(),
            })?;

        let header = codec::decode(raw)?;
        if header.version != PROTOCOL_VERSION {
            return Err(Error::UnsupportedVersion {
                received: header.version,
                supported: PROTOCOL_VERSION,
            });
        }

        self.provider
            .validate_mac(canonical_message, &header.mac, RequestPhase::Response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::{KeyMaterial, SessionHmac, SessionMode};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn provider() -> Arc<SessionHmac> {
        Arc::new(SessionHmac::establish(KeyMaterial::new("key-1", "secret")))
    }

    fn response_with_header(value: &str) -> TransportResponse {
        TransportResponse::new(
            200,
            HashMap::from([(AUTH_HEADER_NAME.to_string(), value.to_string())]),
            Vec::new(),
        )
    }

    #[test]
    fn test_verify_accepts_matching_mac() {
        let provider = provider();
        let canonical = "GEThttps://x/y";
        let mac = provider
            .compute_mac(canonical, RequestPhase::Response)
            .unwrap();
        let response = response_with_header(&codec::encode(1, "key-1", "n", &mac));

        ResponseVerifier::new(provider)
            .verify(&response, canonical)
            .unwrap();
    }

    #[test]
    fn test_missing_header() {
        let response = TransportResponse::new(200, HashMap::new(), Vec::new());
        let result = ResponseVerifier::new(provider()).verify(&response, "GEThttps://x/y");
        assert!(matches!(result, Err(Error::MissingAuthHeader { .. })));
    }

    #[test]
    fn test_malformed_header() {
        let response = response_with_header("a:b:c");
        let result = ResponseVerifier::new(provider()).verify(&response, "GEThttps://x/y");
        assert!(matches!(result, Err(Error::MalformedHeader { .. })));
    }

    #[test]
    fn test_version_mismatch_skips_mac_validation() {
        // A provider that counts validation calls; version 2 must never
        // reach it
        struct CountingProvider(AtomicUsize);
        impl MacProvider for CountingProvider {
            fn compute_mac(&self, _: &str, _: RequestPhase) -> crate::Result<String> {
                Ok("mac".to_string())
            }
            fn validate_mac(&self, _: &str, _: &str, _: RequestPhase) -> crate::Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn key_id(&self) -> &str {
                "key-1"
            }
            fn nonce_value(&self) -> String {
                "n".to_string()
            }
            fn session_mode(&self) -> SessionMode {
                SessionMode::Session
            }
        }

        let counting = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let response = response_with_header("2:k:n:m");
        let result =
            ResponseVerifier::new(counting.clone()).verify(&response, "GEThttps://x/y");

        assert!(matches!(
            result,
            Err(Error::UnsupportedVersion {
                received: 2,
                supported: 1
            })
        ));
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mac_over_other_concatenation_is_rejected() {
        let provider = provider();
        // MAC computed over a delimited variant of the canonical message
        let mac = provider
            .compute_mac("GET https://x/y", RequestPhase::Response)
            .unwrap();
        let response = response_with_header(&codec::encode(1, "key-1", "n", &mac));

        let result = ResponseVerifier::new(provider).verify(&response, "GEThttps://x/y");
        assert!(matches!(result, Err(Error::MacMismatch { .. })));
    }
}
