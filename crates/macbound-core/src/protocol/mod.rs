//! The HMAC request-authentication protocol
//!
//! This module family carries the design content of the crate:
//! - [`codec`]: wire format of the authentication header
//! - [`signer`]: canonical message construction and request signing
//! - [`verifier`]: response verification
//! - [`session`]: the single-message-vs-session exchange discipline
//! - [`classifier`]: classification of 401 failures reported by the peer

pub mod classifier;
pub mod codec;
pub mod session;
pub mod signer;
pub mod verifier;

pub use classifier::{AuthFailure, FailureClassifier};
pub use codec::AuthHeader;
pub use session::ExchangeGuard;
pub use signer::RequestSigner;
pub use verifier::ResponseVerifier;

/// Protocol version this client speaks
///
/// Version 1 fixes the canonical message rule (method concatenated with the
/// full URI, no separator) and the 4-field header layout. Later versions may
/// redefine either; they are rejected at verification time.
pub const PROTOCOL_VERSION: u32 = 1;

/// Name of the authentication header on both legs of an exchange
pub const AUTH_HEADER_NAME: &str = "HMAC-Authentication";
