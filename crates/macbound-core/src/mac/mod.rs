//! MAC provider interface
//!
//! The protocol layer consumes MAC computation through the [`MacProvider`]
//! trait and never inspects concrete provider types: the only capability it
//! needs is the [`SessionMode`] query, which decides how many exchanges a
//! provider may sign and which hint applies when the server reports a
//! session-related failure.

pub mod sha256;

use std::fmt;

use crate::Result;

pub use sha256::{KeyMaterial, SessionHmac, SingleExchangeHmac};

/// Which leg of an exchange a MAC computation or validation applies to
///
/// The phase tag lets a provider use different derived keys or counters for
/// the request and response legs of the same exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// The outbound request leg
    Request,
    /// The inbound response leg
    Response,
}

impl RequestPhase {
    /// Wire-level label for this phase
    pub fn label(&self) -> &'static str {
        match self {
            RequestPhase::Request => "request",
            RequestPhase::Response => "response",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Capability flag distinguishing stateless from session-aware providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Single-use: at most one signed exchange per protocol-layer instance
    Stateless,
    /// Session-aware: unbounded exchanges under one established session
    Session,
}

impl SessionMode {
    pub fn is_session(&self) -> bool {
        matches!(self, SessionMode::Session)
    }
}

/// Trait for MAC computation and validation backing the protocol layer
///
/// Implementations own the shared secret and any session-lifetime state.
/// The protocol layer holds a shared reference for the lifetime of the
/// signer/verifier pair and dispatches on [`MacProvider::session_mode`]
/// rather than on concrete types.
pub trait MacProvider: Send + Sync {
    /// Compute a MAC over `message` for the given exchange phase
    fn compute_mac(&self, message: &str, phase: RequestPhase) -> Result<String>;

    /// Validate `received_mac` against the MAC this provider computes over
    /// `expected_message` for the given phase
    ///
    /// Fails with [`Error::MacMismatch`](crate::Error::MacMismatch) on
    /// cryptographic inequality.
    fn validate_mac(
        &self,
        expected_message: &str,
        received_mac: &str,
        phase: RequestPhase,
    ) -> Result<()>;

    /// Identifier of the key this provider signs with
    fn key_id(&self) -> &str;

    /// Nonce value to carry in the authentication header
    fn nonce_value(&self) -> String;

    /// Whether this provider is single-use or session-aware
    fn session_mode(&self) -> SessionMode;
}
