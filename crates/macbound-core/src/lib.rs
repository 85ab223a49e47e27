//! Macbound Core - client-side HMAC request authentication over HTTP
//!
//! This crate signs outgoing HTTP requests with an HMAC derived from a
//! shared secret and validates that the server's response carries a
//! matching signature computed from the same secret and an agreed message.
//!
//! # Main Components
//!
//! - **Error Handling**: Comprehensive error types using `thiserror` and `anyhow`
//! - **MAC Providers**: The [`MacProvider`] trait plus bundled HMAC-SHA256
//!   implementations (single-use and session-aware)
//! - **Protocol**: Header codec, request signer, response verifier, exchange
//!   discipline, and 401 failure classification
//! - **HTTP Client**: The [`HmacClient`] orchestrator over a pluggable
//!   transport
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use macbound_core::{CallOptions, HmacClient, KeyMaterial, Result, SessionHmac};
//!
//! async fn example() -> Result<()> {
//!     let provider = Arc::new(SessionHmac::establish(KeyMaterial::from_env()?));
//!     let mut client = HmacClient::with_default_config()?.with_provider(provider);
//!
//!     let response = client
//!         .call("GET", "https://api.example.com/v1/items", CallOptions::new())
//!         .await?;
//!     println!("status: {}", response.status());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod mac;
pub mod protocol;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use http::{
    CallOptions, ClientConfig, HmacClient, OutboundRequest, PendingHeaders, ReqwestTransport,
    Transport, TransportResponse,
};
pub use mac::{
    KeyMaterial, MacProvider, RequestPhase, SessionHmac, SessionMode, SingleExchangeHmac,
};
pub use protocol::{
    AuthFailure, AuthHeader, ExchangeGuard, FailureClassifier, RequestSigner, ResponseVerifier,
    AUTH_HEADER_NAME, PROTOCOL_VERSION,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
