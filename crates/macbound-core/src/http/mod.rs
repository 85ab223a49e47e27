//! HTTP-facing side of the protocol layer
//!
//! - Request staging and per-call options ([`builder`])
//! - The transport collaborator boundary ([`transport`])
//! - The orchestrating client ([`client`])

pub mod builder;
pub mod client;
pub mod transport;

pub use builder::{CallOptions, OutboundRequest, PendingHeaders};
pub use client::{ClientConfig, HmacClient};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
