//! Wire format of the authentication header
//!
//! The header value is four colon-delimited fields:
//! `"{version}:{keyId}:{nonce}:{mac}"`. This module is pure and stateless;
//! it checks structure only. Semantic checks (version match, MAC
//! correctness) belong to the verifier.

use crate::{Error, Result};

const FIELD_COUNT: usize = 4;

/// Decoded authentication header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub version: u32,
    pub key_id: String,
    pub nonce: String,
    pub mac: String,
}

/// Encode an authentication header value
pub fn encode(version: u32, key_id: &str, nonce: &str, mac: &str) -> String {
    format!("{}:{}:{}:{}", version, key_id, nonce, mac)
}

/// Decode an authentication header value
///
/// Fails with [`Error::MalformedHeader`] unless the value splits into
/// exactly four fields and the version field parses as an integer.
pub fn decode(value: &str) -> Result<AuthHeader> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != FIELD_COUNT {
        return Err(Error::MalformedHeader {
            message: format!(
                "expected {} colon-separated fields, found {}",
                FIELD_COUNT,
                parts.len()
            ),
        });
    }

    let version = parts[0].parse::<u32>().map_err(|_| Error::MalformedHeader {
        message: format!("version field is not an integer: {:?}", parts[0]),
    })?;

    Ok(AuthHeader {
        version,
        key_id: parts[1].to_string(),
        nonce: parts[2].to_string(),
        mac: parts[3].to_string(),
    })
}
