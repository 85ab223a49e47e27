//! Bundled HMAC-SHA256 MAC providers
//!
//! Two standard implementations of [`MacProvider`]:
//! - [`SingleExchangeHmac`]: stateless, single-use
//! - [`SessionHmac`]: session-aware, unbounded exchanges
//!
//! Both compute HMAC-SHA256 over the phase label concatenated with the
//! message and encode the digest as lowercase hex. Validation recomputes the
//! expected MAC and compares in constant time.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use super::{MacProvider, RequestPhase, SessionMode};
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Key identifier and shared secret backing an HMAC provider
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    key_id: String,
    secret: String,
}

impl KeyMaterial {
    /// Create from explicit values
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    /// Create from explicit values, expanding `${ENV:VAR}` references
    pub fn resolved(key_id: &str, secret: &str) -> Result<Self> {
        Ok(Self {
            key_id: expand_env_vars(key_id)?,
            secret: expand_env_vars(secret)?,
        })
    }

    /// Create from the `MACBOUND_KEY_ID` and `MACBOUND_SECRET` environment variables
    pub fn from_env() -> Result<Self> {
        let key_id = require_env("MACBOUND_KEY_ID")?;
        let secret = require_env("MACBOUND_SECRET")?;
        Ok(Self { key_id, secret })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Configuration {
        message: format!("Environment variable {} not found", name),
        source: None,
    })
}

/// Expand environment variables in the format ${ENV:VAR_NAME}
fn expand_env_vars(value: &str) -> Result<String> {
    let mut result = value.to_string();

    let re = regex::Regex::new(r"\$\{ENV:([^}]+)\}").expect("Valid regex pattern");

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let env_value = require_env(var_name)?;

        let pattern = format!("${{ENV:{}}}", var_name);
        result = result.replace(&pattern, &env_value);
    }

    Ok(result)
}

fn fresh_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn compute(key: &KeyMaterial, message: &str, phase: RequestPhase) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.secret.as_bytes()).map_err(|e| {
        Error::Configuration {
            message: "Invalid HMAC secret".to_string(),
            source: Some(anyhow::anyhow!("{}", e)),
        }
    })?;
    mac.update(phase.label().as_bytes());
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn validate(
    key: &KeyMaterial,
    expected_message: &str,
    received_mac: &str,
    phase: RequestPhase,
) -> Result<()> {
    let expected = compute(key, expected_message, phase)?;
    let equal: bool =
        subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), received_mac.as_bytes()).into();
    if equal {
        Ok(())
    } else {
        Err(Error::MacMismatch {
            message: format!("{} MAC does not match the agreed message", phase),
        })
    }
}

/// Stateless HMAC-SHA256 provider
///
/// Single-use: the protocol layer permits at most one signed exchange for
/// the lifetime of the client instance this provider is installed in.
#[derive(Debug, Clone)]
pub struct SingleExchangeHmac {
    key: KeyMaterial,
    nonce: String,
}

impl SingleExchangeHmac {
    pub fn new(key: KeyMaterial) -> Self {
        Self {
            key,
            nonce: fresh_nonce(),
        }
    }
}

impl MacProvider for SingleExchangeHmac {
    fn compute_mac(&self, message: &str, phase: RequestPhase) -> Result<String> {
        compute(&self.key, message, phase)
    }

    fn validate_mac(
        &self,
        expected_message: &str,
        received_mac: &str,
        phase: RequestPhase,
    ) -> Result<()> {
        validate(&self.key, expected_message, received_mac, phase)
    }

    fn key_id(&self) -> &str {
        self.key.key_id()
    }

    fn nonce_value(&self) -> String {
        self.nonce.clone()
    }

    fn session_mode(&self) -> SessionMode {
        SessionMode::Stateless
    }
}

/// Session-aware HMAC-SHA256 provider
///
/// Carries the session nonce and establishment time for the lifetime of the
/// session. The protocol layer sees none of this directly; it only queries
/// [`MacProvider::session_mode`].
#[derive(Debug, Clone)]
pub struct SessionHmac {
    key: KeyMaterial,
    session_nonce: String,
    established_at: DateTime<Utc>,
}

impl SessionHmac {
    /// Establish a new session with the given key material
    pub fn establish(key: KeyMaterial) -> Self {
        Self {
            key,
            session_nonce: fresh_nonce(),
            established_at: Utc::now(),
        }
    }

    /// When this session was established
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

impl MacProvider for SessionHmac {
    fn compute_mac(&self, message: &str, phase: RequestPhase) -> Result<String> {
        compute(&self.key, message, phase)
    }

    fn validate_mac(
        &self,
        expected_message: &str,
        received_mac: &str,
        phase: RequestPhase,
    ) -> Result<()> {
        validate(&self.key, expected_message, received_mac, phase)
    }

    fn key_id(&self) -> &str {
        self.key.key_id()
    }

    fn nonce_value(&self) -> String {
        self.session_nonce.clone()
    }

    fn session_mode(&self) -> SessionMode {
        SessionMode::Session
    }
}
