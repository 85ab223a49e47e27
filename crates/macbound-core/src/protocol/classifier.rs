//! Classification of 401 responses
//!
//! A 401 either comes from the remote HMAC layer, in which case the body
//! follows a small JSON contract (`detail`, optionally `hmac` and
//! `version`), or from something unrelated, in which case the raw body is
//! the best diagnostic available. Session-related rejections get a hint
//! that depends on the local provider variant.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::mac::SessionMode;

/// `detail` value sent when the server wants HMAC authentication
pub const DETAIL_AUTH_REQUIRED: &str = "HMAC Authentication required";

/// `detail` value sent when the server-side HMAC session was never started
///
/// Observed alongside [`DETAIL_AUTH_REQUIRED`] in the wild; both trigger
/// the same session hint but are kept as distinct literals.
pub const DETAIL_SESSION_NOT_STARTED: &str = "5 - Sessão HMAC não iniciada";

const HINT_SESSION_EXPIRED: &str =
    "the HMAC session expired; establish a new session and retry";
const HINT_SESSION_REQUIRED: &str = "the server requires a session-aware client";

/// Classified diagnostic for one 401 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFailure {
    /// The server's `detail` message, or the raw body when the server did
    /// not speak this protocol's error format
    pub detail: String,
    /// Session-state hint derived from the local provider variant
    pub hint: Option<String>,
    /// Server-side HMAC implementation identifier, when reported
    pub server_hmac: Option<String>,
    /// Server-side protocol version, when reported
    pub server_version: Option<String>,
    /// When the failure was observed
    pub observed_at: DateTime<Utc>,
}

impl AuthFailure {
    fn raw(body: &str) -> Self {
        Self {
            detail: body.to_string(),
            hint: None,
            server_hmac: None,
            server_version: None,
            observed_at: Utc::now(),
        }
    }

    /// The diagnostic string carried by
    /// [`Error::RemoteAuthentication`](crate::Error::RemoteAuthentication)
    pub fn message(&self) -> String {
        let mut output = self.detail.clone();
        if let Some(ref hint) = self.hint {
            output.push_str(&format!(" ({})", hint));
        }
        if let Some(ref hmac) = self.server_hmac {
            output.push_str(&format!(" [server hmac={}]", hmac));
        }
        if let Some(ref version) = self.server_version {
            output.push_str(&format!(" [server version={}]", version));
        }
        output
    }

    /// Format as a user-friendly multi-line message
    pub fn format_display(&self, use_color: bool) -> String {
        let mut output = String::new();

        let title = "Remote authentication failure";
        if use_color {
            output.push_str(&title.red().bold().to_string());
        } else {
            output.push_str(title);
        }
        output.push('\n');

        output.push_str(&format!("  Detail: {}\n", self.detail));

        if let Some(ref hint) = self.hint {
            let line = format!("  Hint: {}", hint);
            if use_color {
                output.push_str(&line.yellow().to_string());
            } else {
                output.push_str(&line);
            }
            output.push('\n');
        }

        if self.server_hmac.is_some() || self.server_version.is_some() {
            output.push_str(&format!(
                "  Server: hmac={}, version={}\n",
                self.server_hmac.as_deref().unwrap_or("?"),
                self.server_version.as_deref().unwrap_or("?"),
            ));
        }

        output.push_str(&format!("  Observed: {}\n", self.observed_at.to_rfc3339()));
        output
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Interprets 401 bodies in the light of the local provider variant
///
/// Never mutates counter or session state; a 401 is terminal for the
/// exchange.
pub struct FailureClassifier {
    mode: SessionMode,
}

impl FailureClassifier {
    pub fn new(mode: SessionMode) -> Self {
        Self { mode }
    }

    /// Classify the body of a 401 response
    pub fn classify(&self, body: &str) -> AuthFailure {
        let json: Value = match serde_json::from_str(body) {
            Ok(json) => json,
            Err(_) => return AuthFailure::raw(body),
        };
        let detail = match json.get("detail").and_then(|d| d.as_str()) {
            Some(detail) => detail,
            None => return AuthFailure::raw(body),
        };

        let hint = if detail == DETAIL_AUTH_REQUIRED || detail == DETAIL_SESSION_NOT_STARTED {
            let hint = if self.mode.is_session() {
                HINT_SESSION_EXPIRED
            } else {
                HINT_SESSION_REQUIRED
            };
            Some(hint.to_string())
        } else {
            None
        };

        AuthFailure {
            detail: detail.to_string(),
            hint,
            server_hmac: json.get("hmac").map(field_to_string),
            server_version: json.get("version").map(field_to_string),
            observed_at: Utc::now(),
        }
    }
}

fn field_to_string(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_required_with_stateless_provider() {
        let classifier = FailureClassifier::new(SessionMode::Stateless);
        let failure = classifier.classify(r#"{"detail":"HMAC Authentication required"}"#);

        assert_eq!(failure.detail, DETAIL_AUTH_REQUIRED);
        assert!(failure
            .message()
            .contains("requires a session-aware client"));
    }

    #[test]
    fn test_auth_required_with_session_provider() {
        let classifier = FailureClassifier::new(SessionMode::Session);
        let failure = classifier.classify(r#"{"detail":"HMAC Authentication required"}"#);

        assert!(failure.message().contains("session expired"));
    }

    #[test]
    fn test_session_not_started_triggers_same_hints() {
        let body = r#"{"detail":"5 - Sessão HMAC não iniciada"}"#;

        let stateless = FailureClassifier::new(SessionMode::Stateless).classify(body);
        assert!(stateless
            .message()
            .contains("requires a session-aware client"));

        let session = FailureClassifier::new(SessionMode::Session).classify(body);
        assert!(session.message().contains("session expired"));
    }

    #[test]
    fn test_non_json_body_is_the_diagnostic() {
        let classifier = FailureClassifier::new(SessionMode::Stateless);
        let failure = classifier.classify("<html>gateway error</html>");

        assert_eq!(failure.detail, "<html>gateway error</html>");
        assert_eq!(failure.message(), "<html>gateway error</html>");
        assert!(failure.hint.is_none());
    }

    #[test]
    fn test_json_without_detail_is_the_raw_body() {
        let classifier = FailureClassifier::new(SessionMode::Session);
        let failure = classifier.classify(r#"{"foo":"bar"}"#);

        assert_eq!(failure.detail, r#"{"foo":"bar"}"#);
        assert!(failure.hint.is_none());
    }

    #[test]
    fn test_non_string_detail_is_the_raw_body() {
        let classifier = FailureClassifier::new(SessionMode::Session);
        let failure = classifier.classify(r#"{"detail":42}"#);

        assert_eq!(failure.detail, r#"{"detail":42}"#);
    }

    #[test]
    fn test_server_context_appended_verbatim() {
        let classifier = FailureClassifier::new(SessionMode::Session);
        let failure = classifier.classify(
            r#"{"detail":"HMAC Authentication required","hmac":"srv-impl","version":2}"#,
        );

        assert_eq!(failure.server_hmac.as_deref(), Some("srv-impl"));
        assert_eq!(failure.server_version.as_deref(), Some("2"));
        let message = failure.message();
        assert!(message.contains("srv-impl"));
        assert!(message.contains("version=2"));
    }

    #[test]
    fn test_unrelated_detail_gets_no_hint() {
        let classifier = FailureClassifier::new(SessionMode::Stateless);
        let failure = classifier.classify(r#"{"detail":"token revoked"}"#);

        assert_eq!(failure.detail, "token revoked");
        assert!(failure.hint.is_none());
        assert_eq!(failure.message(), "token revoked");
    }

    #[test]
    fn test_format_display_plain() {
        let classifier = FailureClassifier::new(SessionMode::Stateless);
        let failure = classifier.classify(r#"{"detail":"HMAC Authentication required"}"#);

        let rendered = failure.format_display(false);
        assert!(rendered.contains("Detail: HMAC Authentication required"));
        assert!(rendered.contains("Hint: the server requires a session-aware client"));
    }
}
