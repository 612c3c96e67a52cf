use serde_json::Value;

use crate::error::AuthError;

/// Terminal result of one authentication attempt. Exactly one per call.
#[derive(Debug)]
pub enum AuthOutcome<U> {
    Success { user: U, info: Option<Value> },
    /// Rejected credentials (401-class). Carries the message for the client.
    Fail { message: String },
    /// Internal failure while resolving the identity (5xx-class).
    Error(AuthError),
}

impl<U> AuthOutcome<U> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn user(&self) -> Option<&U> {
        match self {
            Self::Success { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// Per-call knobs supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions {
    /// Replaces every default `Fail` message when set.
    pub bad_request_message: Option<String>,
}

impl AuthenticateOptions {
    pub fn bad_request_message(message: impl Into<String>) -> Self {
        Self {
            bad_request_message: Some(message.into()),
        }
    }

    pub(crate) fn fail_message(&self, default: &str) -> String {
        self.bad_request_message
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}
