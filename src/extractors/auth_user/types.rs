use serde_json::Value;

/// Identity attached to a request after a strategy reported success.
///
/// `info` is whatever the resolver returned alongside the user (scopes, a
/// message for audit logs, ...), untouched.
#[derive(Debug, Clone)]
pub struct Authenticated<U> {
    pub user: U,
    pub info: Option<Value>,
}
