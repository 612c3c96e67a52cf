use axum::http::{HeaderMap, header};

pub const BEARER_SCHEME: &str = "Bearer";

/// Returns the token of an `Authorization: Bearer <token>` header.
///
/// The header is split on single spaces: the scheme must be exactly `Bearer`
/// and the token is the second piece. `Bearer  abc` (two spaces) therefore
/// yields no token, and anything after the token is ignored.
pub fn parse_auth_header(headers: &HeaderMap) -> Option<&str> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let mut pieces = auth.split(' ');
    if pieces.next()? != BEARER_SCHEME {
        return None;
    }

    pieces.next().filter(|token| !token.is_empty())
}
