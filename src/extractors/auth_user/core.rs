use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthRejection;

use super::Authenticated;

/// Handler side of the auth middleware.
/// Returns 401 when no `Authenticated<U>` is present (route not guarded).
pub struct AuthUser<U>(pub Authenticated<U>);

impl<U, S> FromRequestParts<S> for AuthUser<U>
where
    U: Clone + Send + Sync + 'static,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated<U>>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthRejection::unauthorized("unauthenticated"))
    }
}
