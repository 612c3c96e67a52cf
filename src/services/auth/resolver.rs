use std::{future::Future, pin::Pin};

use axum::http::request::Parts;
use serde_json::Value;
use tower::BoxError;

use crate::services::auth::claims::TokenClaims;

/// What an identity resolver reports back for a verified token.
#[derive(Debug)]
pub enum Resolution<U> {
    /// The claims map to a known identity.
    Found { user: U, info: Option<Value> },
    /// The token was valid but does not belong to any known/authorized identity.
    NotFound,
    /// Resolution itself broke (backing store down, ...).
    Error(BoxError),
}

impl<U> Resolution<U> {
    pub fn found(user: U) -> Self {
        Self::Found { user, info: None }
    }

    pub fn found_with_info(user: U, info: Value) -> Self {
        Self::Found {
            user,
            info: Some(info),
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn error(err: impl Into<BoxError>) -> Self {
        Self::Error(err.into())
    }
}

impl<U, E> From<Result<Option<U>, E>> for Resolution<U>
where
    E: Into<BoxError>,
{
    fn from(result: Result<Option<U>, E>) -> Self {
        match result {
            Ok(Some(user)) => Self::found(user),
            Ok(None) => Self::NotFound,
            Err(err) => Self::error(err),
        }
    }
}

pub type ResolveFuture<'a, U> = Pin<Box<dyn Future<Output = Resolution<U>> + Send + 'a>>;

/// Maps verified claims to an application identity.
///
/// `request` is `Some` only when the strategy was configured to pass the
/// request through. The resolver is invoked at most once per attempt and may
/// complete on a later turn; no timeout is imposed on it.
pub trait IdentityResolver<U>: Send + Sync {
    fn resolve<'a>(&'a self, request: Option<&'a Parts>, claims: TokenClaims)
    -> ResolveFuture<'a, U>;
}

/// Resolver built from a closure over the claims only.
pub struct ClaimsFn<F>(F);

/// Resolver built from a closure that also sees the request.
pub struct RequestFn<F>(F);

pub fn resolver_fn<U, F, Fut>(f: F) -> ClaimsFn<F>
where
    F: Fn(TokenClaims) -> Fut + Send + Sync,
    Fut: Future<Output = Resolution<U>> + Send + 'static,
{
    ClaimsFn(f)
}

/// ```ignore
/// let resolver = request_resolver_fn(|req, claims| {
///     Box::pin(async move {
///         let tenant = req.and_then(|r| r.headers.get("x-tenant")).cloned();
///         lookup(tenant, claims).await.into()
///     })
/// });
/// ```
pub fn request_resolver_fn<U, F>(f: F) -> RequestFn<F>
where
    F: for<'a> Fn(Option<&'a Parts>, TokenClaims) -> ResolveFuture<'a, U> + Send + Sync,
{
    RequestFn(f)
}

impl<U, F, Fut> IdentityResolver<U> for ClaimsFn<F>
where
    F: Fn(TokenClaims) -> Fut + Send + Sync,
    Fut: Future<Output = Resolution<U>> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        _request: Option<&'a Parts>,
        claims: TokenClaims,
    ) -> ResolveFuture<'a, U> {
        Box::pin((self.0)(claims))
    }
}

impl<U, F> IdentityResolver<U> for RequestFn<F>
where
    F: for<'a> Fn(Option<&'a Parts>, TokenClaims) -> ResolveFuture<'a, U> + Send + Sync,
{
    fn resolve<'a>(
        &'a self,
        request: Option<&'a Parts>,
        claims: TokenClaims,
    ) -> ResolveFuture<'a, U> {
        (self.0)(request, claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn from_result() {
        let r: Resolution<u32> = Ok::<_, io::Error>(Some(7)).into();
        assert!(matches!(r, Resolution::Found { user: 7, info: None }));

        let r: Resolution<u32> = Ok::<_, io::Error>(None).into();
        assert!(matches!(r, Resolution::NotFound));

        let r: Resolution<u32> = Err::<Option<u32>, _>(io::Error::other("down")).into();
        assert!(matches!(r, Resolution::Error(e) if e.to_string() == "down"));
    }

    #[tokio::test]
    async fn closure_resolver_ignores_request() {
        let resolver = resolver_fn(|claims: TokenClaims| async move {
            Resolution::found(claims.sub().unwrap_or_default().to_string())
        });

        let claims: TokenClaims = serde_json::from_value(serde_json::json!({ "sub": "alice" })).unwrap();

        match resolver.resolve(None, claims).await {
            Resolution::Found { user, .. } => assert_eq!(user, "alice"),
            other => panic!("unexpected resolution: {other:?}"),
        }
    }
}
