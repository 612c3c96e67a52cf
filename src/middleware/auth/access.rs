//! Strategy → request extensions (`Authenticated<U>` + `TokenClaims`)
//!
//! Authorization (roles, ownership) is left to handlers/services.
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, error};

use crate::error::AuthRejection;
use crate::extractors::Authenticated;
use crate::services::auth::{AuthOutcome, AuthenticateOptions, StrategyRegistry};

/// Which strategy to run for a route tree, and how.
pub struct AuthGuard<U> {
    registry: Arc<StrategyRegistry<U>>,
    scheme: Arc<str>,
    options: AuthenticateOptions,
}

impl<U> Clone for AuthGuard<U> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            scheme: self.scheme.clone(),
            options: self.options.clone(),
        }
    }
}

impl<U> AuthGuard<U> {
    pub fn new(registry: Arc<StrategyRegistry<U>>, scheme: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            scheme: scheme.into(),
            options: AuthenticateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AuthenticateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

/// Protects every route of `router` with `guard`.
///
/// ```ignore
/// let mut registry = StrategyRegistry::new();
/// registry.register(JwtStrategy::new(config, resolver)?);
/// let guard = AuthGuard::new(Arc::new(registry), STRATEGY_NAME);
/// let app = middleware::auth::apply(Router::new().route("/", get(me)), guard);
/// ```
pub fn apply<S, U>(router: Router<S>, guard: AuthGuard<U>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(guard, authenticate_request::<U>))
}

async fn authenticate_request<U>(
    State(guard): State<AuthGuard<U>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection>
where
    U: Clone + Send + Sync + 'static,
{
    // Strategies work on `Parts`; the body is never read and is handed back untouched.
    let (mut parts, body) = req.into_parts();

    let outcome = guard
        .registry
        .authenticate(&guard.scheme, &mut parts, &guard.options)
        .await
        .inspect_err(|err| error!(error = %err, "authentication guard misconfigured"))?;

    match outcome {
        AuthOutcome::Success { user, info } => {
            // middleware → extractor (AuthUser<U>)
            parts.extensions.insert(Authenticated { user, info });
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        AuthOutcome::Fail { message } => {
            // client input (bad header / token / unknown user): not worth a warn here,
            // the strategy already logged verification failures
            debug!(scheme = %guard.scheme, %message, "authentication failed");
            Err(AuthRejection::unauthorized(message))
        }
        AuthOutcome::Error(err) => {
            error!(scheme = %guard.scheme, error = %err, "authentication errored");
            Err(AuthRejection::Internal)
        }
    }
}
