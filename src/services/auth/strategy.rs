//! Bearer JWT strategy: header extraction → token verification → identity resolution.
//!
//! Each call walks `extract → verify → delegate` once and ends in exactly one
//! [`AuthOutcome`]. Nothing is shared between calls except the immutable
//! configuration, so a strategy can serve concurrent requests through `&self`.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;
use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::config::StrategyConfig;
use crate::error::{AuthError, ConfigError};
use crate::services::auth::claims::TokenClaims;
use crate::services::auth::header::parse_auth_header;
use crate::services::auth::outcome::{AuthOutcome, AuthenticateOptions};
use crate::services::auth::resolver::{IdentityResolver, Resolution};
use crate::services::auth::token_verifier::TokenVerifier;

/// Name under which the strategy registers with a [`StrategyRegistry`](super::StrategyRegistry).
pub const STRATEGY_NAME: &str = "jsonwebtoken";

pub const MSG_BAD_HEADER: &str = "Bad Authorization header.";
pub const MSG_BAD_TOKEN: &str = "Bad JWT token.";
pub const MSG_BAD_CREDENTIALS: &str = "Bad credentials.";

/// Request authentication capability a host dispatcher composes by name.
#[async_trait]
pub trait Strategy: Send + Sync {
    type User: Send + 'static;

    fn name(&self) -> &str;

    async fn authenticate(
        &self,
        request: &mut Parts,
        options: &AuthenticateOptions,
    ) -> AuthOutcome<Self::User>;
}

pub struct JwtStrategy<U> {
    verifier: TokenVerifier,
    resolver: Arc<dyn IdentityResolver<U>>,
    pass_request_to_resolver: bool,
}

impl<U> std::fmt::Debug for JwtStrategy<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtStrategy")
            .field("verifier", &self.verifier)
            .field("pass_request_to_resolver", &self.pass_request_to_resolver)
            .finish()
    }
}

impl<U: Send + 'static> JwtStrategy<U> {
    pub fn builder() -> JwtStrategyBuilder<U> {
        JwtStrategyBuilder {
            config: None,
            resolver: None,
        }
    }

    pub fn new<R>(config: StrategyConfig, resolver: R) -> Result<Self, ConfigError>
    where
        R: IdentityResolver<U> + 'static,
    {
        Self::builder().config(config).resolver(resolver).build()
    }

    pub fn passes_request_to_resolver(&self) -> bool {
        self.pass_request_to_resolver
    }

    async fn delegate(
        &self,
        request: &mut Parts,
        claims: TokenClaims,
        options: &AuthenticateOptions,
    ) -> AuthOutcome<U> {
        let resolution = {
            let passed = self.pass_request_to_resolver.then_some(&*request);
            let resolver = self.resolver.as_ref();
            let for_resolver = claims.clone();

            // A panic either while building the future or while polling it is
            // reported through the error channel, never unwound into the host.
            match catch_unwind(AssertUnwindSafe(move || resolver.resolve(passed, for_resolver))) {
                Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(resolution) => resolution,
                    Err(panic) => return resolver_panicked(panic),
                },
                Err(panic) => return resolver_panicked(panic),
            }
        };

        match resolution {
            Resolution::Error(err) => {
                error!(error = %err, "identity resolver failed");
                AuthOutcome::Error(AuthError::Resolver(err))
            }
            Resolution::NotFound => {
                debug!(sub = ?claims.sub(), "no identity for verified token");
                AuthOutcome::fail(options.fail_message(MSG_BAD_CREDENTIALS))
            }
            Resolution::Found { user, info } => {
                // visible to downstream handlers via attached_claims
                request.extensions.insert(claims);
                AuthOutcome::Success { user, info }
            }
        }
    }
}

fn resolver_panicked<U>(panic: Box<dyn Any + Send>) -> AuthOutcome<U> {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    error!(panic = %message, "identity resolver panicked");
    AuthOutcome::Error(AuthError::ResolverPanicked(message))
}

#[async_trait]
impl<U: Send + 'static> Strategy for JwtStrategy<U> {
    type User = U;

    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    async fn authenticate(
        &self,
        request: &mut Parts,
        options: &AuthenticateOptions,
    ) -> AuthOutcome<U> {
        let Some(token) = parse_auth_header(&request.headers) else {
            debug!("missing or malformed authorization header");
            return AuthOutcome::fail(options.fail_message(MSG_BAD_HEADER));
        };

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(error = %err, "bearer token verification failed");
                return AuthOutcome::fail(options.fail_message(MSG_BAD_TOKEN));
            }
        };

        self.delegate(request, claims, options).await
    }
}

/// Reads the claims attached by a successful [`JwtStrategy::authenticate`].
pub fn attached_claims(request: &Parts) -> Option<&TokenClaims> {
    request.extensions.get::<TokenClaims>()
}

pub struct JwtStrategyBuilder<U> {
    config: Option<StrategyConfig>,
    resolver: Option<Arc<dyn IdentityResolver<U>>>,
}

impl<U: Send + 'static> JwtStrategyBuilder<U> {
    pub fn config(mut self, config: StrategyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn resolver<R>(mut self, resolver: R) -> Self
    where
        R: IdentityResolver<U> + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn shared_resolver(mut self, resolver: Arc<dyn IdentityResolver<U>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<JwtStrategy<U>, ConfigError> {
        let config = self.config.ok_or(ConfigError::Missing("secret"))?;
        config.validate()?;
        let resolver = self.resolver.ok_or(ConfigError::Missing("resolver"))?;

        let verifier = TokenVerifier::new(&config.key, &config.verification)?;

        Ok(JwtStrategy {
            verifier,
            resolver,
            pass_request_to_resolver: config.pass_request_to_resolver,
        })
    }
}
