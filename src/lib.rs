//! Bearer JWT authentication strategy.
//!
//! A request is authenticated in three steps: the token is taken from
//! `Authorization: Bearer <token>`, verified against the configured key and
//! options, then handed to an application [`IdentityResolver`]. The result is
//! always exactly one [`AuthOutcome`]: success, fail (401-class) or error
//! (5xx-class).
//!
//! ```ignore
//! let strategy = JwtStrategy::new(
//!     StrategyConfig::from_env()?,
//!     resolver_fn(|claims: TokenClaims| async move {
//!         Resolution::found(claims.get("userId").cloned())
//!     }),
//! )?;
//!
//! let mut registry = StrategyRegistry::new();
//! registry.register(strategy);
//! let app = middleware::auth::apply(router, AuthGuard::new(Arc::new(registry), STRATEGY_NAME));
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod services;

pub use config::{KeyMaterial, StrategyConfig, VerificationOptions};
pub use error::{AuthError, AuthRejection, ConfigError, RegistryError};
pub use extractors::{AuthUser, Authenticated};
pub use middleware::auth::AuthGuard;
pub use services::auth::{
    AuthOutcome, AuthenticateOptions, IdentityResolver, JwtStrategy, Resolution, STRATEGY_NAME,
    Strategy, StrategyRegistry, TokenClaims, attached_claims, parse_auth_header,
    request_resolver_fn, resolver_fn,
};
