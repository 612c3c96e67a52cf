pub mod claims;
pub mod header;
pub mod outcome;
pub mod registry;
pub mod resolver;
pub mod strategy;
pub mod token_verifier;

pub use claims::TokenClaims;
pub use header::parse_auth_header;
pub use outcome::{AuthOutcome, AuthenticateOptions};
pub use registry::{SharedStrategy, StrategyRegistry};
pub use resolver::{IdentityResolver, Resolution, ResolveFuture, request_resolver_fn, resolver_fn};
pub use strategy::{JwtStrategy, JwtStrategyBuilder, STRATEGY_NAME, Strategy, attached_claims};
pub use token_verifier::{TokenVerifier, VerifyError};
