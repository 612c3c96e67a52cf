/*!
 * Authenticated user extractor
 *
 * Responsibility:
 * - Hand the identity produced by the auth middleware to handlers
 * - axum dependent code lives in core, the context type in types
 */

mod core;
mod types;

pub use self::core::AuthUser;
pub use types::Authenticated;
