pub mod access;

pub use access::{AuthGuard, apply};
