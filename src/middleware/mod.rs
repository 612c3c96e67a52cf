/*
 * Responsibility
 * - axum host integration for registered strategies
 */
pub mod auth;
