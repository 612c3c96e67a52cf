use std::collections::HashMap;
use std::sync::Arc;

use axum::http::request::Parts;

use crate::error::RegistryError;
use crate::services::auth::outcome::{AuthOutcome, AuthenticateOptions};
use crate::services::auth::strategy::Strategy;

pub type SharedStrategy<U> = Arc<dyn Strategy<User = U>>;

/// Explicit name → strategy table handed to the host.
///
/// Populate it at startup, then share it read-only (`Arc<StrategyRegistry<_>>`).
pub struct StrategyRegistry<U> {
    strategies: HashMap<String, SharedStrategy<U>>,
}

impl<U> Default for StrategyRegistry<U> {
    fn default() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }
}

impl<U: Send + 'static> StrategyRegistry<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `strategy` under its own name, replacing any previous entry.
    pub fn register<S>(&mut self, strategy: S) -> &mut Self
    where
        S: Strategy<User = U> + 'static,
    {
        let name = strategy.name().to_string();
        self.register_as(name, strategy)
    }

    pub fn register_as<S>(&mut self, name: impl Into<String>, strategy: S) -> &mut Self
    where
        S: Strategy<User = U> + 'static,
    {
        self.strategies.insert(name.into(), Arc::new(strategy));
        self
    }

    pub fn get(&self, name: &str) -> Option<SharedStrategy<U>> {
        self.strategies.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    pub async fn authenticate(
        &self,
        name: &str,
        request: &mut Parts,
        options: &AuthenticateOptions,
    ) -> Result<AuthOutcome<U>, RegistryError> {
        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| RegistryError::UnknownStrategy(name.to_string()))?;

        Ok(strategy.authenticate(request, options).await)
    }
}
