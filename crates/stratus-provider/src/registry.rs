//! Provider registry: resource type name to delegate provider.
//!
//! Built once at startup and frozen; resolution at reconcile time is a
//! plain map lookup, never registration.

use std::collections::HashMap;
use std::sync::Arc;

use stratus_common::resource::ConditionedResource;
use stratus_common::{Error, Result};

use crate::delegate::DelegateProvider;

/// Immutable map from `spec.type` to provider
pub struct ProviderRegistry<R: ConditionedResource> {
    providers: HashMap<String, Arc<DelegateProvider<R>>>,
}

impl<R: ConditionedResource> ProviderRegistry<R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its own name
    ///
    /// Fails on a duplicate name: two providers claiming one resource
    /// type would make dispatch ambiguous.
    pub fn register(&mut self, provider: DelegateProvider<R>) -> Result<()> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(Error::validation_for(
                &name,
                "provider is already registered",
            ));
        }
        self.providers.insert(name, Arc::new(provider));
        Ok(())
    }

    /// Resolve the provider for a resource type name
    pub fn get(&self, name: &str) -> Result<Arc<DelegateProvider<R>>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::provider_not_found(name))
    }

    /// Registered provider names, for startup logging
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

impl<R: ConditionedResource> Default for ProviderRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
