//! Reconciler glue: phase dispatch, persistence, conflict retry.
//!
//! One logical worker owns a resource identity at a time; the reconciler
//! itself holds no per-resource state between invocations, so distinct
//! identities reconcile fully in parallel.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use stratus_common::resource::{ConditionedResource, Phase};
use stratus_common::retry::{retry_with_backoff, RetryConfig};
use stratus_common::{ClusterContext, Result};
use stratus_provider::ProviderRegistry;

use crate::admission::needs_update;
use crate::config::ControllerConfig;
use crate::store::ResourceStore;

/// Drives engine invocations for one resource kind
pub struct Reconciler<R: ConditionedResource> {
    registry: Arc<ProviderRegistry<R>>,
    store: Arc<dyn ResourceStore<R>>,
    config: ControllerConfig,
}

impl<R: ConditionedResource> Reconciler<R> {
    /// Assemble a reconciler from its collaborators
    pub fn new(
        registry: Arc<ProviderRegistry<R>>,
        store: Arc<dyn ResourceStore<R>>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Whether a watch event warrants a reconcile round
    ///
    /// The generic admission filter runs first; the provider-specific
    /// `need_update` hook can additionally force processing. A resource
    /// with an unregistered type contributes nothing here; `reconcile`
    /// surfaces the configuration error.
    pub fn observe(&self, old: &R, new: &R) -> bool {
        if needs_update(old, new, self.config.health_check_period) {
            return true;
        }
        match self.registry.get(new.resource_type()) {
            Ok(provider) => provider.need_update(old, new),
            Err(_) => false,
        }
    }

    /// Run one engine round for the resource and persist the outcome
    ///
    /// Dispatches on phase: Initializing advances the create chain by
    /// one step, Upgrading and Terminating run their full chains,
    /// Running and Failed re-evaluate health. The mutated snapshot is
    /// persisted even when the engine reports an error, so recorded
    /// failures survive; the engine's error is then propagated for the
    /// caller's backoff.
    #[instrument(skip(self, resource, ctx), fields(resource = %resource.name(), phase = %resource.phase()))]
    pub async fn reconcile(&self, mut resource: R, ctx: &ClusterContext) -> Result<R> {
        let provider = self.registry.get(resource.resource_type())?;

        let outcome = match resource.phase() {
            Phase::Initializing => provider.on_create(&mut resource, ctx).await,
            Phase::Upgrading => provider.on_update(&mut resource, ctx).await,
            Phase::Terminating => provider.on_delete(&mut resource, ctx).await,
            Phase::Running | Phase::Failed => {
                resource = provider.on_health_check(resource, ctx).await;
                Ok(())
            }
        };

        if let Err(e) = &outcome {
            warn!(error = %e, "engine round failed, persisting recorded state");
        } else {
            debug!("engine round complete");
        }

        let persisted = self.persist(&resource).await?;
        outcome?;
        Ok(persisted)
    }

    async fn persist(&self, resource: &R) -> Result<R> {
        let retry = RetryConfig {
            max_attempts: self.config.conflict_retries,
            initial_delay: Duration::from_millis(50),
            ..RetryConfig::default()
        };
        retry_with_backoff(&retry, "persist status", || self.store.update(resource)).await
    }
}
