//! The delegate provider: a condition-driven provisioning state machine.
//!
//! Create flows advance one step per invocation, recording each step's
//! outcome as a condition on the resource. Update and delete flows run
//! their whole chain and stop at the first error. The engine is generic
//! over any [`ConditionedResource`], so cluster and machine providers
//! share one implementation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use stratus_common::resource::{
    Condition, ConditionStatus, ConditionedResource, Phase, CONDITION_DONE,
    CONDITION_HEALTH_CHECK, REASON_FAILED_DELETE, REASON_FAILED_HEALTH_CHECK, REASON_FAILED_INIT,
    REASON_FAILED_UPDATE, REASON_SKIP, REASON_WAITING,
};
use stratus_common::{ClusterContext, Error, Result};

use crate::handler::Handler;
use crate::health::HealthProbe;

type HookFn<R> = Box<dyn Fn(&mut R) -> Result<()> + Send + Sync>;
type ValidateFn<R> = Box<dyn Fn(&R) -> Result<()> + Send + Sync>;
type ValidateUpdateFn<R> = Box<dyn Fn(&R, &R) -> Result<()> + Send + Sync>;
type NeedUpdateFn<R> = Box<dyn Fn(&R, &R) -> bool + Send + Sync>;

/// A provider assembled from ordered handler chains
///
/// One instance serves every resource of its type; it holds no
/// per-resource state. All progress lives in the resource's conditions,
/// which is what makes create flows resumable after a crash.
///
/// Build instances with [`DelegateProvider::builder`].
pub struct DelegateProvider<R: ConditionedResource> {
    name: String,
    create_handlers: Vec<Arc<dyn Handler<R>>>,
    update_handlers: Vec<Arc<dyn Handler<R>>>,
    delete_handlers: Vec<Arc<dyn Handler<R>>>,
    validate_fn: Option<ValidateFn<R>>,
    validate_update_fn: Option<ValidateUpdateFn<R>>,
    pre_create_fn: Option<HookFn<R>>,
    after_create_fn: Option<HookFn<R>>,
    need_update_fn: Option<NeedUpdateFn<R>>,
    health_probe: Option<Arc<dyn HealthProbe<R>>>,
}

impl<R: ConditionedResource> std::fmt::Debug for DelegateProvider<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegateProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<R: ConditionedResource> DelegateProvider<R> {
    /// Start building a provider with the given type name
    pub fn builder(name: impl Into<String>) -> DelegateProviderBuilder<R> {
        DelegateProviderBuilder::new(name)
    }

    /// The provider's type name, matched against `spec.type`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate a new resource's spec
    pub fn validate(&self, resource: &R) -> Result<()> {
        match &self.validate_fn {
            Some(f) => f(resource),
            None => Ok(()),
        }
    }

    /// Validate a spec change
    pub fn validate_update(&self, resource: &R, old: &R) -> Result<()> {
        match &self.validate_update_fn {
            Some(f) => f(resource, old),
            None => Ok(()),
        }
    }

    /// Hook invoked once before the create chain starts
    pub fn pre_create(&self, resource: &mut R) -> Result<()> {
        match &self.pre_create_fn {
            Some(f) => f(resource),
            None => Ok(()),
        }
    }

    /// Hook invoked once after the create chain completes
    pub fn after_create(&self, resource: &mut R) -> Result<()> {
        match &self.after_create_fn {
            Some(f) => f(resource),
            None => Ok(()),
        }
    }

    /// Provider-specific supplement to the admission filter
    ///
    /// Defaults to false; the generic filter already covers spec, phase,
    /// and condition changes.
    pub fn need_update(&self, old: &R, new: &R) -> bool {
        match &self.need_update_fn {
            Some(f) => f(old, new),
            None => false,
        }
    }

    /// Advance the create chain by exactly one step
    ///
    /// Locates the first pending condition (seeding the first handler's
    /// condition on a fresh resource), executes its handler unless the
    /// step is skip-listed, records the outcome, and seeds the next
    /// step's condition. When the completed step was the last in the
    /// chain the resource transitions to `Running`.
    ///
    /// Returns the handler's error unchanged after recording it; the
    /// caller persists the mutated resource either way and schedules a
    /// retry, which re-enters at the same (now False) condition.
    #[instrument(skip(self, resource, ctx), fields(provider = %self.name, resource = %resource.name()))]
    pub async fn on_create(&self, resource: &mut R, ctx: &ClusterContext) -> Result<()> {
        let condition = self.create_current_condition(resource)?;

        if ctx.skip_conditions().contains(&condition.type_) {
            debug!(step = %condition.type_, "skipping step");
            resource.set_condition(Condition::new(
                &condition.type_,
                ConditionStatus::True,
                REASON_SKIP,
                "skip current condition",
            ));
        } else {
            let handler = self
                .create_handler(&condition.type_)
                .ok_or_else(|| Error::handler_not_found(&condition.type_))?;

            debug!(step = %condition.type_, "doing");
            let start = Instant::now();
            let result = handler.run(resource, ctx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            if let Err(e) = result {
                warn!(step = %condition.type_, elapsed_ms, error = %e, "done");
                resource.set_condition(Condition::new(
                    &condition.type_,
                    ConditionStatus::False,
                    REASON_FAILED_INIT,
                    e.to_string(),
                ));
                return Err(e);
            }
            info!(step = %condition.type_, elapsed_ms, "done");

            resource.set_condition(Condition::new(
                &condition.type_,
                ConditionStatus::True,
                "",
                "",
            ));
        }

        let next = self.next_condition_type(&condition.type_);
        if next == CONDITION_DONE {
            info!("create chain complete");
            resource.set_phase(Phase::Running);
        } else {
            resource.set_condition(Condition::new(
                next,
                ConditionStatus::Unknown,
                REASON_WAITING,
                "waiting execute",
            ));
        }

        Ok(())
    }

    /// Run the whole update chain, stopping at the first error
    ///
    /// No-op unless the resource is `Upgrading`. A failing handler's
    /// name and error are recorded on the resource status; a full pass
    /// clears any previous failure.
    #[instrument(skip(self, resource, ctx), fields(provider = %self.name, resource = %resource.name()))]
    pub async fn on_update(&self, resource: &mut R, ctx: &ClusterContext) -> Result<()> {
        if resource.phase() != Phase::Upgrading {
            return Ok(());
        }

        self.run_chain(&self.update_handlers, resource, ctx, REASON_FAILED_UPDATE)
            .await
    }

    /// Run the whole delete chain, stopping at the first error
    ///
    /// Runs in any phase: deletes must be honored even for resources
    /// that never finished provisioning.
    #[instrument(skip(self, resource, ctx), fields(provider = %self.name, resource = %resource.name()))]
    pub async fn on_delete(&self, resource: &mut R, ctx: &ClusterContext) -> Result<()> {
        self.run_chain(&self.delete_handlers, resource, ctx, REASON_FAILED_DELETE)
            .await
    }

    /// Evaluate health and fold the outcome into phase and conditions
    ///
    /// No-op unless the resource has reached a provisioned phase
    /// (`Running` or `Failed`). A successful probe (or no probe at all)
    /// reports `Running` with a True `HealthCheck` condition; a failed
    /// probe reports `Failed` with a False condition carrying the error.
    /// The probe time always advances, feeding the admission filter's
    /// re-probe gate.
    #[instrument(skip(self, resource, ctx), fields(provider = %self.name, resource = %resource.name()))]
    pub async fn on_health_check(&self, mut resource: R, ctx: &ClusterContext) -> R {
        if !resource.phase().is_provisioned() {
            return resource;
        }

        let outcome = match &self.health_probe {
            Some(probe) => probe.probe(&resource, ctx).await,
            None => Ok(()),
        };

        match outcome {
            Ok(()) => {
                resource.set_phase(Phase::Running);
                resource.set_condition(Condition::new(
                    CONDITION_HEALTH_CHECK,
                    ConditionStatus::True,
                    "",
                    "",
                ));
            }
            Err(e) => {
                resource.set_phase(Phase::Failed);
                resource.set_condition(Condition::new(
                    CONDITION_HEALTH_CHECK,
                    ConditionStatus::False,
                    REASON_FAILED_HEALTH_CHECK,
                    e.to_string(),
                ));
            }
        }

        info!(phase = %resource.phase(), "updated health status");
        resource
    }

    async fn run_chain(
        &self,
        handlers: &[Arc<dyn Handler<R>>],
        resource: &mut R,
        ctx: &ClusterContext,
        failure_reason: &str,
    ) -> Result<()> {
        for handler in handlers {
            debug!(step = %handler.name(), "doing");
            let start = Instant::now();
            let result = handler.run(resource, ctx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            if let Err(e) = result {
                warn!(step = %handler.name(), elapsed_ms, error = %e, "done");
                resource.set_failure(failure_reason, &format!("{} error: {}", handler.name(), e));
                return Err(e);
            }
            info!(step = %handler.name(), elapsed_ms, "done");
        }

        resource.clear_failure();
        Ok(())
    }

    /// The condition the next create round must act on.
    ///
    /// Fresh resources get the first handler's condition seeded; resumed
    /// resources yield their first pending (False or Unknown) condition.
    fn create_current_condition(&self, resource: &R) -> Result<Condition> {
        if resource.phase() == Phase::Running {
            return Err(Error::already_running(resource.name()));
        }
        if self.create_handlers.is_empty() {
            return Err(Error::no_handlers(&self.name));
        }

        if resource.conditions().is_empty() {
            return Ok(Condition::new(
                self.create_handlers[0].name(),
                ConditionStatus::Unknown,
                REASON_WAITING,
                "waiting process",
            ));
        }

        resource
            .conditions()
            .iter()
            .find(|c| c.status.is_pending())
            .cloned()
            .ok_or_else(|| Error::no_pending_condition(resource.name()))
    }

    fn create_handler(&self, condition_type: &str) -> Option<&Arc<dyn Handler<R>>> {
        self.create_handlers
            .iter()
            .find(|h| h.name() == condition_type)
    }

    /// Name of the step following `condition_type` in the create chain,
    /// or the terminal sentinel when it was the last one. An unknown
    /// type also maps to the sentinel, so a resource whose persisted
    /// conditions outrun a shortened chain still terminates.
    fn next_condition_type(&self, condition_type: &str) -> String {
        let i = self
            .create_handlers
            .iter()
            .position(|h| h.name() == condition_type)
            .unwrap_or(self.create_handlers.len() - 1);

        if i == self.create_handlers.len() - 1 {
            CONDITION_DONE.to_string()
        } else {
            self.create_handlers[i + 1].name().to_string()
        }
    }
}

/// Builder for [`DelegateProvider`]
///
/// `build` validates the configuration: the provider needs a non-empty
/// name, and handler names must be unique within each chain (a duplicate
/// would make the persisted condition list ambiguous).
pub struct DelegateProviderBuilder<R: ConditionedResource> {
    name: String,
    create_handlers: Vec<Arc<dyn Handler<R>>>,
    update_handlers: Vec<Arc<dyn Handler<R>>>,
    delete_handlers: Vec<Arc<dyn Handler<R>>>,
    validate_fn: Option<ValidateFn<R>>,
    validate_update_fn: Option<ValidateUpdateFn<R>>,
    pre_create_fn: Option<HookFn<R>>,
    after_create_fn: Option<HookFn<R>>,
    need_update_fn: Option<NeedUpdateFn<R>>,
    health_probe: Option<Arc<dyn HealthProbe<R>>>,
}

impl<R: ConditionedResource> DelegateProviderBuilder<R> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_handlers: Vec::new(),
            update_handlers: Vec::new(),
            delete_handlers: Vec::new(),
            validate_fn: None,
            validate_update_fn: None,
            pre_create_fn: None,
            after_create_fn: None,
            need_update_fn: None,
            health_probe: None,
        }
    }

    /// Append a step to the create chain
    pub fn create_handler(mut self, handler: impl Handler<R> + 'static) -> Self {
        self.create_handlers.push(Arc::new(handler));
        self
    }

    /// Append a step to the update chain
    pub fn update_handler(mut self, handler: impl Handler<R> + 'static) -> Self {
        self.update_handlers.push(Arc::new(handler));
        self
    }

    /// Append a step to the delete chain
    pub fn delete_handler(mut self, handler: impl Handler<R> + 'static) -> Self {
        self.delete_handlers.push(Arc::new(handler));
        self
    }

    /// Set the spec validation hook
    pub fn validate_fn(
        mut self,
        f: impl Fn(&R) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.validate_fn = Some(Box::new(f));
        self
    }

    /// Set the spec-change validation hook
    pub fn validate_update_fn(
        mut self,
        f: impl Fn(&R, &R) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.validate_update_fn = Some(Box::new(f));
        self
    }

    /// Set the pre-create hook
    pub fn pre_create_fn(
        mut self,
        f: impl Fn(&mut R) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.pre_create_fn = Some(Box::new(f));
        self
    }

    /// Set the after-create hook
    pub fn after_create_fn(
        mut self,
        f: impl Fn(&mut R) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.after_create_fn = Some(Box::new(f));
        self
    }

    /// Set the provider-specific admission supplement
    pub fn need_update_fn(
        mut self,
        f: impl Fn(&R, &R) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.need_update_fn = Some(Box::new(f));
        self
    }

    /// Set the health probe
    pub fn health_probe(mut self, probe: impl HealthProbe<R> + 'static) -> Self {
        self.health_probe = Some(Arc::new(probe));
        self
    }

    /// Validate the configuration and build the provider
    pub fn build(self) -> Result<DelegateProvider<R>> {
        if self.name.is_empty() {
            return Err(Error::validation("provider name must not be empty"));
        }

        for (chain, handlers) in [
            ("create", &self.create_handlers),
            ("update", &self.update_handlers),
            ("delete", &self.delete_handlers),
        ] {
            let mut seen = std::collections::HashSet::new();
            for handler in handlers {
                if !seen.insert(handler.name().to_string()) {
                    return Err(Error::validation_for(
                        &self.name,
                        format!("duplicate {chain} handler name {}", handler.name()),
                    ));
                }
            }
        }

        Ok(DelegateProvider {
            name: self.name,
            create_handlers: self.create_handlers,
            update_handlers: self.update_handlers,
            delete_handlers: self.delete_handlers,
            validate_fn: self.validate_fn,
            validate_update_fn: self.validate_update_fn,
            pre_create_fn: self.pre_create_fn,
            after_create_fn: self.after_create_fn,
            need_update_fn: self.need_update_fn,
            health_probe: self.health_probe,
        })
    }
}
