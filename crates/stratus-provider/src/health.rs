//! External reachability probe behind the health evaluator.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use stratus_common::resource::ConditionedResource;
use stratus_common::{ClusterContext, Result};

/// Reachability check for a provisioned resource
///
/// Implementations reach out to the real system behind the resource (a
/// node, an apiserver endpoint) and return Ok when it is serving. The
/// evaluator in [`crate::DelegateProvider::on_health_check`] turns the
/// outcome into phase and condition updates; probes never mutate the
/// resource themselves.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HealthProbe<R: ConditionedResource + 'static>: Send + Sync {
    /// Check whether the resource is currently healthy
    async fn probe(&self, resource: &R, ctx: &ClusterContext) -> Result<()>;
}
