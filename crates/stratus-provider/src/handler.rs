//! Named provisioning steps.
//!
//! A handler is one idempotent step in a chain. Its stable name doubles as
//! the condition type recorded on the resource, which is what lets a
//! half-provisioned resource resume at the right step after a restart.

use async_trait::async_trait;
use futures::future::BoxFuture;
use stratus_common::{ClusterContext, Result};

use stratus_common::resource::ConditionedResource;

/// One named, idempotent provisioning step
///
/// Names must be unique within a chain and stable across releases: a
/// renamed handler orphans every persisted condition that references the
/// old name.
#[async_trait]
pub trait Handler<R: ConditionedResource>: Send + Sync {
    /// Stable step name, recorded as the condition type
    fn name(&self) -> &str;

    /// Execute the step against the resource
    ///
    /// Must be idempotent: the engine re-runs a step after any failure,
    /// and an at-least-once store can replay a completed one.
    async fn run(&self, resource: &mut R, ctx: &ClusterContext) -> Result<()>;
}

/// A handler built from a name and an async closure
///
/// Lets providers assemble chains from plain functions without declaring
/// a struct per step. Use via [`handler`].
pub struct FnHandler<R> {
    name: String,
    #[allow(clippy::type_complexity)]
    f: Box<dyn for<'a> Fn(&'a mut R, &'a ClusterContext) -> BoxFuture<'a, Result<()>> + Send + Sync>,
}

/// Wrap an async closure as a named [`Handler`]
pub fn handler<R, F>(name: impl Into<String>, f: F) -> FnHandler<R>
where
    R: ConditionedResource,
    F: for<'a> Fn(&'a mut R, &'a ClusterContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
{
    FnHandler {
        name: name.into(),
        f: Box::new(f),
    }
}

#[async_trait]
impl<R: ConditionedResource> Handler<R> for FnHandler<R> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, resource: &mut R, ctx: &ClusterContext) -> Result<()> {
        (self.f)(resource, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use stratus_common::resource::{Machine, MachineSpec, MachineStatus, Phase};
    use stratus_common::resource::{Cluster, ClusterFeatures, ClusterSpec, ClusterStatus};

    fn machine() -> Machine {
        Machine {
            name: "mc-a1".to_string(),
            resource_version: String::new(),
            spec: MachineSpec {
                cluster_name: "global".to_string(),
                type_: "baremetal".to_string(),
                ip: "192.168.1.10".to_string(),
            },
            status: MachineStatus::default(),
        }
    }

    fn ctx() -> ClusterContext {
        ClusterContext::new(Cluster {
            name: "global".to_string(),
            resource_version: String::new(),
            spec: ClusterSpec {
                display_name: String::new(),
                type_: "baremetal".to_string(),
                version: "1.21.1".to_string(),
                features: ClusterFeatures::default(),
            },
            status: ClusterStatus::default(),
        })
    }

    #[tokio::test]
    async fn fn_handler_runs_closure_against_resource() {
        let h = handler("EnsureSystem", |m: &mut Machine, _ctx| {
            async move {
                m.set_phase(Phase::Upgrading);
                Ok(())
            }
            .boxed()
        });

        let mut m = machine();
        assert_eq!(h.name(), "EnsureSystem");
        h.run(&mut m, &ctx()).await.unwrap();
        assert_eq!(m.status.phase, Phase::Upgrading);
    }

    #[tokio::test]
    async fn fn_handler_propagates_errors() {
        let h = handler("EnsureKubelet", |_m: &mut Machine, _ctx| {
            async move { Err(stratus_common::Error::internal("step", "boom")) }.boxed()
        });

        let mut m = machine();
        assert!(h.run(&mut m, &ctx()).await.is_err());
    }
}
