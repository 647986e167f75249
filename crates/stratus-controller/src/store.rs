//! Resource store boundary.
//!
//! The reconciler persists engine output through this seam; the concrete
//! transport (an aggregated API, etcd, a test double) lives outside this
//! crate.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use stratus_common::resource::ConditionedResource;
use stratus_common::Result;

/// Get/update access to resource snapshots with optimistic concurrency
///
/// `update` must reject writes carrying a stale `resource_version` with
/// [`stratus_common::Error::Conflict`]; the reconciler retries those
/// with backoff. Watch delivery is the embedding transport's concern;
/// the reconciler only consumes `(old, new)` snapshot pairs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore<R: ConditionedResource + 'static>: Send + Sync {
    /// Fetch the latest snapshot of a resource, if it exists
    async fn get(&self, name: &str) -> Result<Option<R>>;

    /// Persist a mutated snapshot, returning the stored version
    async fn update(&self, resource: &R) -> Result<R>;
}
