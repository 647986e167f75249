//! Resource data model: clusters, machines, and the trait seam that lets
//! one engine drive both.

mod cluster;
mod condition;
mod machine;
mod phase;

pub use cluster::{Cluster, ClusterAddress, ClusterFeatures, ClusterSpec, ClusterStatus};
pub use condition::{
    upsert_condition, Condition, ConditionStatus, CONDITION_DONE, CONDITION_HEALTH_CHECK,
    REASON_FAILED_DELETE, REASON_FAILED_HEALTH_CHECK, REASON_FAILED_INIT, REASON_FAILED_UPDATE,
    REASON_SKIP, REASON_WAITING,
};
pub use machine::{Machine, MachineSpec, MachineStatus};
pub use phase::Phase;

/// A resource whose provisioning progress is tracked through conditions.
///
/// This is the seam between the data model and the engine: the delegate
/// provider and the admission filter are generic over it, so clusters and
/// machines share one state machine instead of duplicating it per kind.
pub trait ConditionedResource: Clone + Send + Sync + 'static {
    /// Desired-state type, compared wholesale by the admission filter
    type Spec: PartialEq + Clone + Send + Sync;

    /// Stable identity of the resource
    fn name(&self) -> &str;

    /// Provider type name used for registry lookup
    fn resource_type(&self) -> &str;

    /// Desired state; the engine never mutates it
    fn spec(&self) -> &Self::Spec;

    /// Current lifecycle phase
    fn phase(&self) -> Phase;

    /// Move the resource to a new phase
    fn set_phase(&mut self, phase: Phase);

    /// Conditions in insertion (= chain) order
    fn conditions(&self) -> &[Condition];

    /// Upsert a condition by type, preserving insertion order
    fn set_condition(&mut self, condition: Condition);

    /// Record a terminal failure reason/message on the status
    fn set_failure(&mut self, reason: &str, message: &str);

    /// Clear any recorded failure reason/message
    fn clear_failure(&mut self);
}
