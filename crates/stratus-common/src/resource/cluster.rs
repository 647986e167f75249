//! Cluster resource: spec, status, and provisioning features.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{upsert_condition, Condition, ConditionedResource, Phase};
use crate::error::Error;

/// A managed cluster snapshot
///
/// Exactly one snapshot is processed at a time per identity; the engine
/// mutates `status` in place and the caller persists the result. The
/// `resource_version` carries the store's optimistic-concurrency token.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Stable cluster identity
    pub name: String,

    /// Opaque version token from the resource store
    #[serde(default)]
    pub resource_version: String,

    /// Desired state, immutable by the engine
    pub spec: ClusterSpec,

    /// Engine-owned observed state
    #[serde(default)]
    pub status: ClusterStatus,
}

/// Desired state of a cluster
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Human-friendly display name
    #[serde(default)]
    pub display_name: String,

    /// Provider type name; selects the delegate provider at runtime
    #[serde(rename = "type")]
    pub type_: String,

    /// Target platform version
    pub version: String,

    /// Provisioning feature toggles
    #[serde(default)]
    pub features: ClusterFeatures,
}

impl ClusterSpec {
    /// Validate the cluster specification
    pub fn validate(&self) -> Result<(), Error> {
        if self.type_.is_empty() {
            return Err(Error::validation("cluster type must not be empty"));
        }
        if self.version.is_empty() {
            return Err(Error::validation("cluster version must not be empty"));
        }
        Ok(())
    }
}

/// Provisioning feature toggles declared on the cluster spec
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterFeatures {
    /// Step types to short-circuit to True without executing the handler.
    /// Skipped steps still occupy their position in the condition list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_conditions: Vec<String>,
}

/// Observed state of a cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Current lifecycle phase
    #[serde(default)]
    pub phase: Phase,

    /// Step outcomes in chain order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Machine-readable failure reason (update/delete flows)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable failure detail (update/delete flows)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Reachable endpoints of the provisioned cluster
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ClusterAddress>,
}

/// One reachable endpoint of a provisioned cluster
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAddress {
    /// Host name or IP
    pub host: String,
    /// Port of the platform API endpoint
    pub port: u16,
}

impl ConditionedResource for Cluster {
    type Spec = ClusterSpec;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &str {
        &self.spec.type_
    }

    fn spec(&self) -> &ClusterSpec {
        &self.spec
    }

    fn phase(&self) -> Phase {
        self.status.phase
    }

    fn set_phase(&mut self, phase: Phase) {
        self.status.phase = phase;
    }

    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn set_condition(&mut self, condition: Condition) {
        upsert_condition(&mut self.status.conditions, condition);
    }

    fn set_failure(&mut self, reason: &str, message: &str) {
        self.status.reason = reason.to_string();
        self.status.message = message.to_string();
    }

    fn clear_failure(&mut self) {
        self.status.reason.clear();
        self.status.message.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ConditionStatus;

    fn cluster() -> Cluster {
        Cluster {
            name: "global".to_string(),
            resource_version: "1".to_string(),
            spec: ClusterSpec {
                display_name: "global".to_string(),
                type_: "baremetal".to_string(),
                version: "1.21.1".to_string(),
                features: ClusterFeatures::default(),
            },
            status: ClusterStatus::default(),
        }
    }

    #[test]
    fn validate_accepts_complete_spec() {
        assert!(cluster().spec.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_type() {
        let mut c = cluster();
        c.spec.type_.clear();
        assert!(c.spec.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_version() {
        let mut c = cluster();
        c.spec.version.clear();
        assert!(c.spec.validate().is_err());
    }

    #[test]
    fn set_condition_upserts_by_type() {
        let mut c = cluster();
        c.set_condition(Condition::new("A", ConditionStatus::Unknown, "", ""));
        c.set_condition(Condition::new("A", ConditionStatus::True, "", ""));
        assert_eq!(c.conditions().len(), 1);
        assert_eq!(c.conditions()[0].status, ConditionStatus::True);
    }

    #[test]
    fn failure_roundtrip() {
        let mut c = cluster();
        c.set_failure("FailedUpdate", "EnsureSystem error: boom");
        assert_eq!(c.status.reason, "FailedUpdate");
        c.clear_failure();
        assert!(c.status.reason.is_empty());
        assert!(c.status.message.is_empty());
    }

    #[test]
    fn status_serde_roundtrip() {
        let mut c = cluster();
        c.status.phase = Phase::Running;
        c.set_condition(Condition::new("EnsureSystem", ConditionStatus::True, "", ""));
        c.status.addresses.push(ClusterAddress {
            host: "10.0.0.1".to_string(),
            port: 6443,
        });
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Cluster = serde_json::from_str(&json).unwrap();
        assert_eq!(c, parsed);
    }
}
