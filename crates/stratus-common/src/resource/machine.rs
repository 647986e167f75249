//! Machine resource: a node that joins a managed cluster.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{upsert_condition, Condition, ConditionedResource, Phase};
use crate::error::Error;

/// A managed machine snapshot
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Stable machine identity
    pub name: String,

    /// Opaque version token from the resource store
    #[serde(default)]
    pub resource_version: String,

    /// Desired state, immutable by the engine
    pub spec: MachineSpec,

    /// Engine-owned observed state
    #[serde(default)]
    pub status: MachineStatus,
}

/// Desired state of a machine
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Name of the cluster this machine joins
    pub cluster_name: String,

    /// Provider type name; selects the delegate provider at runtime
    #[serde(rename = "type")]
    pub type_: String,

    /// Address the provider uses to reach the machine
    pub ip: String,
}

impl MachineSpec {
    /// Validate the machine specification
    pub fn validate(&self) -> Result<(), Error> {
        if self.cluster_name.is_empty() {
            return Err(Error::validation("machine cluster name must not be empty"));
        }
        if self.type_.is_empty() {
            return Err(Error::validation("machine type must not be empty"));
        }
        if self.ip.is_empty() {
            return Err(Error::validation("machine ip must not be empty"));
        }
        Ok(())
    }
}

/// Observed state of a machine
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
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
}

impl ConditionedResource for Machine {
    type Spec = MachineSpec;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &str {
        &self.spec.type_
    }

    fn spec(&self) -> &MachineSpec {
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

    fn machine() -> Machine {
        Machine {
            name: "mc-a1".to_string(),
            resource_version: "1".to_string(),
            spec: MachineSpec {
                cluster_name: "global".to_string(),
                type_: "baremetal".to_string(),
                ip: "192.168.1.10".to_string(),
            },
            status: MachineStatus::default(),
        }
    }

    #[test]
    fn validate_accepts_complete_spec() {
        assert!(machine().spec.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut m = machine();
        m.spec.ip.clear();
        assert!(m.spec.validate().is_err());

        let mut m = machine();
        m.spec.cluster_name.clear();
        assert!(m.spec.validate().is_err());
    }

    #[test]
    fn new_machine_starts_initializing() {
        assert_eq!(machine().phase(), Phase::Initializing);
        assert!(machine().conditions().is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let mut m = machine();
        m.set_condition(Condition::new(
            "EnsureKubelet",
            ConditionStatus::False,
            "FailedInit",
            "connection refused",
        ));
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Machine = serde_json::from_str(&json).unwrap();
        assert_eq!(m, parsed);
    }
}
