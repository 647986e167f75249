//! Condition model: tri-state step outcomes attached to resource status.
//!
//! Conditions are the unit of progress for the provisioning engine: the
//! condition list, read in order, mirrors the handler chain up to and
//! including the first incomplete step. The engine only ever overwrites a
//! condition in place by type; it never prunes the list.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type recorded by the health evaluator
pub const CONDITION_HEALTH_CHECK: &str = "HealthCheck";

/// Sentinel condition type meaning the create chain is exhausted
pub const CONDITION_DONE: &str = "Done";

/// Reason set on a freshly seeded, not-yet-executed condition
pub const REASON_WAITING: &str = "Waiting";

/// Reason set when a step is short-circuited by the skip list
pub const REASON_SKIP: &str = "Skip";

/// Reason set when a create handler returns an error
pub const REASON_FAILED_INIT: &str = "FailedInit";

/// Reason recorded on the resource status when an update handler fails
pub const REASON_FAILED_UPDATE: &str = "FailedUpdate";

/// Reason recorded on the resource status when a delete handler fails
pub const REASON_FAILED_DELETE: &str = "FailedDelete";

/// Reason set when the health probe cannot reach the resource
pub const REASON_FAILED_HEALTH_CHECK: &str = "FailedHealthCheck";

/// Tri-state condition status following Kubernetes conventions
///
/// Never a boolean: "not yet evaluated" (Unknown) must stay
/// distinguishable from "evaluated and failing" (False).
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is met
    True,
    /// Condition was evaluated and is not met
    False,
    /// Condition has not been evaluated yet
    #[default]
    Unknown,
}

impl ConditionStatus {
    /// Returns true for False or Unknown, the states that mark a step as
    /// still pending in the create chain.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::False | Self::Unknown)
    }
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One step's evaluated outcome
///
/// `type_` equals the stable name of the handler that owns the step (or a
/// fixed sentinel such as [`CONDITION_HEALTH_CHECK`]). The serialized field
/// shape (`type`, `status`, `reason`, `message`, `lastProbeTime`,
/// `lastTransitionTime`) is the only externally visible state of the engine
/// and must round-trip exactly through the resource store.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition identity, equal to a handler's stable name
    #[serde(rename = "type")]
    pub type_: String,

    /// Tri-state outcome of the step
    pub status: ConditionStatus,

    /// Machine-readable reason code
    #[serde(default)]
    pub reason: String,

    /// Human-readable detail
    #[serde(default)]
    pub message: String,

    /// Last time the step was evaluated; consulted by time-gated
    /// conditions such as the health check
    pub last_probe_time: DateTime<Utc>,

    /// Last time `status` changed
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a condition stamped with the current time
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_probe_time: now,
            last_transition_time: now,
        }
    }
}

/// Upsert a condition by type, preserving insertion order.
///
/// If a condition with the same type exists it is overwritten in place:
/// the probe time always advances, the transition time only when the
/// status actually changed. Otherwise the condition is appended. This is
/// what keeps skipped steps occupying their chain position.
pub fn upsert_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) => {
            if existing.status == condition.status {
                // Same status: keep the original transition time
                existing.last_probe_time = condition.last_probe_time;
                existing.reason = condition.reason;
                existing.message = condition.message;
            } else {
                *existing = condition;
            }
        }
        None => conditions.push(condition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_both_timestamps() {
        let before = Utc::now();
        let condition = Condition::new(
            "EnsureSystem",
            ConditionStatus::Unknown,
            REASON_WAITING,
            "waiting process",
        );
        let after = Utc::now();

        assert_eq!(condition.type_, "EnsureSystem");
        assert_eq!(condition.status, ConditionStatus::Unknown);
        assert!(condition.last_probe_time >= before && condition.last_probe_time <= after);
        assert_eq!(condition.last_probe_time, condition.last_transition_time);
    }

    #[test]
    fn default_status_is_unknown() {
        assert_eq!(ConditionStatus::default(), ConditionStatus::Unknown);
    }

    #[test]
    fn pending_states() {
        assert!(ConditionStatus::Unknown.is_pending());
        assert!(ConditionStatus::False.is_pending());
        assert!(!ConditionStatus::True.is_pending());
    }

    mod upsert {
        use super::*;

        /// Story: the engine overwrites a step's condition in place.
        ///
        /// When step "B" flips from Unknown to True, the list keeps its
        /// order (A, B); the engine never appends a duplicate entry.
        #[test]
        fn story_overwrite_preserves_chain_order() {
            let mut conditions = vec![
                Condition::new("A", ConditionStatus::True, "", ""),
                Condition::new("B", ConditionStatus::Unknown, REASON_WAITING, ""),
            ];

            upsert_condition(
                &mut conditions,
                Condition::new("B", ConditionStatus::True, "", ""),
            );

            assert_eq!(conditions.len(), 2);
            assert_eq!(conditions[0].type_, "A");
            assert_eq!(conditions[1].type_, "B");
            assert_eq!(conditions[1].status, ConditionStatus::True);
        }

        #[test]
        fn appends_unseen_type() {
            let mut conditions = vec![Condition::new("A", ConditionStatus::True, "", "")];
            upsert_condition(
                &mut conditions,
                Condition::new("B", ConditionStatus::Unknown, REASON_WAITING, ""),
            );
            assert_eq!(conditions.len(), 2);
            assert_eq!(conditions[1].type_, "B");
        }

        /// Story: re-probing an unchanged condition advances only the
        /// probe time, so the admission filter's time gate sees fresh
        /// probes without spurious "transitions".
        #[test]
        fn story_same_status_keeps_transition_time() {
            let mut first = Condition::new(CONDITION_HEALTH_CHECK, ConditionStatus::True, "", "");
            first.last_transition_time = Utc::now() - chrono::Duration::minutes(10);
            first.last_probe_time = first.last_transition_time;
            let transition = first.last_transition_time;
            let mut conditions = vec![first];

            upsert_condition(
                &mut conditions,
                Condition::new(CONDITION_HEALTH_CHECK, ConditionStatus::True, "", ""),
            );

            assert_eq!(conditions[0].last_transition_time, transition);
            assert!(conditions[0].last_probe_time > transition);
        }

        #[test]
        fn status_change_advances_transition_time() {
            let mut first = Condition::new(CONDITION_HEALTH_CHECK, ConditionStatus::True, "", "");
            first.last_transition_time = Utc::now() - chrono::Duration::minutes(10);
            let transition = first.last_transition_time;
            let mut conditions = vec![first];

            upsert_condition(
                &mut conditions,
                Condition::new(
                    CONDITION_HEALTH_CHECK,
                    ConditionStatus::False,
                    REASON_FAILED_HEALTH_CHECK,
                    "unreachable",
                ),
            );

            assert_eq!(conditions[0].status, ConditionStatus::False);
            assert!(conditions[0].last_transition_time > transition);
        }
    }

    mod serde_shape {
        use super::*;

        /// Story: the persisted field names are the engine's only
        /// externally visible contract and must not drift.
        #[test]
        fn story_persisted_field_names() {
            let condition = Condition::new(
                "EnsureSystem",
                ConditionStatus::False,
                REASON_FAILED_INIT,
                "disk full",
            );
            let json = serde_json::to_value(&condition).unwrap();

            assert!(json.get("type").is_some());
            assert!(json.get("status").is_some());
            assert!(json.get("reason").is_some());
            assert!(json.get("message").is_some());
            assert!(json.get("lastProbeTime").is_some());
            assert!(json.get("lastTransitionTime").is_some());
        }

        #[test]
        fn condition_roundtrip() {
            let condition =
                Condition::new(CONDITION_HEALTH_CHECK, ConditionStatus::True, "", "");
            let json = serde_json::to_string(&condition).unwrap();
            let parsed: Condition = serde_json::from_str(&json).unwrap();
            assert_eq!(condition, parsed);
        }

        #[test]
        fn status_roundtrip() {
            for status in [
                ConditionStatus::True,
                ConditionStatus::False,
                ConditionStatus::Unknown,
            ] {
                let json = serde_json::to_string(&status).unwrap();
                let parsed: ConditionStatus = serde_json::from_str(&json).unwrap();
                assert_eq!(status, parsed);
            }
        }
    }
}
