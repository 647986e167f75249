//! Coarse lifecycle phase shared by clusters and machines.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Resource lifecycle phase
///
/// Closed enum: the engine moves resources forward through these stages
/// and never invents new ones. `Running` is only reached when every
/// create handler has reported True, in chain order; `Failed` is only set
/// as a side effect of a failing step or health probe; nothing downgrades
/// a resource out of `Terminating`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum Phase {
    /// Create chain is still being worked through
    #[default]
    Initializing,
    /// Fully provisioned and healthy
    Running,
    /// An intentional upgrade window is open; update handlers may run
    Upgrading,
    /// A step or health probe reported an error
    Failed,
    /// Deletion has begun; delete handlers may run
    Terminating,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing"),
            Self::Running => write!(f, "Running"),
            Self::Upgrading => write!(f, "Upgrading"),
            Self::Failed => write!(f, "Failed"),
            Self::Terminating => write!(f, "Terminating"),
        }
    }
}

impl Phase {
    /// Returns true for the phases where health checking is meaningful
    /// (the resource has finished provisioning at least once).
    pub fn is_provisioned(self) -> bool {
        matches!(self, Self::Running | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_initializing() {
        assert_eq!(Phase::default(), Phase::Initializing);
    }

    #[test]
    fn display_matches_serialized_form() {
        for phase in [
            Phase::Initializing,
            Phase::Running,
            Phase::Upgrading,
            Phase::Failed,
            Phase::Terminating,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
            let parsed: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(phase, parsed);
        }
    }

    #[test]
    fn provisioned_phases() {
        assert!(Phase::Running.is_provisioned());
        assert!(Phase::Failed.is_provisioned());
        assert!(!Phase::Initializing.is_provisioned());
        assert!(!Phase::Upgrading.is_provisioned());
        assert!(!Phase::Terminating.is_provisioned());
    }
}
