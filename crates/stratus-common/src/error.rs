//! Error types for the Stratus engine and controllers
//!
//! Errors are structured with fields to aid debugging in production, and
//! each carries enough context to decide whether a retry can help: chain
//! configuration problems are permanent, step failures are handed back to
//! the reconciler to retry with backoff.

use thiserror::Error;

/// Default context value when no specific resource is known
pub const UNKNOWN_RESOURCE: &str = "unknown";

/// Main error type for Stratus operations
#[derive(Debug, Error)]
pub enum Error {
    /// Spec or configuration validation failure
    #[error("validation error for {resource}: {message}")]
    Validation {
        /// Name of the resource with the invalid configuration
        resource: String,
        /// Description of what's invalid
        message: String,
    },

    /// A provider was configured without any create handlers
    #[error("provider {provider} has no create handlers")]
    NoHandlers {
        /// Name of the misconfigured provider
        provider: String,
    },

    /// The current condition names a handler the chain does not contain.
    /// Signals version skew between persisted state and deployed chains.
    #[error("no handler registered for condition {handler}")]
    HandlerNotFound {
        /// Condition type with no matching handler
        handler: String,
    },

    /// OnCreate was invoked for a resource that already reached Running
    #[error("resource {resource} is already running")]
    AlreadyRunning {
        /// Name of the resource
        resource: String,
    },

    /// Every condition is True yet the phase is not Running.
    /// Should be unreachable; signals external state corruption.
    #[error("resource {resource} has no pending condition")]
    NoPendingCondition {
        /// Name of the resource
        resource: String,
    },

    /// No delegate provider is registered for the resource's type
    #[error("no provider registered for type {name}")]
    ProviderNotFound {
        /// The unmatched provider type name
        name: String,
    },

    /// Optimistic-concurrency write conflict from the resource store
    #[error("write conflict on {resource}: stale resource version")]
    Conflict {
        /// Name of the resource that failed to persist
        resource: String,
    },

    /// A provisioning step failed; recorded into the resource's
    /// conditions and surfaced to the reconciler for retry
    #[error("handler {handler} failed for {resource}: {message}")]
    Provisioning {
        /// Name of the resource being provisioned
        resource: String,
        /// Name of the failing handler
        handler: String,
        /// Description of what failed
        message: String,
    },

    /// Resource store failure other than a write conflict
    #[error("store error [{context}]: {message}")]
    Store {
        /// Context where the error occurred (e.g. "get", "update")
        context: String,
        /// Description of what failed
        message: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Context where the error occurred (e.g. "reconciler", "registry")
        context: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error without resource context
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: UNKNOWN_RESOURCE.to_string(),
            message: msg.into(),
        }
    }

    /// Create a validation error with resource context
    pub fn validation_for(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a no-create-handlers configuration error
    pub fn no_handlers(provider: impl Into<String>) -> Self {
        Self::NoHandlers {
            provider: provider.into(),
        }
    }

    /// Create a handler-not-found configuration error
    pub fn handler_not_found(handler: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            handler: handler.into(),
        }
    }

    /// Create an already-running precondition error
    pub fn already_running(resource: impl Into<String>) -> Self {
        Self::AlreadyRunning {
            resource: resource.into(),
        }
    }

    /// Create a no-pending-condition precondition error
    pub fn no_pending_condition(resource: impl Into<String>) -> Self {
        Self::NoPendingCondition {
            resource: resource.into(),
        }
    }

    /// Create a provider-not-found error
    pub fn provider_not_found(name: impl Into<String>) -> Self {
        Self::ProviderNotFound { name: name.into() }
    }

    /// Create a write-conflict error
    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
        }
    }

    /// Create a step failure with full context
    pub fn provisioning(
        resource: impl Into<String>,
        handler: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Provisioning {
            resource: resource.into(),
            handler: handler.into(),
            message: msg.into(),
        }
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Store {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if a retry can help with this error
    ///
    /// Configuration errors (no handlers, unknown handler, unknown
    /// provider) and precondition errors (already running, no pending
    /// condition) indicate a code/deployment mismatch or caller misuse:
    /// retrying them forever would only hide the bug. Step failures,
    /// conflicts, and store errors are worth retrying with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Validation { .. } => false,
            Error::NoHandlers { .. } => false,
            Error::HandlerNotFound { .. } => false,
            Error::AlreadyRunning { .. } => false,
            Error::NoPendingCondition { .. } => false,
            Error::ProviderNotFound { .. } => false,
            Error::Conflict { .. } => true,
            Error::Provisioning { .. } => true,
            Error::Store { .. } => true,
            Error::Internal { .. } => true,
        }
    }

    /// Get the resource name if this error is tied to a specific resource
    pub fn resource(&self) -> Option<&str> {
        match self {
            Error::Validation { resource, .. } => Some(resource),
            Error::AlreadyRunning { resource, .. } => Some(resource),
            Error::NoPendingCondition { resource, .. } => Some(resource),
            Error::Conflict { resource, .. } => Some(resource),
            Error::Provisioning { resource, .. } => Some(resource),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: chain misconfiguration must fail loudly, not retry forever.
    ///
    /// NoHandlers and HandlerNotFound mean the deployed handler chains do
    /// not match the persisted state; re-running the engine cannot fix
    /// that, so the reconciler must not keep retrying.
    #[test]
    fn story_configuration_errors_are_permanent() {
        assert!(!Error::no_handlers("baremetal").is_retryable());
        assert!(!Error::handler_not_found("EnsureKubelet").is_retryable());
        assert!(!Error::provider_not_found("imported").is_retryable());
    }

    /// Story: a failed step is the explicit retry-later signal.
    ///
    /// The engine records the failure into the resource's conditions and
    /// propagates the error; the reconciler schedules the retry.
    #[test]
    fn story_step_failures_are_retryable() {
        let err = Error::provisioning("mc-a1", "EnsureKubelet", "connection refused");
        assert!(err.is_retryable());
        assert_eq!(err.resource(), Some("mc-a1"));
        assert!(err.to_string().contains("EnsureKubelet"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn precondition_errors_are_permanent() {
        assert!(!Error::already_running("global").is_retryable());
        assert!(!Error::no_pending_condition("global").is_retryable());
    }

    #[test]
    fn conflicts_are_retryable() {
        let err = Error::conflict("global");
        assert!(err.is_retryable());
        assert_eq!(err.resource(), Some("global"));
    }

    #[test]
    fn validation_defaults_to_unknown_resource() {
        match Error::validation("bad spec") {
            Error::Validation { resource, message } => {
                assert_eq!(resource, UNKNOWN_RESOURCE);
                assert_eq!(message, "bad spec");
            }
            _ => panic!("expected Validation variant"),
        }
        assert!(Error::validation_for("global", "bad spec")
            .to_string()
            .contains("global"));
    }

    #[test]
    fn store_and_internal_are_retryable() {
        assert!(Error::store("update", "connection reset").is_retryable());
        assert!(Error::internal("reconciler", "queue closed").is_retryable());
    }
}
