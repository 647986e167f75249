//! Per-invocation context handed to handler bodies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::Cluster;

/// Context passed to every handler invocation
///
/// Carries a snapshot of the parent cluster (for machine flows) or the
/// cluster itself (for cluster flows), plus optional credential material.
/// The engine consults only [`ClusterContext::skip_conditions`]; everything
/// else is opaque to it and exists for handler bodies.
#[derive(Clone, Debug)]
pub struct ClusterContext {
    /// Cluster snapshot for this round
    pub cluster: Cluster,

    /// Credential material for reaching the cluster, when available
    pub credential: Option<ClusterCredential>,
}

impl ClusterContext {
    /// Build a context from a cluster snapshot
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            credential: None,
        }
    }

    /// Attach credential material
    pub fn with_credential(mut self, credential: ClusterCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Name of the cluster this context describes
    pub fn cluster_name(&self) -> &str {
        &self.cluster.name
    }

    /// Step types the cluster spec asks the engine to short-circuit
    pub fn skip_conditions(&self) -> &[String] {
        &self.cluster.spec.features.skip_conditions
    }
}

/// Credential material for reaching a provisioned cluster
///
/// Lookup and rotation are external concerns; this core only carries the
/// material through to handler bodies.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCredential {
    /// Bearer token, if token auth is in use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// PEM-encoded CA bundle for verifying the cluster endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
}
