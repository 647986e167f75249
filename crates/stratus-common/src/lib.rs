//! Common types for Stratus: resources, conditions, errors, and utilities

#![deny(missing_docs)]

pub mod context;
pub mod error;
pub mod resource;
pub mod retry;
pub mod telemetry;

pub use context::{ClusterContext, ClusterCredential};
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
