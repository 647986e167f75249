//! Condition-driven provisioning engine for Stratus resources
//!
//! A [`DelegateProvider`] assembles ordered chains of named, idempotent
//! [`Handler`] steps into create, update, and delete flows for one
//! resource type. Create flows advance a single step per invocation and
//! persist progress as conditions, so a half-provisioned resource resumes
//! exactly where it stopped. A [`ProviderRegistry`] maps resource type
//! names to providers at reconcile time.

#![deny(missing_docs)]

pub mod delegate;
pub mod handler;
pub mod health;
pub mod registry;

pub use delegate::{DelegateProvider, DelegateProviderBuilder};
pub use handler::{handler, FnHandler, Handler};
pub use health::HealthProbe;
pub use registry::ProviderRegistry;
