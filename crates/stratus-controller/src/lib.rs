//! Controller-side glue for Stratus resources
//!
//! Sits between a watch/event source and the provisioning engine: the
//! admission filter decides whether a change event needs processing, the
//! reconciler dispatches one engine round per event by phase and persists
//! the outcome through the [`ResourceStore`] seam.

#![deny(missing_docs)]

pub mod admission;
pub mod config;
pub mod reconciler;
pub mod store;

pub use admission::needs_update;
pub use config::ControllerConfig;
pub use reconciler::Reconciler;
pub use store::ResourceStore;
