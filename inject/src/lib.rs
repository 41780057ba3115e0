//! Spec generation for injecting the App Mesh Envoy sidecar into a pod.
//!
//! Everything here is a pure, synchronous transform from per-workload
//! [`SidecarParams`] into the declarative pieces the admission webhook patches
//! into the pod: the container spec, its readiness probe and its resource
//! requirements. No cluster API access, no caching, no retries.

#![warn(clippy::indexing_slicing)]

pub mod config;
pub mod env;
pub mod error;
pub mod probe;
pub mod quantity;
pub mod resources;
pub mod sidecar;

pub use config::SidecarParams;
pub use error::{InjectError, ResourceField, Result};
pub use probe::readiness_probe;
pub use resources::sidecar_resources;
pub use sidecar::build_sidecar;
