//! Lazily started extension units ("bundles").
//!
//! The resolution engine only sees the [`ActivationGate`] contract. The
//! [`BundleRegistry`] is the in-process implementation: bundles are declared
//! up front through manifests and started the first time a symbol under
//! their namespace prefix is requested.

pub mod gate;
pub mod manifest;
pub mod registry;

pub use gate::{ActivationError, ActivationGate, NoBundles};
pub use manifest::{BundleAutoloads, BundleManifest, ManifestValidationError};
pub use registry::{BundleRegistry, BundleRegistryError};
