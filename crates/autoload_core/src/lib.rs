//! Lazy class autoloader core.
//!
//! Maps a class identifier such as `Admin\Models\User` to the source file
//! that defines it, the first time the host runtime asks for it. Bootstrap
//! code fills a [`Registry`] once; the [`ResolutionEngine`] consults it on
//! every request, falling back from aliases to direct mappings, namespace
//! directories, lazily started bundles and finally the convention search.

pub mod bundle;
pub mod convention;
pub mod engine;
pub mod host;
pub mod logging;
pub mod registry;
pub mod symbol;

pub use bundle::{
    ActivationError, ActivationGate, BundleAutoloads, BundleManifest, BundleRegistry,
    BundleRegistryError, ManifestValidationError, NoBundles,
};
pub use convention::{ConventionResolver, Lookup, DEFAULT_SOURCE_EXTENSION};
pub use engine::{Resolution, ResolutionEngine, ResolveError, ResolveResult, ResolvedVia};
pub use host::{FsHost, LoadError, LoadResult, LoadedUnit, MemoryHost, SourceHost};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use registry::Registry;
pub use symbol::NAMESPACE_SEPARATOR;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
