//! Activation gate contract between the engine and the bundle lifecycle.

use crate::host::{LoadError, SourceHost};
use crate::registry::Registry;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Deferred-initialization hooks consulted for namespaced symbols.
///
/// # Contract
/// - Once `activate(prefix)` succeeds, `is_activated(prefix)` must return
///   `true`, so the engine never starts the same unit twice.
pub trait ActivationGate {
    /// Is an extension unit registered for `prefix`?
    fn exists(&self, prefix: &str) -> bool;

    /// Has the unit for `prefix` already been started?
    fn is_activated(&self, prefix: &str) -> bool;

    /// Starts the unit for `prefix`.
    ///
    /// Starting may register new rules into `registry` and load files
    /// through `host`.
    fn activate(
        &mut self,
        prefix: &str,
        registry: &mut Registry,
        host: &mut dyn SourceHost,
    ) -> Result<(), ActivationError>;
}

/// Gate for hosts without extension units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBundles;

impl ActivationGate for NoBundles {
    fn exists(&self, _prefix: &str) -> bool {
        false
    }

    fn is_activated(&self, _prefix: &str) -> bool {
        false
    }

    fn activate(
        &mut self,
        prefix: &str,
        _registry: &mut Registry,
        _host: &mut dyn SourceHost,
    ) -> Result<(), ActivationError> {
        Err(ActivationError::UnknownBundle(prefix.to_string()))
    }
}

/// Errors raised while starting an extension unit.
#[derive(Debug)]
pub enum ActivationError {
    UnknownBundle(String),
    StartFailed { bundle: String, source: LoadError },
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBundle(name) => write!(f, "bundle has not been installed: {name}"),
            Self::StartFailed { bundle, source } => {
                write!(f, "bundle `{bundle}` failed to start: {source}")
            }
        }
    }
}

impl Error for ActivationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownBundle(_) => None,
            Self::StartFailed { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivationError, ActivationGate, NoBundles};
    use crate::host::MemoryHost;
    use crate::registry::Registry;

    #[test]
    fn no_bundles_never_exists() {
        let mut gate = NoBundles;
        assert!(!gate.exists("Admin"));
        assert!(!gate.is_activated("Admin"));

        let err = gate
            .activate("Admin", &mut Registry::new(), &mut MemoryHost::new())
            .expect_err("nothing to activate");
        assert!(matches!(err, ActivationError::UnknownBundle(name) if name == "Admin"));
    }
}
