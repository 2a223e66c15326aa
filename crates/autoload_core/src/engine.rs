//! Resolution engine.
//!
//! # Responsibility
//! - Decide which mechanism answers a request for a symbol, in fixed order:
//!   alias, direct mapping, namespace directory, bundle activation retry,
//!   convention search.
//! - Perform at most one load (or one alias binding) per request.
//!
//! # Invariants
//! - An alias only binds the name; the real name is resolved when the host
//!   asks for it.
//! - A namespace-directory hit never falls through to the convention search.
//! - At most one bundle is activated per request; after that the procedure
//!   restarts once and then ends in the convention search.
//! - Not-found is `Resolution::NotFound`, never an error.

use crate::bundle::gate::{ActivationError, ActivationGate, NoBundles};
use crate::convention::{ConventionResolver, Lookup};
use crate::host::{LoadError, SourceHost};
use crate::registry::Registry;
use crate::symbol::{normalize_directory, split_namespace};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Mechanism that located a loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Mapping,
    Namespace,
    Convention,
}

impl ResolvedVia {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Namespace => "namespace",
            Self::Convention => "convention",
        }
    }
}

/// Observable outcome of one `resolve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `alias` was bound to `target`; nothing was loaded.
    Aliased { alias: String, target: String },
    Loaded { path: PathBuf, via: ResolvedVia },
    NotFound,
}

impl Resolution {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn loaded_path(&self) -> Option<&Path> {
        match self {
            Self::Loaded { path, .. } => Some(path),
            Self::Aliased { .. } | Self::NotFound => None,
        }
    }

    fn from_lookup(lookup: Lookup, via: ResolvedVia) -> Self {
        match lookup {
            Lookup::Found(path) => Self::Loaded { path, via },
            Lookup::NotFound => Self::NotFound,
        }
    }
}

/// Orchestrates the registry, convention search, host and activation gate.
pub struct ResolutionEngine<H, G = NoBundles> {
    registry: Registry,
    convention: ConventionResolver,
    host: H,
    gate: G,
}

impl<H: SourceHost> ResolutionEngine<H, NoBundles> {
    /// Creates an engine for a host without extension units.
    pub fn without_bundles(registry: Registry, host: H) -> Self {
        Self::new(registry, host, NoBundles)
    }
}

impl<H: SourceHost, G: ActivationGate> ResolutionEngine<H, G> {
    pub fn new(registry: Registry, host: H, gate: G) -> Self {
        Self {
            registry,
            convention: ConventionResolver::new(),
            host,
            gate,
        }
    }

    /// Replaces the convention resolver, e.g. to change the source extension.
    pub fn with_convention(mut self, convention: ConventionResolver) -> Self {
        self.convention = convention;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access for late registrations.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn convention(&self) -> &ConventionResolver {
        &self.convention
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Consumes the engine, returning its parts.
    pub fn into_parts(self) -> (Registry, H, G) {
        (self.registry, self.host, self.gate)
    }

    /// Resolves `symbol`, loading at most one file.
    ///
    /// # Errors
    /// - `ResolveError::Load` when the host fails to load or bind.
    /// - `ResolveError::Activation` when a bundle fails to start.
    pub fn resolve(&mut self, symbol: &str) -> ResolveResult<Resolution> {
        let started_at = Instant::now();
        let outcome = self.run(symbol);
        let duration_ms = started_at.elapsed().as_millis();

        match &outcome {
            Ok(Resolution::Aliased { .. }) => info!(
                "event=autoload_resolve module=engine status=ok via=alias duration_ms={duration_ms}"
            ),
            Ok(Resolution::Loaded { via, .. }) => info!(
                "event=autoload_resolve module=engine status=ok via={} duration_ms={duration_ms}",
                via.as_str()
            ),
            Ok(Resolution::NotFound) => debug!(
                "event=autoload_resolve module=engine status=not_found registry_empty={} duration_ms={}",
                self.registry.is_empty(),
                duration_ms
            ),
            Err(err) => error!(
                "event=autoload_resolve module=engine status=error duration_ms={} error_code={} error={}",
                duration_ms,
                err.code(),
                err
            ),
        }
        outcome
    }

    fn run(&mut self, symbol: &str) -> ResolveResult<Resolution> {
        // Prefix activated during this request; one slot bounds the retry.
        let mut activated: Option<String> = None;

        loop {
            if let Some(target) = self.registry.alias_target(symbol) {
                let target = target.to_string();
                self.host.bind_alias(&target, symbol)?;
                return Ok(Resolution::Aliased {
                    alias: symbol.to_string(),
                    target,
                });
            }

            if let Some(path) = self.registry.mapping(symbol) {
                let path = path.to_path_buf();
                self.host.load(&path)?;
                return Ok(Resolution::Loaded {
                    path,
                    via: ResolvedVia::Mapping,
                });
            }

            let Some((prefix, remainder)) = split_namespace(symbol) else {
                break;
            };

            if let Some(directory) = self.registry.namespace_root(prefix) {
                let roots = [normalize_directory(directory)];
                let lookup = self.convention.resolve(remainder, &roots, &mut self.host)?;
                return Ok(Resolution::from_lookup(lookup, ResolvedVia::Namespace));
            }

            if activated.is_some()
                || !self.gate.exists(prefix)
                || self.gate.is_activated(prefix)
            {
                break;
            }

            debug!("event=bundle_activate module=engine status=start");
            self.gate
                .activate(prefix, &mut self.registry, &mut self.host)?;
            activated = Some(prefix.to_string());
        }

        let lookup = self.convention.resolve(
            symbol,
            self.registry.convention_roots(),
            &mut self.host,
        )?;
        Ok(Resolution::from_lookup(lookup, ResolvedVia::Convention))
    }
}

/// Faults surfaced by `resolve`.
#[derive(Debug)]
pub enum ResolveError {
    Load(LoadError),
    Activation(ActivationError),
}

impl ResolveError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Load(err) => err.code(),
            Self::Activation(_) => "activation_failed",
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            Self::Activation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Activation(err) => Some(err),
        }
    }
}

impl From<LoadError> for ResolveError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<ActivationError> for ResolveError {
    fn from(value: ActivationError) -> Self {
        Self::Activation(value)
    }
}
