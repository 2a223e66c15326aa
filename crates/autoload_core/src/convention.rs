//! Convention-based source search.
//!
//! # Responsibility
//! - Derive candidate files for a symbol from the fixed naming convention.
//! - Probe candidate roots in order and load the first existing file.
//!
//! # Invariants
//! - For each root the lowercased candidate is probed before the
//!   case-preserving one.
//! - Scanning stops at the first existing candidate.
//! - A miss is `Lookup::NotFound`, never an error.

use crate::host::{LoadResult, SourceHost};
use crate::symbol::relative_path;
use log::debug;
use std::path::PathBuf;

/// Source file extension used when none is configured.
pub const DEFAULT_SOURCE_EXTENSION: &str = ".php";

/// Outcome of one convention search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(PathBuf),
    NotFound,
}

/// Resolves symbols to files by naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionResolver {
    extension: String,
}

impl ConventionResolver {
    pub fn new() -> Self {
        Self::with_extension(DEFAULT_SOURCE_EXTENSION)
    }

    /// Uses `extension` for candidates; a missing leading dot is added.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let extension = if extension.is_empty() || extension.starts_with('.') {
            extension
        } else {
            format!(".{extension}")
        };
        Self { extension }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Candidate files for `symbol` under one root, in probe order.
    ///
    /// The second candidate is omitted when it equals the first.
    pub fn candidates(&self, symbol: &str, root: &str) -> Vec<PathBuf> {
        let relative = relative_path(symbol);
        let lowered = relative.to_ascii_lowercase();
        let mut candidates = vec![PathBuf::from(format!("{root}{lowered}{}", self.extension))];
        if lowered != relative {
            candidates.push(PathBuf::from(format!(
                "{root}{relative}{}",
                self.extension
            )));
        }
        candidates
    }

    /// Searches `roots` for `symbol` and loads the first existing candidate.
    ///
    /// # Errors
    /// - Returns the host's `LoadError` when the found file fails to load.
    pub fn resolve<H, S>(&self, symbol: &str, roots: &[S], host: &mut H) -> LoadResult<Lookup>
    where
        H: SourceHost + ?Sized,
        S: AsRef<str>,
    {
        for root in roots {
            for candidate in self.candidates(symbol, root.as_ref()) {
                if host.exists(&candidate) {
                    debug!(
                        "event=convention_probe module=convention status=hit roots={}",
                        roots.len()
                    );
                    host.load(&candidate)?;
                    return Ok(Lookup::Found(candidate));
                }
            }
        }
        debug!(
            "event=convention_probe module=convention status=miss roots={}",
            roots.len()
        );
        Ok(Lookup::NotFound)
    }
}

impl Default for ConventionResolver {
    fn default() -> Self {
        Self::new()
    }
}
