//! Host runtime boundary.
//!
//! # Responsibility
//! - Define the primitives the resolver needs from its host: a file
//!   existence probe, a file load, and an alias binding in the host's
//!   symbol table.
//!
//! # Invariants
//! - `exists` never fails; unreadable paths simply report `false`.
//! - `load` either fully succeeds or returns a `LoadError`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

mod fs_host;
mod memory;

pub use fs_host::{FsHost, LoadedUnit};
pub use memory::MemoryHost;

pub type LoadResult<T> = Result<T, LoadError>;

/// Primitives provided by the runtime that executes loaded source units.
pub trait SourceHost {
    /// Does a loadable file exist at `path`?
    fn exists(&self, path: &Path) -> bool;

    /// Loads the file at `path` into the running symbol space.
    fn load(&mut self, path: &Path) -> LoadResult<()>;

    /// Makes `alias` an alternate name for `real` in the host symbol table.
    fn bind_alias(&mut self, real: &str, alias: &str) -> LoadResult<()>;
}

/// Faults raised by a host while loading or binding.
#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Rejected {
        path: PathBuf,
        reason: String,
    },
    AliasRejected {
        alias: String,
        target: String,
        reason: String,
    },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn rejected(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "load_io_failed",
            Self::Rejected { .. } => "load_rejected",
            Self::AliasRejected { .. } => "alias_rejected",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to load `{}`: {source}", path.display())
            }
            Self::Rejected { path, reason } => {
                write!(f, "host rejected `{}`: {reason}", path.display())
            }
            Self::AliasRejected {
                alias,
                target,
                reason,
            } => write!(f, "cannot alias `{alias}` to `{target}`: {reason}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Rejected { .. } | Self::AliasRejected { .. } => None,
        }
    }
}
