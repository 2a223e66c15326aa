//! Disk-backed host.
//!
//! Reads each loaded unit from disk and keeps it, in load order, as the
//! host's symbol space. Aliases live in an in-process table.

use super::{LoadError, LoadResult, SourceHost};
use log::{error, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One source unit read by [`FsHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    pub path: PathBuf,
    pub source: String,
}

/// Host that reads source units from the local filesystem.
#[derive(Debug, Default)]
pub struct FsHost {
    loaded: Vec<LoadedUnit>,
    aliases: BTreeMap<String, String>,
}

impl FsHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units loaded so far, oldest first.
    pub fn loaded(&self) -> &[LoadedUnit] {
        &self.loaded
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.iter().any(|unit| unit.path == path)
    }

    /// Real name bound to `alias`, if any.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}

impl SourceHost for FsHost {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&mut self, path: &Path) -> LoadResult<()> {
        let started_at = Instant::now();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                error!(
                    "event=unit_load module=host status=error duration_ms={} error_code=read_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(LoadError::io(path, err));
            }
        };

        info!(
            "event=unit_load module=host status=ok bytes={} duration_ms={}",
            source.len(),
            started_at.elapsed().as_millis()
        );
        self.loaded.push(LoadedUnit {
            path: path.to_path_buf(),
            source,
        });
        Ok(())
    }

    fn bind_alias(&mut self, real: &str, alias: &str) -> LoadResult<()> {
        if let Some(existing) = self.aliases.get(alias) {
            if existing != real {
                return Err(LoadError::AliasRejected {
                    alias: alias.to_string(),
                    target: real.to_string(),
                    reason: format!("already bound to `{existing}`"),
                });
            }
            return Ok(());
        }
        self.aliases.insert(alias.to_string(), real.to_string());
        Ok(())
    }
}
