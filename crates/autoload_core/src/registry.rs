//! Resolution rule tables.
//!
//! # Responsibility
//! - Hold the alias, direct-mapping, namespace-directory and convention-root
//!   tables consulted by the resolution engine.
//! - Merge new registrations into the existing tables.
//!
//! # Invariants
//! - Tables are merge-only; entries are never removed.
//! - Keyed tables are last-write-wins.
//! - Convention roots end with exactly one separator and are deduplicated by
//!   exact string, keeping first-insertion order.
//! - No input validation happens here.

use crate::bundle::manifest::BundleAutoloads;
use crate::symbol::normalize_directory;
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Registered resolution rules for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// alias name -> real name
    aliases: BTreeMap<String, String>,
    /// symbol -> source file
    mappings: BTreeMap<String, PathBuf>,
    /// namespace prefix -> directory, stored as registered
    namespaces: BTreeMap<String, String>,
    convention_roots: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges symbol -> file entries into the direct-mapping table.
    pub fn register_mappings<I, K, P>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        let before = self.mapping_count();
        for (symbol, path) in mappings {
            self.mappings.insert(symbol.into(), path.into());
        }
        debug!(
            "event=autoload_register module=registry table=mappings added={} total={}",
            self.mapping_count() - before,
            self.mapping_count()
        );
    }

    /// Registers `alias` as an alternate name for `real`.
    pub fn register_alias(&mut self, real: impl Into<String>, alias: impl Into<String>) {
        self.aliases.insert(alias.into(), real.into());
        debug!(
            "event=autoload_register module=registry table=aliases total={}",
            self.alias_count()
        );
    }

    /// Adds directories to the convention search path.
    pub fn register_convention_roots<I, S>(&mut self, roots: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for root in roots {
            let normalized = normalize_directory(root.as_ref());
            if !self.convention_roots.contains(&normalized) {
                self.convention_roots.push(normalized);
            }
        }
        debug!(
            "event=autoload_register module=registry table=convention_roots total={}",
            self.convention_roots.len()
        );
    }

    /// Merges namespace prefix -> directory entries.
    pub fn register_namespace_roots<I, K, D>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        for (prefix, directory) in namespaces {
            self.namespaces.insert(prefix.into(), directory.into());
        }
        debug!(
            "event=autoload_register module=registry table=namespaces total={}",
            self.namespace_count()
        );
    }

    /// Applies a bundle's declared autoloads in one step.
    ///
    /// Paths are taken as-is; placeholder expansion is the caller's job.
    pub fn merge_autoloads(&mut self, autoloads: &BundleAutoloads) {
        if !autoloads.map.is_empty() {
            self.register_mappings(autoloads.map.clone());
        }
        for (alias, real) in &autoloads.aliases {
            self.register_alias(real.clone(), alias.clone());
        }
        if !autoloads.namespaces.is_empty() {
            self.register_namespace_roots(autoloads.namespaces.clone());
        }
        if !autoloads.directories.is_empty() {
            self.register_convention_roots(&autoloads.directories);
        }
    }

    /// Real name registered for `alias`.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Mapped file for `symbol`.
    pub fn mapping(&self, symbol: &str) -> Option<&Path> {
        self.mappings.get(symbol).map(PathBuf::as_path)
    }

    /// Directory registered for a namespace prefix.
    pub fn namespace_root(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Current convention search path, in search order.
    pub fn convention_roots(&self) -> &[String] {
        &self.convention_roots
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
            && self.mappings.is_empty()
            && self.namespaces.is_empty()
            && self.convention_roots.is_empty()
    }
}
