//! In-process bundle registry and activation gate.
//!
//! # Responsibility
//! - Hold validated bundle manifests keyed by lowercased name.
//! - Start bundles on demand: register their autoloads, then run the start
//!   script through the host.
//!
//! # Invariants
//! - Bundle names are unique case-insensitively.
//! - A bundle is marked started only after its start script loaded.
//! - A failed start leaves the caller's registry untouched.
//! - Starting an already-started bundle is a no-op.

use super::gate::{ActivationError, ActivationGate};
use super::manifest::{BundleManifest, ManifestValidationError};
use crate::host::SourceHost;
use crate::registry::Registry;
use log::{error, info};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declared bundles and their started state.
#[derive(Debug, Default)]
pub struct BundleRegistry {
    bundles: BTreeMap<String, BundleManifest>,
    started: BTreeSet<String>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a JSON array of manifests.
    pub fn from_json_str(json: &str) -> Result<Self, BundleRegistryError> {
        let manifests: Vec<BundleManifest> = serde_json::from_str(json)
            .map_err(|err| BundleRegistryError::Parse(err.to_string()))?;
        let mut registry = Self::new();
        for manifest in manifests {
            registry.register(manifest)?;
        }
        Ok(registry)
    }

    /// Registers one bundle after manifest validation.
    pub fn register(&mut self, manifest: BundleManifest) -> Result<(), BundleRegistryError> {
        manifest
            .validate()
            .map_err(BundleRegistryError::InvalidManifest)?;
        let key = manifest.key();
        if self.bundles.contains_key(&key) {
            return Err(BundleRegistryError::DuplicateBundle(key));
        }
        self.bundles.insert(key, manifest);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BundleManifest> {
        self.bundles.get(&name.to_ascii_lowercase())
    }

    /// Registered bundle names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.bundles.keys().map(String::as_str).collect()
    }

    /// Started bundle names, sorted.
    pub fn started(&self) -> Vec<&str> {
        self.started.iter().map(String::as_str).collect()
    }
}

impl ActivationGate for BundleRegistry {
    fn exists(&self, prefix: &str) -> bool {
        self.bundles.contains_key(&prefix.to_ascii_lowercase())
    }

    fn is_activated(&self, prefix: &str) -> bool {
        self.started.contains(&prefix.to_ascii_lowercase())
    }

    fn activate(
        &mut self,
        prefix: &str,
        registry: &mut Registry,
        host: &mut dyn SourceHost,
    ) -> Result<(), ActivationError> {
        let key = prefix.to_ascii_lowercase();
        if self.started.contains(&key) {
            return Ok(());
        }
        let Some(manifest) = self.bundles.get(&key) else {
            return Err(ActivationError::UnknownBundle(prefix.to_string()));
        };

        // Committed only once the start script has loaded.
        let mut staged = registry.clone();
        staged.merge_autoloads(&manifest.expanded_autoloads());

        if let Some(start) = manifest.start_path() {
            if let Err(err) = host.load(&start) {
                error!(
                    "event=bundle_start module=bundle status=error bundle={} error_code={} error={}",
                    key,
                    err.code(),
                    err
                );
                return Err(ActivationError::StartFailed {
                    bundle: key,
                    source: err,
                });
            }
        }

        *registry = staged;
        info!("event=bundle_start module=bundle status=ok bundle={key}");
        self.started.insert(key);
        Ok(())
    }
}

/// Bundle registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleRegistryError {
    InvalidManifest(ManifestValidationError),
    DuplicateBundle(String),
    Parse(String),
}

impl Display for BundleRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifest(err) => write!(f, "invalid bundle manifest: {err}"),
            Self::DuplicateBundle(name) => write!(f, "bundle already registered: {name}"),
            Self::Parse(message) => write!(f, "bundle manifest json is malformed: {message}"),
        }
    }
}

impl Error for BundleRegistryError {}

#[cfg(all(test, unix))]
mod tests {
    use super::{BundleRegistry, BundleRegistryError};
    use crate::bundle::gate::{ActivationError, ActivationGate};
    use crate::bundle::manifest::BundleManifest;
    use crate::host::MemoryHost;
    use crate::registry::Registry;
    use std::path::{Path, PathBuf};

    fn docs_manifest() -> BundleManifest {
        let mut manifest = BundleManifest::new("Docs", "/bundles/docs/");
        manifest.autoloads.map.insert(
            "Docs\\Page".to_string(),
            "(:bundle)models/page.php".to_string(),
        );
        manifest
    }

    #[test]
    fn exists_and_started_are_case_insensitive() {
        let mut bundles = BundleRegistry::new();
        bundles.register(docs_manifest()).expect("register");

        assert!(bundles.exists("Docs"));
        assert!(bundles.exists("docs"));
        assert!(!bundles.is_activated("DOCS"));
        assert_eq!(bundles.names(), ["docs"]);
    }

    #[test]
    fn rejects_duplicate_names_regardless_of_case() {
        let mut bundles = BundleRegistry::new();
        bundles.register(docs_manifest()).expect("register");
        let err = bundles
            .register(BundleManifest::new("DOCS", "/elsewhere"))
            .expect_err("duplicate must fail");
        assert_eq!(err, BundleRegistryError::DuplicateBundle("docs".to_string()));
    }

    #[test]
    fn activation_registers_autoloads_and_marks_started() {
        let mut bundles = BundleRegistry::new();
        bundles.register(docs_manifest()).expect("register");
        let mut registry = Registry::new();
        let mut host = MemoryHost::new();

        bundles
            .activate("Docs", &mut registry, &mut host)
            .expect("activate");

        assert!(bundles.is_activated("docs"));
        assert_eq!(bundles.started(), ["docs"]);
        assert_eq!(
            registry.mapping("Docs\\Page"),
            Some(Path::new("/bundles/docs/models/page.php"))
        );
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut bundles = BundleRegistry::new();
        let mut manifest = docs_manifest();
        manifest.start = Some("(:bundle)start.php".to_string());
        bundles.register(manifest).expect("register");
        let mut registry = Registry::new();
        let mut host = MemoryHost::with_files(["/bundles/docs/start.php"]);

        bundles
            .activate("docs", &mut registry, &mut host)
            .expect("first activation");
        bundles
            .activate("docs", &mut registry, &mut host)
            .expect("second activation");

        assert_eq!(host.loads(), [PathBuf::from("/bundles/docs/start.php")]);
    }

    #[test]
    fn failed_start_script_leaves_bundle_unstarted() {
        let mut bundles = BundleRegistry::new();
        let mut manifest = docs_manifest();
        manifest.start = Some("(:bundle)start.php".to_string());
        bundles.register(manifest).expect("register");
        let mut registry = Registry::new();
        let mut host = MemoryHost::new();
        host.fail_on("/bundles/docs/start.php", "syntax error");

        let err = bundles
            .activate("docs", &mut registry, &mut host)
            .expect_err("start must fail");
        assert!(matches!(err, ActivationError::StartFailed { .. }));
        assert!(!bundles.is_activated("docs"));
        assert_eq!(registry.mapping("Docs\\Page"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn start_can_be_retried_after_script_is_fixed() {
        let mut bundles = BundleRegistry::new();
        let mut manifest = docs_manifest();
        manifest.start = Some("(:bundle)start.php".to_string());
        bundles.register(manifest).expect("register");
        let mut registry = Registry::new();
        let mut host = MemoryHost::new();

        bundles
            .activate("docs", &mut registry, &mut host)
            .expect_err("missing start script");
        assert!(registry.is_empty());

        host.add_file("/bundles/docs/start.php");
        bundles
            .activate("docs", &mut registry, &mut host)
            .expect("second attempt");
        assert!(bundles.is_activated("docs"));
        assert_eq!(
            registry.mapping("Docs\\Page"),
            Some(Path::new("/bundles/docs/models/page.php"))
        );
    }

    #[test]
    fn unknown_bundle_cannot_be_activated() {
        let mut bundles = BundleRegistry::new();
        let err = bundles
            .activate("Ghost", &mut Registry::new(), &mut MemoryHost::new())
            .expect_err("unknown bundle");
        assert!(matches!(err, ActivationError::UnknownBundle(_)));
    }

    #[test]
    fn from_json_validates_every_manifest() {
        let bundles = BundleRegistry::from_json_str(
            r#"[
                { "name": "docs", "location": "/bundles/docs" },
                { "name": "admin", "location": "/bundles/admin",
                  "autoloads": { "directories": ["(:bundle)models"] } }
            ]"#,
        )
        .expect("valid json");
        assert_eq!(bundles.len(), 2);

        let err = BundleRegistry::from_json_str(r#"[{ "name": "", "location": "/x" }]"#)
            .expect_err("empty name must fail");
        assert!(matches!(err, BundleRegistryError::InvalidManifest(_)));

        let err = BundleRegistry::from_json_str("{ not json").expect_err("parse error");
        assert!(matches!(err, BundleRegistryError::Parse(_)));
    }
}
