//! Bundle manifest declaration and validation.

use crate::symbol::{normalize_directory, NAMESPACE_SEPARATOR};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Placeholder expanded to the bundle's normalized location.
pub const BUNDLE_PLACEHOLDER: &str = "(:bundle)";

static BUNDLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").expect("valid bundle name regex"));

/// Declarative bundle manifest.
///
/// `name` doubles as the namespace prefix that triggers activation and is
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    /// Bundle root directory.
    pub location: String,
    /// Optional start script, loaded on activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default)]
    pub autoloads: BundleAutoloads,
}

/// Rules a bundle registers when it starts.
///
/// Path values may contain `(:bundle)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleAutoloads {
    /// symbol -> file
    #[serde(default)]
    pub map: BTreeMap<String, String>,
    /// alias -> real name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// namespace prefix -> directory
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    /// convention search roots
    #[serde(default)]
    pub directories: Vec<String>,
}

impl BundleManifest {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            start: None,
            autoloads: BundleAutoloads::default(),
        }
    }

    /// Lowercased name used as the registry key.
    pub fn key(&self) -> String {
        self.name.trim().to_ascii_lowercase()
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        let key = self.key();
        if key.is_empty() {
            return Err(ManifestValidationError::EmptyName);
        }
        if !BUNDLE_NAME_RE.is_match(&key) {
            return Err(ManifestValidationError::InvalidName(self.name.clone()));
        }
        if self.location.trim().is_empty() {
            return Err(ManifestValidationError::EmptyLocation);
        }
        if let Some(start) = &self.start {
            if start.trim().is_empty() {
                return Err(ManifestValidationError::EmptyStartScript);
            }
        }

        for symbol in self.autoloads.map.keys() {
            require_symbol(symbol)?;
        }
        for (alias, real) in &self.autoloads.aliases {
            require_symbol(alias)?;
            require_symbol(real)?;
            if alias == real {
                return Err(ManifestValidationError::SelfAlias(alias.clone()));
            }
        }
        for prefix in self.autoloads.namespaces.keys() {
            if prefix.is_empty() || prefix.contains(NAMESPACE_SEPARATOR) {
                return Err(ManifestValidationError::InvalidNamespace(prefix.clone()));
            }
        }
        Ok(())
    }

    /// Autoloads with every `(:bundle)` placeholder expanded.
    pub fn expanded_autoloads(&self) -> BundleAutoloads {
        let autoloads = &self.autoloads;
        BundleAutoloads {
            map: autoloads
                .map
                .iter()
                .map(|(symbol, path)| (symbol.clone(), self.expand(path)))
                .collect(),
            aliases: autoloads.aliases.clone(),
            namespaces: autoloads
                .namespaces
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), self.expand(dir)))
                .collect(),
            directories: autoloads
                .directories
                .iter()
                .map(|dir| self.expand(dir))
                .collect(),
        }
    }

    /// Start script path with placeholders expanded.
    pub fn start_path(&self) -> Option<PathBuf> {
        self.start
            .as_deref()
            .map(|start| PathBuf::from(self.expand(start)))
    }

    fn expand(&self, value: &str) -> String {
        if value.contains(BUNDLE_PLACEHOLDER) {
            value.replace(BUNDLE_PLACEHOLDER, &normalize_directory(&self.location))
        } else {
            value.to_string()
        }
    }
}

fn require_symbol(symbol: &str) -> Result<(), ManifestValidationError> {
    if symbol.trim().is_empty() {
        Err(ManifestValidationError::EmptySymbol)
    } else {
        Ok(())
    }
}

/// Manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValidationError {
    EmptyName,
    InvalidName(String),
    EmptyLocation,
    EmptyStartScript,
    EmptySymbol,
    SelfAlias(String),
    InvalidNamespace(String),
}

impl Display for ManifestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "bundle name must not be empty"),
            Self::InvalidName(value) => write!(f, "bundle name is invalid: {value}"),
            Self::EmptyLocation => write!(f, "bundle location must not be empty"),
            Self::EmptyStartScript => write!(f, "bundle start script must not be empty"),
            Self::EmptySymbol => write!(f, "autoload symbol must not be empty"),
            Self::SelfAlias(value) => write!(f, "alias points at itself: {value}"),
            Self::InvalidNamespace(value) => write!(f, "namespace prefix is invalid: {value}"),
        }
    }
}

impl Error for ManifestValidationError {}

#[cfg(all(test, unix))]
mod tests {
    use super::{BundleManifest, ManifestValidationError};
    use std::path::PathBuf;

    fn admin_manifest() -> BundleManifest {
        let mut manifest = BundleManifest::new("Admin", "/bundles/admin");
        manifest.start = Some("(:bundle)start.php".to_string());
        manifest.autoloads.map.insert(
            "Admin\\Panel".to_string(),
            "(:bundle)panel.php".to_string(),
        );
        manifest
            .autoloads
            .aliases
            .insert("Panel".to_string(), "Admin\\Panel".to_string());
        manifest
            .autoloads
            .namespaces
            .insert("Admin".to_string(), "(:bundle)libraries".to_string());
        manifest
            .autoloads
            .directories
            .push("(:bundle)models".to_string());
        manifest
    }

    #[test]
    fn validates_baseline_manifest() {
        assert!(admin_manifest().validate().is_ok());
        assert_eq!(admin_manifest().key(), "admin");
    }

    #[test]
    fn rejects_empty_and_malformed_names() {
        let mut manifest = admin_manifest();
        manifest.name = "  ".to_string();
        assert_eq!(manifest.validate(), Err(ManifestValidationError::EmptyName));

        manifest.name = "Admin\\Tools".to_string();
        assert!(matches!(
            manifest.validate(),
            Err(ManifestValidationError::InvalidName(_))
        ));
    }

    #[test]
    fn rejects_self_alias() {
        let mut manifest = admin_manifest();
        manifest
            .autoloads
            .aliases
            .insert("Loop".to_string(), "Loop".to_string());
        assert_eq!(
            manifest.validate(),
            Err(ManifestValidationError::SelfAlias("Loop".to_string()))
        );
    }

    #[test]
    fn rejects_namespace_with_separator() {
        let mut manifest = admin_manifest();
        manifest
            .autoloads
            .namespaces
            .insert("Admin\\Sub".to_string(), "/x".to_string());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestValidationError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn rejects_empty_location() {
        let mut manifest = admin_manifest();
        manifest.location = String::new();
        assert_eq!(
            manifest.validate(),
            Err(ManifestValidationError::EmptyLocation)
        );
    }

    #[test]
    fn expands_bundle_placeholder() {
        let manifest = admin_manifest();
        let autoloads = manifest.expanded_autoloads();

        assert_eq!(
            autoloads.map.get("Admin\\Panel").map(String::as_str),
            Some("/bundles/admin/panel.php")
        );
        assert_eq!(
            autoloads.namespaces.get("Admin").map(String::as_str),
            Some("/bundles/admin/libraries")
        );
        assert_eq!(autoloads.directories, vec!["/bundles/admin/models"]);
        assert_eq!(
            manifest.start_path(),
            Some(PathBuf::from("/bundles/admin/start.php"))
        );
    }

    #[test]
    fn parses_json_with_defaults() {
        let manifest: BundleManifest =
            serde_json::from_str(r#"{ "name": "docs", "location": "/bundles/docs/" }"#)
                .expect("manifest json");
        assert_eq!(manifest.start, None);
        assert!(manifest.autoloads.map.is_empty());
        assert!(manifest.validate().is_ok());
    }
}
