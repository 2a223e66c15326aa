//! In-memory host used for dry runs and tests.

use super::{LoadError, LoadResult, SourceHost};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Host backed by a fixed set of virtual files.
///
/// Every existence probe, load and alias binding is recorded so callers can
/// inspect exactly what a resolution touched.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: BTreeSet<PathBuf>,
    failing: BTreeMap<PathBuf, String>,
    probes: RefCell<Vec<PathBuf>>,
    loads: Vec<PathBuf>,
    aliases: Vec<(String, String)>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host whose filesystem holds `files`.
    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut host = Self::new();
        for file in files {
            host.add_file(file);
        }
        host
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into());
    }

    /// Makes loads of `path` fail with `reason`. The file still exists.
    pub fn fail_on(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) {
        let path = path.into();
        self.files.insert(path.clone());
        self.failing.insert(path, reason.into());
    }

    /// Paths probed with `exists`, in probe order.
    pub fn probes(&self) -> Vec<PathBuf> {
        self.probes.borrow().clone()
    }

    /// Paths loaded, in load order.
    pub fn loads(&self) -> &[PathBuf] {
        &self.loads
    }

    /// `(real, alias)` bindings, in bind order.
    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    pub fn clear_history(&mut self) {
        self.probes.borrow_mut().clear();
        self.loads.clear();
        self.aliases.clear();
    }
}

impl SourceHost for MemoryHost {
    fn exists(&self, path: &Path) -> bool {
        self.probes.borrow_mut().push(path.to_path_buf());
        self.files.contains(path)
    }

    fn load(&mut self, path: &Path) -> LoadResult<()> {
        if let Some(reason) = self.failing.get(path) {
            return Err(LoadError::rejected(path, reason.clone()));
        }
        if !self.files.contains(path) {
            return Err(LoadError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such virtual file"),
            ));
        }
        self.loads.push(path.to_path_buf());
        Ok(())
    }

    fn bind_alias(&mut self, real: &str, alias: &str) -> LoadResult<()> {
        self.aliases.push((real.to_string(), alias.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryHost;
    use crate::host::{LoadError, SourceHost};
    use std::path::{Path, PathBuf};

    #[test]
    fn records_probes_and_loads() {
        let mut host = MemoryHost::with_files(["/app/user.php"]);
        assert!(host.exists(Path::new("/app/user.php")));
        assert!(!host.exists(Path::new("/app/role.php")));
        host.load(Path::new("/app/user.php")).expect("load");

        assert_eq!(
            host.probes(),
            vec![
                PathBuf::from("/app/user.php"),
                PathBuf::from("/app/role.php")
            ]
        );
        assert_eq!(host.loads(), [PathBuf::from("/app/user.php")]);

        host.clear_history();
        assert!(host.probes().is_empty());
        assert!(host.loads().is_empty());
    }

    #[test]
    fn failing_path_exists_but_rejects_load() {
        let mut host = MemoryHost::new();
        host.fail_on("/app/broken.php", "permission denied");

        assert!(host.exists(Path::new("/app/broken.php")));
        let err = host
            .load(Path::new("/app/broken.php"))
            .expect_err("load must fail");
        assert!(matches!(err, LoadError::Rejected { .. }));
        assert!(host.loads().is_empty());
    }
}
