//! Spec file discovery
//!
//! Walks the spec root depth-first and collects every file whose name
//! contains the spec marker. Traversal uses an explicit worklist so deep
//! trees cannot exhaust the call stack.
//!
//! Directory listings come back in whatever order the file system returns
//! them. With sorting enabled (the default) each listing is ordered by file
//! name first, which makes the discovered sequence, and therefore the bin
//! assignment, identical across runs and platforms.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Discovery errors. Any of these aborts the run before execution.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to read spec directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read entry in {}: {source}", path.display())]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A discovered spec file path
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecFile(PathBuf);

impl SpecFile {
    #[cfg(test)]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SpecFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Pending traversal work
enum Entry {
    Dir(PathBuf),
    File(PathBuf),
}

/// Recursive spec file finder
#[derive(Clone, Debug)]
pub struct SpecDiscovery {
    root: PathBuf,
    marker: String,
    sorted: bool,
}

impl SpecDiscovery {
    pub fn new(root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            marker: marker.into(),
            sorted: true,
        }
    }

    /// Keep the raw file system listing order instead of sorting by name
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Collect all spec files under the root
    pub fn discover(&self) -> Result<Vec<SpecFile>, DiscoveryError> {
        let mut found = Vec::new();
        let mut stack = vec![Entry::Dir(self.root.clone())];

        while let Some(entry) = stack.pop() {
            match entry {
                Entry::File(path) => {
                    if self.is_spec(&path) {
                        debug!("Found spec {}", path.display());
                        found.push(SpecFile(path));
                    }
                }
                Entry::Dir(dir) => {
                    let children = self.list(&dir)?;
                    // Reversed so the first listed child is visited next.
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        info!(
            "Discovered {} spec files under {}",
            found.len(),
            self.root.display()
        );
        Ok(found)
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>, DiscoveryError> {
        let read_dir = fs::read_dir(dir).map_err(|source| DiscoveryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| DiscoveryError::ReadEntry {
                path: dir.to_path_buf(),
                source,
            })?;
            // The entry's own type; symlinks are not followed.
            let file_type = entry.file_type().map_err(|source| DiscoveryError::ReadEntry {
                path: entry.path(),
                source,
            })?;
            entries.push((entry.path(), file_type.is_dir()));
        }

        if self.sorted {
            entries.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));
        }

        Ok(entries
            .into_iter()
            .map(|(path, is_dir)| {
                if is_dir {
                    Entry::Dir(path)
                } else {
                    Entry::File(path)
                }
            })
            .collect())
    }

    fn is_spec(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().contains(&self.marker))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, specs: &[SpecFile]) -> Vec<String> {
        specs
            .iter()
            .map(|s| {
                s.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_finds_nested_spec_and_skips_helpers() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/b/c/foo.spec.ts");
        touch(dir.path(), "a/b/c/foo.helper.ts");

        let specs = SpecDiscovery::new(dir.path(), ".spec.").discover().unwrap();
        assert_eq!(relative(dir.path(), &specs), vec!["a/b/c/foo.spec.ts"]);
    }

    #[test]
    fn test_depth_first_sorted_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "z.spec.ts");
        touch(dir.path(), "auth/login.spec.ts");
        touch(dir.path(), "auth/logout.spec.ts");
        touch(dir.path(), "b.spec.ts");
        touch(dir.path(), "cart/deep/pay.spec.ts");
        touch(dir.path(), "cart/add.spec.ts");

        let specs = SpecDiscovery::new(dir.path(), ".spec.").discover().unwrap();
        assert_eq!(
            relative(dir.path(), &specs),
            vec![
                "auth/login.spec.ts",
                "auth/logout.spec.ts",
                "b.spec.ts",
                "cart/add.spec.ts",
                "cart/deep/pay.spec.ts",
                "z.spec.ts",
            ]
        );
    }

    #[test]
    fn test_marker_must_be_in_file_name() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x.spec.d/plain.ts");

        let specs = SpecDiscovery::new(dir.path(), ".spec.").discover().unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_unsorted_finds_same_set() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "one.spec.js");
        touch(dir.path(), "nested/two.spec.js");

        let mut specs = relative(
            dir.path(),
            &SpecDiscovery::new(dir.path(), ".spec.")
                .sorted(false)
                .discover()
                .unwrap(),
        );
        specs.sort();
        assert_eq!(specs, vec!["nested/two.spec.js", "one.spec.js"]);
    }

    #[test]
    fn test_empty_root() {
        let dir = tempdir().unwrap();
        let specs = SpecDiscovery::new(dir.path(), ".spec.").discover().unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = SpecDiscovery::new(&missing, ".spec.").discover().unwrap_err();
        match err {
            DiscoveryError::ReadDir { path, .. } => assert_eq!(path, missing),
            other => panic!("Expected ReadDir error, got {other:?}"),
        }
    }

    #[test]
    fn test_spec_file_display() {
        let spec = SpecFile::new("cypress/e2e/login.spec.ts");
        assert_eq!(spec.to_string(), "cypress/e2e/login.spec.ts");
    }
}
