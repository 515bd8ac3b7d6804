//! Resolution of namespaced resource keys to raw bytes.
//!
//! Keys have the form `namespace:path/to/file.png`. A key without a colon
//! uses [`DEFAULT_NAMESPACE`].

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::ResourceError;

/// Namespace assumed for keys written without one.
pub const DEFAULT_NAMESPACE: &str = "atlas";

/// A parsed `namespace:path` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceKey<'a> {
    /// Namespace, e.g. `atlas`.
    pub namespace: &'a str,
    /// Slash-separated path inside the namespace.
    pub path: &'a str,
}

impl<'a> ResourceKey<'a> {
    /// Split a key into namespace and path.
    ///
    /// Rejects empty paths and paths that climb out of the namespace with `..`.
    pub fn parse(key: &'a str) -> Result<Self, ResourceError> {
        let (namespace, path) = key.split_once(':').unwrap_or((DEFAULT_NAMESPACE, key));
        let climbs = Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if namespace.is_empty() || path.is_empty() || climbs {
            return Err(ResourceError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(Self { namespace, path })
    }

    /// Relative file path for this key: `<namespace>/<path>`.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.namespace).join(self.path)
    }
}

/// Source of raster and entry-list bytes.
pub trait ResourceResolver: Send + Sync {
    /// Bytes stored under `key`.
    fn resolve(&self, key: &str) -> Result<Vec<u8>, ResourceError>;
}

/// Resolves keys against a directory tree: `ns:maps/h.png` reads
/// `<root>/ns/maps/h.png`.
#[derive(Clone, Debug)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    /// A resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory keys resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for DirectoryResolver {
    fn resolve(&self, key: &str) -> Result<Vec<u8>, ResourceError> {
        let path = self.root.join(ResourceKey::parse(key)?.relative_path());
        tracing::trace!("Resolving {key} -> {}", path.display());
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound {
                key: key.to_string(),
            },
            _ => ResourceError::Io {
                key: key.to_string(),
                source,
            },
        })
    }
}

/// Resolves keys from an in-memory map. Keys are normalized, so `h.png` and
/// `atlas:h.png` name the same entry.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: &str, bytes: impl Into<Vec<u8>>) -> Result<(), ResourceError> {
        let normalized = Self::normalize(key)?;
        self.entries.insert(normalized, bytes.into());
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: &str, bytes: impl Into<Vec<u8>>) -> Result<Self, ResourceError> {
        self.insert(key, bytes)?;
        Ok(self)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn normalize(key: &str) -> Result<String, ResourceError> {
        let parsed = ResourceKey::parse(key)?;
        Ok(format!("{}:{}", parsed.namespace, parsed.path))
    }
}

impl ResourceResolver for MemoryResolver {
    fn resolve(&self, key: &str) -> Result<Vec<u8>, ResourceError> {
        self.entries
            .get(&Self::normalize(key)?)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced_key() {
        let key = ResourceKey::parse("terra:maps/height.png").unwrap();
        assert_eq!(key.namespace, "terra");
        assert_eq!(key.path, "maps/height.png");
        assert_eq!(key.relative_path(), Path::new("terra/maps/height.png"));
    }

    #[test]
    fn test_parse_defaults_namespace() {
        let key = ResourceKey::parse("height.png").unwrap();
        assert_eq!(key.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_parse_rejects_escapes_and_empty() {
        for bad in ["atlas:../secret.png", "atlas:", ":h.png", "atlas:/etc/passwd"] {
            assert!(
                matches!(ResourceKey::parse(bad), Err(ResourceError::InvalidKey { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_directory_resolver_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("atlas/maps")).unwrap();
        std::fs::write(dir.path().join("atlas/maps/a.bin"), [1u8, 2, 3]).unwrap();

        let resolver = DirectoryResolver::new(dir.path());
        assert_eq!(resolver.resolve("atlas:maps/a.bin").unwrap(), vec![1, 2, 3]);
        assert_eq!(resolver.resolve("maps/a.bin").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            resolver.resolve("atlas:maps/missing.bin"),
            Err(ResourceError::NotFound { key }) if key == "atlas:maps/missing.bin"
        ));
    }

    #[test]
    fn test_memory_resolver_normalizes_keys() {
        let resolver = MemoryResolver::new().with("h.png", vec![9u8]).unwrap();
        assert_eq!(resolver.resolve("atlas:h.png").unwrap(), vec![9]);
        assert!(matches!(
            resolver.resolve("other:h.png"),
            Err(ResourceError::NotFound { .. })
        ));
    }
}
