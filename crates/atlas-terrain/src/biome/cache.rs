//! Shared biome entry lists, loaded by id and cached until the next reload.

use std::sync::Arc;

use atlas_config::{BiomeEntries, BiomeEntryList};
use atlas_raster::{ResourceKey, ResourceResolver};
use dashmap::DashMap;

use super::BiomeEntry;
use crate::error::GenerationError;

/// Entry lists referenced by id (`"ns:name"` loads `ns:name.json`).
///
/// Owned by whatever manages the dimension lifecycle. Call
/// [`clear`](Self::clear) when resources are reloaded; generators keep the
/// lists they were built with.
#[derive(Debug, Default)]
pub struct BiomeEntryCache {
    lists: DashMap<String, Arc<[BiomeEntry]>>,
}

impl BiomeEntryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A previously loaded list.
    pub fn get(&self, id: &str) -> Option<Arc<[BiomeEntry]>> {
        self.lists.get(id).map(|list| Arc::clone(list.value()))
    }

    /// The list for `id`, loading and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`GenerationError::BiomeEntriesMissing`] if `<id>.json` does not
    /// resolve, [`GenerationError::BiomeEntriesInvalid`] if it is not a valid
    /// entry list.
    pub fn get_or_load(
        &self,
        id: &str,
        resolver: &dyn ResourceResolver,
    ) -> Result<Arc<[BiomeEntry]>, GenerationError> {
        if let Some(list) = self.get(id) {
            return Ok(list);
        }

        let key = ResourceKey::parse(id).map_err(|source| GenerationError::BiomeEntriesMissing {
            id: id.to_string(),
            source,
        })?;
        let file = format!("{}:{}.json", key.namespace, key.path);
        let bytes = resolver
            .resolve(&file)
            .map_err(|source| GenerationError::BiomeEntriesMissing {
                id: id.to_string(),
                source,
            })?;
        let invalid = |source| GenerationError::BiomeEntriesInvalid {
            id: id.to_string(),
            source,
        };
        let parsed = BiomeEntryList::from_json(&bytes).map_err(invalid)?;
        let entries: Arc<[BiomeEntry]> = BiomeEntry::from_configs(&parsed.biomes)
            .map_err(invalid)?
            .into();

        tracing::debug!("Loaded biome entry list {id} ({} entries)", entries.len());
        let cached = self
            .lists
            .entry(id.to_string())
            .or_insert(entries)
            .value()
            .clone();
        Ok(cached)
    }

    /// Entries for a config's `biomes` field: inline lists are converted
    /// directly, references go through the cache.
    pub fn resolve_entries(
        &self,
        entries: &BiomeEntries,
        resolver: &dyn ResourceResolver,
    ) -> Result<Arc<[BiomeEntry]>, GenerationError> {
        match entries {
            BiomeEntries::Inline(configs) => Ok(BiomeEntry::from_configs(configs)?.into()),
            BiomeEntries::Reference(id) => self.get_or_load(id, resolver),
        }
    }

    /// Forget every cached list.
    pub fn clear(&self) {
        let dropped = self.lists.len();
        self.lists.clear();
        tracing::debug!("Cleared {dropped} cached biome entry lists");
    }

    /// Number of cached lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_config::{BiomeEntryConfig, ColorValue};
    use atlas_raster::MemoryResolver;

    const EARTH: &str = r##"{ "biomes": [
        { "color": 16711680, "biome": "atlas:plains" },
        { "color": "#00FF00", "biome": "atlas:desert" }
    ] }"##;

    fn resolver() -> MemoryResolver {
        MemoryResolver::new()
            .with("atlas:earth.json", EARTH.as_bytes().to_vec())
            .unwrap()
            .with("atlas:broken.json", b"{ \"biomes\": 7 }".to_vec())
            .unwrap()
    }

    #[test]
    fn test_get_or_load_caches() {
        let cache = BiomeEntryCache::new();
        assert!(cache.get("atlas:earth").is_none());

        let list = cache.get_or_load("atlas:earth", &resolver()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], BiomeEntry::new(0x00FF00, "atlas:desert"));

        // Served from the cache even when the resource is gone.
        let again = cache.get_or_load("atlas:earth", &MemoryResolver::new()).unwrap();
        assert!(Arc::ptr_eq(&list, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_forces_reload() {
        let cache = BiomeEntryCache::new();
        cache.get_or_load("atlas:earth", &resolver()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert!(matches!(
            cache.get_or_load("atlas:earth", &MemoryResolver::new()),
            Err(GenerationError::BiomeEntriesMissing { .. })
        ));
    }

    #[test]
    fn test_missing_list_names_id() {
        let cache = BiomeEntryCache::new();
        let err = cache.get_or_load("atlas:mars", &resolver()).unwrap_err();
        assert!(err.to_string().contains("'atlas:mars'"));
    }

    #[test]
    fn test_malformed_list_is_invalid() {
        let cache = BiomeEntryCache::new();
        assert!(matches!(
            cache.get_or_load("atlas:broken", &resolver()),
            Err(GenerationError::BiomeEntriesInvalid { id, .. }) if id == "atlas:broken"
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inline_entries_bypass_cache() {
        let cache = BiomeEntryCache::new();
        let inline = BiomeEntries::Inline(vec![BiomeEntryConfig {
            color: ColorValue::Packed(0x123456),
            biome: "atlas:swamp".into(),
        }]);
        let list = cache.resolve_entries(&inline, &MemoryResolver::new()).unwrap();
        assert_eq!(list[0].color, 0x123456);
        assert!(cache.is_empty());
    }
}
