//! Color to biome lookup table.

use atlas_voxel::BiomeId;
use hashbrown::HashMap;

use super::BiomeEntry;
use crate::error::GenerationError;

/// Maps packed raster colors to biome ids, with a fallback for unmapped colors.
#[derive(Clone, Debug)]
pub struct ColorBiomeTable {
    by_color: HashMap<u32, BiomeId>,
    default: BiomeId,
    biomes: Vec<BiomeId>,
}

impl ColorBiomeTable {
    /// Build a table from a non-empty list of entries with distinct colors.
    ///
    /// Without an explicit `default`, the first entry's biome is used.
    ///
    /// # Errors
    ///
    /// [`GenerationError::EmptyBiomeTable`] for an empty list,
    /// [`GenerationError::DuplicateColor`] if two entries share a color.
    pub fn new(entries: &[BiomeEntry], default: Option<BiomeId>) -> Result<Self, GenerationError> {
        let first = entries.first().ok_or(GenerationError::EmptyBiomeTable)?;
        let default = default.unwrap_or_else(|| first.biome.clone());

        let mut by_color = HashMap::with_capacity(entries.len());
        let mut biomes: Vec<BiomeId> = Vec::new();
        for entry in entries {
            if let Some(existing) = by_color.insert(entry.color, entry.biome.clone()) {
                return Err(GenerationError::DuplicateColor {
                    color: entry.color,
                    first: existing,
                    second: entry.biome.clone(),
                });
            }
            if !biomes.contains(&entry.biome) {
                biomes.push(entry.biome.clone());
            }
        }
        if !biomes.contains(&default) {
            biomes.push(default.clone());
        }

        Ok(Self {
            by_color,
            default,
            biomes,
        })
    }

    /// The biome mapped to `color`, if any.
    pub fn lookup(&self, color: u32) -> Option<&BiomeId> {
        self.by_color.get(&color)
    }

    /// The biome for `color`, falling back to the default.
    pub fn resolve(&self, color: u32) -> &BiomeId {
        self.lookup(color).unwrap_or(&self.default)
    }

    /// Biome used outside the raster and for unmapped colors.
    pub fn default_biome(&self) -> &BiomeId {
        &self.default
    }

    /// Every biome this table can produce, in entry order, default last if
    /// it is not also an entry.
    pub fn biomes(&self) -> &[BiomeId] {
        &self.biomes
    }

    /// Number of mapped colors.
    pub fn len(&self) -> usize {
        self.by_color.len()
    }

    /// Always `false` for a successfully built table.
    pub fn is_empty(&self) -> bool {
        self.by_color.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<BiomeEntry> {
        vec![
            BiomeEntry::new(0xFF0000, "atlas:plains"),
            BiomeEntry::new(0x00FF00, "atlas:desert"),
        ]
    }

    #[test]
    fn test_unmapped_color_returns_default() {
        let table = ColorBiomeTable::new(&entries(), Some(BiomeId::new("atlas:ocean"))).unwrap();
        assert_eq!(table.resolve(0xFF0000), "atlas:plains");
        assert_eq!(table.resolve(0x00FF00), "atlas:desert");
        assert_eq!(table.resolve(0x0000FF), "atlas:ocean");
        assert_eq!(table.lookup(0x0000FF), None);
    }

    #[test]
    fn test_default_falls_back_to_first_entry() {
        let table = ColorBiomeTable::new(&entries(), None).unwrap();
        assert_eq!(table.default_biome(), "atlas:plains");
        assert_eq!(table.biomes().len(), 2);
    }

    #[test]
    fn test_biomes_lists_default_once() {
        let table = ColorBiomeTable::new(&entries(), Some(BiomeId::new("atlas:ocean"))).unwrap();
        let names: Vec<_> = table.biomes().iter().map(BiomeId::as_str).collect();
        assert_eq!(names, ["atlas:plains", "atlas:desert", "atlas:ocean"]);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            ColorBiomeTable::new(&[], None),
            Err(GenerationError::EmptyBiomeTable)
        ));
    }

    #[test]
    fn test_duplicate_color_rejected() {
        let mut list = entries();
        list.push(BiomeEntry::new(0xFF0000, "atlas:tundra"));
        let err = ColorBiomeTable::new(&list, None).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::DuplicateColor { color: 0xFF0000, ref first, ref second }
                if first == "atlas:plains" && second == "atlas:tundra"
        ));
    }
}
