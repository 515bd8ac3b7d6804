//! Configuration structs with documented defaults and RON persistence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::biome_entries::BiomeEntries;
use crate::error::ConfigError;

/// Value of `ceiling_height` when the field is omitted.
pub const CEILING_UNSET: i32 = i32::MIN;

const CONFIG_FILE: &str = "atlas.ron";

/// Top-level configuration for one image-driven dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasConfig {
    /// Chunk generator settings (height, aquifer, roof rasters and scales).
    pub generator: GeneratorConfig,
    /// Biome source settings (color raster and entry list).
    pub biome_source: BiomeSourceConfig,
    /// Vertical shape of the world.
    #[serde(default)]
    pub world: WorldShapeConfig,
    /// Raster loading settings.
    #[serde(default)]
    pub raster: RasterConfig,
    /// Debug/development settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Chunk generator configuration. Field names follow the dimension file format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Resource key of the grayscale elevation raster.
    pub height_map: String,
    /// Resource key of the fluid-level raster. Empty means constant sea level.
    #[serde(default)]
    pub aquifer: String,
    /// Resource key of the ceiling raster. Empty means no ceiling fill.
    #[serde(default)]
    pub roof: String,
    /// Elevation added to every scaled raster sample.
    pub starting_y: i32,
    /// Top of the ceiling fill; [`CEILING_UNSET`] when omitted.
    #[serde(default = "default_ceiling_height")]
    pub ceiling_height: i32,
    /// Multiplier applied to raster samples before adding `starting_y`.
    #[serde(default = "default_scale")]
    pub vertical_scale: f32,
    /// World blocks per raster pixel.
    #[serde(default = "default_scale")]
    pub horizontal_scale: f32,
    /// Ordered cave layer descriptors.
    #[serde(default)]
    pub caves: Vec<CaveLayerConfig>,
    /// Block placed below the surface.
    #[serde(default = "default_block")]
    pub default_block: String,
    /// Block placed between the surface and the fluid level.
    #[serde(default = "default_fluid")]
    pub default_fluid: String,
}

/// Rasters describing one enclosed cave layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaveLayerConfig {
    /// Floor elevation raster.
    pub floor: String,
    /// Ceiling elevation raster.
    pub ceiling: String,
    /// Optional biome color raster for the layer.
    #[serde(default)]
    pub biome_map: Option<String>,
    /// Optional fluid-level raster for the layer.
    #[serde(default)]
    pub aquifer: Option<String>,
}

/// Biome source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeSourceConfig {
    /// Resource key of the color-coded biome raster.
    pub biome_map: String,
    /// Non-empty color/biome list, inline or by reference.
    pub biomes: BiomeEntries,
    /// Biome used outside the raster or for unmapped colors.
    /// Falls back to the first entry's biome.
    #[serde(default)]
    pub default: Option<String>,
    /// Overrides the generator's horizontal scale for biome lookups.
    #[serde(default)]
    pub horizontal_scale: Option<f32>,
}

/// Vertical extent of the generated world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldShapeConfig {
    /// Lowest block y.
    pub min_y: i32,
    /// Number of block layers.
    pub height: u32,
    /// Constant fluid level used when no aquifer raster is configured.
    pub sea_level: i32,
}

/// Raster loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RasterConfig {
    /// Directory that namespaced resource keys resolve against.
    pub root: PathBuf,
    /// Keep only a window of each raster resident instead of the whole image.
    pub windowed: bool,
    /// Window radius in raster pixels around the chunk being generated.
    pub gen_radius: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

fn default_ceiling_height() -> i32 {
    CEILING_UNSET
}

fn default_scale() -> f32 {
    1.0
}

fn default_block() -> String {
    "stone".to_string()
}

fn default_fluid() -> String {
    "water".to_string()
}

impl Default for WorldShapeConfig {
    fn default() -> Self {
        Self {
            min_y: -64,
            height: 384,
            sea_level: 63,
        }
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("resources"),
            windowed: false,
            gen_radius: 512,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a generator config with only the required fields set.
    pub fn new(height_map: impl Into<String>, starting_y: i32) -> Self {
        Self {
            height_map: height_map.into(),
            aquifer: String::new(),
            roof: String::new(),
            starting_y,
            ceiling_height: CEILING_UNSET,
            vertical_scale: default_scale(),
            horizontal_scale: default_scale(),
            caves: Vec::new(),
            default_block: default_block(),
            default_fluid: default_fluid(),
        }
    }

    /// The aquifer raster key, if one is configured.
    pub fn aquifer_path(&self) -> Option<&str> {
        (!self.aquifer.is_empty()).then_some(self.aquifer.as_str())
    }

    /// The roof raster key, if one is configured.
    pub fn roof_path(&self) -> Option<&str> {
        (!self.roof.is_empty()).then_some(self.roof.as_str())
    }

    /// The ceiling height, if one is configured.
    pub fn ceiling_height(&self) -> Option<i32> {
        (self.ceiling_height != CEILING_UNSET).then_some(self.ceiling_height)
    }
}

impl BiomeSourceConfig {
    /// Horizontal scale for biome lookups, falling back to the generator's.
    pub fn effective_scale(&self, generator: &GeneratorConfig) -> f32 {
        self.horizontal_scale.unwrap_or(generator.horizontal_scale)
    }
}

// --- Parse / Validate ---

impl AtlasConfig {
    /// Parse a RON document. Optional fields may be written without `Some(..)`.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: AtlasConfig = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(contents)
            .map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generator = &self.generator;
        if generator.height_map.is_empty() {
            return Err(ConfigError::Invalid("height_map must not be empty".into()));
        }
        if !(generator.horizontal_scale > 0.0 && generator.horizontal_scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "horizontal_scale must be positive, got {}",
                generator.horizontal_scale
            )));
        }
        if !generator.vertical_scale.is_finite() {
            return Err(ConfigError::Invalid("vertical_scale must be finite".into()));
        }
        if self.world.height == 0 {
            return Err(ConfigError::Invalid("world height must be positive".into()));
        }
        for (i, cave) in generator.caves.iter().enumerate() {
            if cave.floor.is_empty() || cave.ceiling.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "cave layer {i} needs both floor and ceiling rasters"
                )));
            }
        }

        let source = &self.biome_source;
        if source.biome_map.is_empty() {
            return Err(ConfigError::Invalid("biome_map must not be empty".into()));
        }
        let scale = source.effective_scale(generator);
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "biome horizontal_scale must be positive, got {scale}"
            )));
        }
        match &source.biomes {
            BiomeEntries::Inline(entries) => {
                if entries.is_empty() {
                    return Err(ConfigError::Invalid("biomes must not be empty".into()));
                }
                let mut seen = HashSet::new();
                for entry in entries {
                    let color = entry.color.to_packed()?;
                    if !seen.insert(color) {
                        return Err(ConfigError::Invalid(format!(
                            "color {color:#08x} is mapped more than once"
                        )));
                    }
                }
            }
            BiomeEntries::Reference(id) => {
                if id.is_empty() {
                    return Err(ConfigError::Invalid("biome list id must not be empty".into()));
                }
            }
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl AtlasConfig {
    /// Load `atlas.ron` from the given directory.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let config = Self::from_ron(&contents)?;
        log::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Save config to the given directory as `atlas.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: returns `Some(new_config)` if it changed, `None` otherwise.
    ///
    /// A changed config means rasters and entry lists must be reloaded by the owner.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config = Self::from_ron(&contents)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
