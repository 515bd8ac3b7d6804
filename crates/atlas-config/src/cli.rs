//! Command-line argument parsing for the atlas tools.

use std::path::PathBuf;

use clap::Parser;

use crate::AtlasConfig;

/// Atlas generator command-line arguments.
///
/// CLI values override settings loaded from `atlas.ron`.
#[derive(Parser, Debug)]
#[command(name = "atlas-gen", about = "Generate voxel terrain from raster maps")]
pub struct CliArgs {
    /// Path to the directory holding `atlas.ron`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resource root override (namespaced keys resolve against it).
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Keep only a window of each raster resident.
    #[arg(long)]
    pub windowed: Option<bool>,

    /// Chunk radius around the origin to generate.
    #[arg(long, default_value_t = 4)]
    pub radius: u32,

    /// Dimension name used in log output.
    #[arg(long, default_value = "overworld")]
    pub dimension: String,

    /// Write a grayscale surface-height preview PNG here.
    #[arg(long)]
    pub preview: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl AtlasConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref root) = args.resources {
            self.raster.root = root.clone();
        }
        if let Some(windowed) = args.windowed {
            self.raster.windowed = windowed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
