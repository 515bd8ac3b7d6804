use std::path::PathBuf;

use atlas_config::ConfigError;
use atlas_terrain::GenerationError;
use thiserror::Error;

/// Failures that end an `atlas-gen` run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no platform config directory, pass --config")]
    NoConfigDir,

    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to write preview {}: {source}", .path.display())]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{failed} of {total} chunks failed to generate")]
    ChunksFailed { failed: usize, total: usize },
}
