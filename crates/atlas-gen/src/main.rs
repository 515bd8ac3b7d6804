//! Atlas generator: builds terrain around the origin from raster maps.
//!
//! Loads `atlas.ron`, decodes the configured rasters, generates every chunk
//! within `--radius` of the origin on a worker pool and optionally writes a
//! surface-height preview image.
//!
//! Run with: `cargo run -p atlas-gen -- --config <dir> --preview out.png`

mod error;
mod preview;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use atlas_config::{AtlasConfig, CliArgs};
use atlas_raster::DirectoryResolver;
use atlas_terrain::{AsyncChunkGenerator, AtlasGenerator, BiomeEntryCache, GenerationTask};
use atlas_voxel::{BlockRegistry, ChunkPos, ProtoChunk};
use clap::Parser;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::preview::SurfacePreview;

const APP_NAME: &str = "atlas";

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("atlas-gen: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => dirs::config_dir()
            .ok_or(AppError::NoConfigDir)?
            .join(APP_NAME),
    };

    let mut config = AtlasConfig::load(&config_dir)?;
    config.apply_cli_overrides(args);

    let log_dir = config_dir.join("logs");
    atlas_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!("Atlas generator, config from {}", config_dir.display());

    let root = resource_root(&config_dir, &config.raster.root);
    info!("Resolving resources under {}", root.display());
    let resolver = DirectoryResolver::new(root);

    let registry = BlockRegistry::with_defaults();
    let cache = BiomeEntryCache::new();
    let mut generator = AtlasGenerator::from_config(&config, &registry, &cache, &resolver)?;
    generator.find_maps(&resolver, &args.dimension)?;
    let generator = Arc::new(generator);

    let mut preview = args
        .preview
        .as_ref()
        .map(|_| SurfacePreview::new(args.radius, generator.min_y(), generator.world_height()));

    let started = Instant::now();
    let pool = AsyncChunkGenerator::with_defaults(Arc::clone(&generator))?;
    let stats = generate_area(&pool, args.radius, |chunk| {
        if let Some(preview) = preview.as_mut() {
            preview.record(chunk);
        }
    });
    info!(
        "Generated {} chunks in {:.2?} ({} blocks, avg {} us/chunk)",
        stats.generated,
        started.elapsed(),
        stats.blocks,
        stats.average_us()
    );

    if let (Some(preview), Some(path)) = (preview, args.preview.as_ref()) {
        preview.save(path).map_err(|source| AppError::Preview {
            path: path.clone(),
            source,
        })?;
        info!("Wrote surface preview to {}", path.display());
    }

    if stats.failed > 0 {
        return Err(AppError::ChunksFailed {
            failed: stats.failed,
            total: stats.generated + stats.failed,
        });
    }
    Ok(())
}

/// Relative resource roots are taken relative to the config directory.
fn resource_root(config_dir: &Path, root: &Path) -> PathBuf {
    if root.is_relative() {
        config_dir.join(root)
    } else {
        root.to_path_buf()
    }
}

/// Chunks within `radius` of the origin, nearest first.
fn area_tasks(radius: u32) -> VecDeque<GenerationTask> {
    let r = radius as i32;
    let mut tasks: Vec<_> = (-r..=r)
        .flat_map(|x| (-r..=r).map(move |z| ChunkPos::new(x, z)))
        .map(|pos| GenerationTask {
            pos,
            priority: (i64::from(pos.x).pow(2) + i64::from(pos.z).pow(2)) as u64,
        })
        .collect();
    tasks.sort_by_key(|task| task.priority);
    tasks.into()
}

#[derive(Debug, Default)]
struct AreaStats {
    generated: usize,
    failed: usize,
    blocks: usize,
    total_us: u64,
}

impl AreaStats {
    fn average_us(&self) -> u64 {
        self.total_us / self.generated.max(1) as u64
    }
}

/// Feed the pool every chunk of the area, handing each finished chunk to
/// `on_chunk`.
fn generate_area(
    pool: &AsyncChunkGenerator,
    radius: u32,
    mut on_chunk: impl FnMut(&ProtoChunk),
) -> AreaStats {
    let mut pending = area_tasks(radius);
    let total = pending.len();
    let mut stats = AreaStats::default();

    while stats.generated + stats.failed < total {
        while let Some(task) = pending.pop_front() {
            if let Err(task) = pool.submit(task) {
                pending.push_front(task);
                break;
            }
        }

        let mut results = pool.drain_results();
        if results.is_empty() {
            if !pending.is_empty() || pool.in_flight_count() > 0 {
                std::thread::sleep(Duration::from_millis(2));
                continue;
            }
            // Workers finish a chunk before dropping the in-flight count.
            results = pool.drain_results();
            if results.is_empty() {
                warn!(
                    "Generation stopped with {} of {total} chunks outstanding",
                    total - stats.generated - stats.failed
                );
                stats.failed = total - stats.generated;
                break;
            }
        }

        for result in results {
            match result.chunk {
                Ok(chunk) => {
                    stats.generated += 1;
                    stats.blocks += chunk.non_air_count();
                    stats.total_us += result.generation_time_us;
                    on_chunk(&chunk);
                }
                Err(err) => {
                    error!("Chunk {:?} failed: {err}", result.pos);
                    stats.failed += 1;
                }
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_tasks_nearest_first() {
        let tasks = area_tasks(2);
        assert_eq!(tasks.len(), 25);
        assert_eq!(tasks[0].pos, ChunkPos::new(0, 0));
        assert_eq!(tasks.back().map(|t| t.priority), Some(8));
        assert!(tasks.iter().all(|t| t.pos.x.abs() <= 2 && t.pos.z.abs() <= 2));
    }

    #[test]
    fn test_resource_root_relative_to_config() {
        let config = Path::new("/etc/atlas");
        assert_eq!(
            resource_root(config, Path::new("resources")),
            PathBuf::from("/etc/atlas/resources")
        );
        assert_eq!(
            resource_root(config, Path::new("/srv/maps")),
            PathBuf::from("/srv/maps")
        );
    }

    #[test]
    fn test_average_without_chunks() {
        assert_eq!(AreaStats::default().average_us(), 0);
    }
}
