//! Asynchronous chunk generation with a configurable thread pool.
//!
//! Workers share one read-only [`AtlasGenerator`], support cancellation, and
//! deliver completed chunks via a bounded channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use atlas_voxel::{ChunkPos, ProtoChunk};
use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;

use crate::error::GenerationError;
use crate::generator::AtlasGenerator;

/// A request to generate a single chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationTask {
    /// Chunk to generate.
    pub pos: ChunkPos,
    /// Lower values are more urgent. Typically the squared distance to the
    /// area of interest.
    pub priority: u64,
}

/// A generated chunk, or the error that stopped it.
#[derive(Debug)]
pub struct GeneratedChunk {
    /// The chunk position matching the original task.
    pub pos: ChunkPos,
    /// The filled chunk.
    pub chunk: Result<ProtoChunk, GenerationError>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

struct PrioritizedTask {
    task: GenerationTask,
    cancelled: Arc<AtomicBool>,
}

/// Manages asynchronous chunk generation across a thread pool.
pub struct AsyncChunkGenerator {
    task_sender: Sender<PrioritizedTask>,
    result_receiver: Receiver<GeneratedChunk>,
    /// Cancellation flag per pending chunk.
    active_tasks: Arc<DashMap<ChunkPos, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl AsyncChunkGenerator {
    /// Start `thread_count` workers over `generator`.
    ///
    /// - `max_concurrent`: submissions beyond twice this many queued tasks are
    ///   rejected.
    /// - `result_capacity`: bounded channel capacity for completed chunks.
    pub fn new(
        generator: Arc<AtlasGenerator>,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> Result<Self, GenerationError> {
        let (task_sender, task_receiver) = bounded::<PrioritizedTask>(max_concurrent * 2);
        let (result_sender, result_receiver) = bounded::<GeneratedChunk>(result_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        for index in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let generator = Arc::clone(&generator);

            std::thread::Builder::new()
                .name(format!("chunk-gen-{index}"))
                .spawn(move || {
                    while let Ok(ptask) = receiver.recv() {
                        if ptask.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let chunk = generate_chunk_sync(&generator, ptask.task.pos);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if let Err(err) = &chunk {
                            let pos = ptask.task.pos;
                            tracing::error!("Failed to generate chunk {pos:?}: {err}");
                        }
                        if !ptask.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedChunk {
                                pos: ptask.task.pos,
                                chunk,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .map_err(GenerationError::Spawn)?;
        }
        tracing::debug!("Started {thread_count} chunk generation workers");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// A pool sized from the CPU count, leaving two cores for the caller.
    pub fn with_defaults(generator: Arc<AtlasGenerator>) -> Result<Self, GenerationError> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 2).max(1);
        Self::new(generator, threads, 64, 128)
    }

    /// Submit a chunk for background generation.
    ///
    /// Returns `Err(task)` if the queue is full.
    pub fn submit(&self, task: GenerationTask) -> Result<(), GenerationTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks.insert(task.pos, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(PrioritizedTask { task, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let task = e.into_inner().task;
                self.active_tasks.remove(&task.pos);
                task
            })
    }

    /// Cancel a pending or in-progress task. No-op once the chunk completed.
    pub fn cancel(&self, pos: &ChunkPos) {
        if let Some((_, cancelled)) = self.active_tasks.remove(pos) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drain all completed chunks from the result channel.
    pub fn drain_results(&self) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&chunk.pos);
            results.push(chunk);
        }
        results
    }

    /// Number of tasks currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for `pos` is currently pending.
    pub fn is_pending(&self, pos: &ChunkPos) -> bool {
        self.active_tasks.contains_key(pos)
    }
}

/// Generate one chunk on the calling thread: biomes first, then columns.
pub fn generate_chunk_sync(
    generator: &AtlasGenerator,
    pos: ChunkPos,
) -> Result<ProtoChunk, GenerationError> {
    let mut chunk = ProtoChunk::new(pos, generator.min_y(), generator.world_height());
    generator.populate_biomes(&mut chunk);
    generator.fill_chunk(&mut chunk)?;
    Ok(chunk)
}
