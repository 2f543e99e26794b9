use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use hashbrown::{HashMap, HashSet};
use isoterra_chunk::{
    Chunk, ChunkCoord, ChunkRegistry, MaterialError, MaterialRegistry, MeshBuffers, RegistryError,
};
use isoterra_edit::{BrushShape, DeformRequest, EditRevisions, ShapeCache, apply_deform};
use isoterra_geom::LatticePos;
use isoterra_mesh_cpu::Mesher;
use isoterra_world::{TerrainConfig, hash};
use thiserror::Error;

use crate::backend::{BackendError, DataBackend};
use crate::cancel::CancelToken;
use crate::deferred::DeferredQueue;
use crate::disposal::DisposalQueue;
use crate::sink::{ChunkSink, ChunkTransform};
use crate::worker::{self, ChunkResult, Job, WorkerCtx, WorkerMsg};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Where the in-flight job currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
    #[default]
    Idle,
    AwaitingData,
    AwaitingMesh,
    AwaitingReadback,
    Applying,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    BatchCompleted {
        request: RequestId,
        coords: Vec<ChunkCoord>,
    },
    BatchCancelled {
        request: RequestId,
    },
    /// Mesh handed to the sink and made visible.
    MeshReady {
        coord: ChunkCoord,
        triangles: usize,
    },
    /// Mesh failed the degeneracy probe; chunk hidden, voxels kept.
    MeshRejected {
        coord: ChunkCoord,
    },
    /// Collider may be attached; emitted from the fixed step.
    CollisionSafe {
        coord: ChunkCoord,
    },
    Disposed {
        coord: ChunkCoord,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeformOutcome {
    Applied {
        touched: Vec<ChunkCoord>,
        remesh: RequestId,
    },
    /// A job is in flight; retry later.
    Busy,
    /// The chunk owning the edit point is not resident.
    NoChunk,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request {request:?} rejected: {source}")]
    Registry {
        request: RequestId,
        #[source]
        source: RegistryError,
    },
    #[error("mesh for chunk {coord:?} rejected: {source}")]
    Material {
        coord: ChunkCoord,
        #[source]
        source: MaterialError,
    },
    #[error("request {request:?} failed in the data backend: {source}")]
    Backend {
        request: RequestId,
        #[source]
        source: BackendError,
    },
    #[error("pipeline did not go idle within {0:?}")]
    Timeout(Duration),
    #[error("pipeline worker disconnected")]
    WorkerGone,
    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PipelineStats {
    pub jobs_completed: u64,
    pub jobs_cancelled: u64,
    pub chunks_meshed: u64,
    pub degenerate_meshes: u64,
    pub triangles_emitted: u64,
    pub last_job_ms: u32,
}

enum RequestKind {
    Generate(Vec<ChunkCoord>),
    Remesh(Vec<ChunkCoord>),
}

struct Queued {
    id: RequestId,
    kind: RequestKind,
}

struct InFlight {
    id: RequestId,
    coords: Vec<ChunkCoord>,
    cancel: CancelToken,
    /// Set when the host aborted the job; remaining output is dropped silently.
    discard: bool,
    /// Edit stamp each remeshed chunk was snapshotted at.
    built_revs: HashMap<ChunkCoord, u64>,
}

/// Serialises chunk generation and remeshing: one job in flight on a
/// dedicated worker thread, further requests queued FIFO. The host owns
/// the registry and the sink and drives progress with [`Self::pump`].
pub struct GenerationPipeline {
    cubes_per_axis: usize,
    voxel_scale: f32,
    state: PipelineState,
    queue: VecDeque<Queued>,
    inflight: Option<InFlight>,
    next_id: u64,
    job_tx: Option<Sender<Job>>,
    res_rx: Receiver<WorkerMsg>,
    worker: Option<JoinHandle<()>>,
    materials: Option<MaterialRegistry>,
    deferred: DeferredQueue<ChunkCoord>,
    disposal: DisposalQueue,
    revisions: EditRevisions,
    shapes: ShapeCache,
    events: Vec<PipelineEvent>,
    stats: PipelineStats,
}

impl GenerationPipeline {
    pub fn new(
        config: &TerrainConfig,
        backend: Arc<dyn DataBackend>,
    ) -> Result<Self, PipelineError> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (res_tx, res_rx) = unbounded::<WorkerMsg>();
        let mesher = Mesher::new(config.mesher);
        let ctx = WorkerCtx {
            backend,
            mesher,
            surface: config.surface,
            grid_dim: config.grid_dim(),
            batch_size: config.batch_size,
        };
        let worker = thread::Builder::new()
            .name("isoterra-pipeline".into())
            .spawn(move || worker::run(ctx, job_rx, res_tx))?;
        log::info!(
            target: "pipeline",
            "pipeline ready: {} cubes/axis, mesher={:?}, batch={}",
            config.cubes_per_axis,
            mesher.kind(),
            config.batch_size
        );
        Ok(Self {
            cubes_per_axis: config.cubes_per_axis,
            voxel_scale: config.voxel_scale,
            state: PipelineState::Idle,
            queue: VecDeque::new(),
            inflight: None,
            next_id: 0,
            job_tx: Some(job_tx),
            res_rx,
            worker: Some(worker),
            materials: None,
            deferred: DeferredQueue::new(),
            disposal: DisposalQueue::new(config.dispose_batch, config.dispose_delay_ticks),
            revisions: EditRevisions::new(),
            shapes: ShapeCache::new(),
            events: Vec::new(),
            stats: PipelineStats::default(),
        })
    }

    /// Every submesh material must resolve in `materials` before it is applied.
    pub fn with_materials(mut self, materials: MaterialRegistry) -> Self {
        self.materials = Some(materials);
        self
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// True while a job is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.inflight.is_some()
    }

    /// No job in flight, nothing queued, nothing waiting for disposal.
    pub fn is_idle(&self) -> bool {
        self.inflight.is_none() && self.queue.is_empty() && self.disposal.is_empty()
    }

    #[inline]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    #[inline]
    pub fn revisions(&self) -> &EditRevisions {
        &self.revisions
    }

    fn next_request(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    /// Queues generation of `coords`. Chunks are registered when the
    /// request starts, not now. A coordinate already registered without
    /// data, e.g. after a cancelled request, is filled in place; one that
    /// already holds data fails the request with `Duplicate`.
    pub fn request_generate(&mut self, coords: Vec<ChunkCoord>) -> RequestId {
        let id = self.next_request();
        log::debug!(target: "pipeline", "{:?} generate queued ({} chunks)", id, coords.len());
        self.queue.push_back(Queued {
            id,
            kind: RequestKind::Generate(coords),
        });
        id
    }

    /// Queues meshing of the resident grids of `coords` (snapshotted when
    /// the request starts). Chunks without data are skipped.
    pub fn request_remesh(&mut self, coords: Vec<ChunkCoord>) -> RequestId {
        let id = self.next_request();
        log::debug!(target: "pipeline", "{:?} remesh queued ({} chunks)", id, coords.len());
        self.queue.push_back(Queued {
            id,
            kind: RequestKind::Remesh(coords),
        });
        id
    }

    pub fn request_dispose<I: IntoIterator<Item = ChunkCoord>>(&mut self, coords: I) {
        self.disposal.push(coords);
    }

    /// Cancels a queued or in-flight request. Returns false if unknown.
    pub fn cancel(&mut self, request: RequestId) -> bool {
        if let Some(job) = &self.inflight {
            if job.id == request {
                job.cancel.cancel();
                log::info!(target: "pipeline", "{:?} cancel requested", request);
                return true;
            }
        }
        if let Some(pos) = self.queue.iter().position(|q| q.id == request) {
            self.queue.remove(pos);
            self.stats.jobs_cancelled += 1;
            log::info!(target: "pipeline", "{:?} cancelled before start", request);
            self.events.push(PipelineEvent::BatchCancelled { request });
            return true;
        }
        false
    }

    pub fn cancel_all(&mut self) {
        let queued: Vec<RequestId> = self.queue.iter().map(|q| q.id).collect();
        for id in queued {
            self.cancel(id);
        }
        if let Some(job) = &self.inflight {
            job.cancel.cancel();
        }
    }

    /// Non-blocking: applies whatever the worker has finished, starts the
    /// next queued request, and advances the disposal queue by one tick.
    pub fn pump(
        &mut self,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
    ) -> Result<Vec<PipelineEvent>, PipelineError> {
        self.step(registry, sink, None)?;
        Ok(std::mem::take(&mut self.events))
    }

    /// Pumps until [`Self::is_idle`], blocking on worker output.
    pub fn pump_until_idle(
        &mut self,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
        timeout: Duration,
    ) -> Result<Vec<PipelineEvent>, PipelineError> {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            let now = Instant::now();
            if now >= deadline {
                return Err(PipelineError::Timeout(timeout));
            }
            self.step(registry, sink, Some(deadline - now))?;
        }
        Ok(std::mem::take(&mut self.events))
    }

    /// Attaches colliders for meshes applied since the last fixed step.
    pub fn drain_fixed_step(
        &mut self,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
    ) -> Vec<PipelineEvent> {
        let mut out = Vec::new();
        for coord in self.deferred.drain() {
            let Some(chunk) = registry.try_get_mut(coord) else {
                continue;
            };
            if !chunk.is_physically_correct() {
                continue;
            }
            chunk.set_collidable(true);
            sink.set_collidable(coord, true);
            log::trace!(target: "pipeline", "collision safe {:?}", coord);
            out.push(PipelineEvent::CollisionSafe { coord });
        }
        out
    }

    /// Sculpts at a global lattice point and queues a remesh of every
    /// touched chunk. Refuses while a job is in flight, and when the chunk
    /// owning `point` is absent or was never filled.
    pub fn deform(
        &mut self,
        registry: &mut ChunkRegistry,
        point: LatticePos,
        delta: f32,
        material: i32,
        brush: BrushShape,
    ) -> DeformOutcome {
        if self.is_busy() {
            log::debug!(target: "pipeline", "deform at {:?} refused: job in flight", point);
            return DeformOutcome::Busy;
        }
        let owner = ChunkCoord::containing(point, self.cubes_per_axis);
        if !registry.try_get(owner).is_some_and(|c| c.has_data()) {
            log::debug!(target: "pipeline", "deform at {:?} ignored: {:?} has no data", point, owner);
            return DeformOutcome::NoChunk;
        }
        let req = DeformRequest {
            point,
            delta,
            material,
            brush,
        };
        let report = apply_deform(registry, &mut self.shapes, &req);
        self.revisions.bump(report.touched.iter().copied());
        let remesh = self.request_remesh(report.touched.clone());
        DeformOutcome::Applied {
            touched: report.touched,
            remesh,
        }
    }

    fn step(
        &mut self,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
        wait: Option<Duration>,
    ) -> Result<(), PipelineError> {
        self.tick_disposal(registry, sink);
        self.start_next(registry)?;
        if self.inflight.is_some() {
            let first = match wait {
                Some(d) => match self.res_rx.recv_timeout(d) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return Err(self.worker_gone()),
                },
                None => match self.res_rx.try_recv() {
                    Ok(msg) => Some(msg),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => return Err(self.worker_gone()),
                },
            };
            if let Some(msg) = first {
                self.handle(msg, registry, sink)?;
                while let Ok(msg) = self.res_rx.try_recv() {
                    self.handle(msg, registry, sink)?;
                }
            }
        }
        self.start_next(registry)
    }

    fn worker_gone(&mut self) -> PipelineError {
        self.inflight = None;
        self.state = PipelineState::Idle;
        log::error!(target: "pipeline", "worker thread is gone");
        PipelineError::WorkerGone
    }

    fn tick_disposal(&mut self, registry: &mut ChunkRegistry, sink: &mut dyn ChunkSink) {
        for coord in self.disposal.tick() {
            if registry.remove(coord).is_none() {
                continue;
            }
            sink.dispose(coord);
            self.deferred.remove(&coord);
            self.revisions.forget(coord);
            log::debug!(target: "pipeline", "disposed {:?}", coord);
            self.events.push(PipelineEvent::Disposed { coord });
        }
    }

    fn start_next(&mut self, registry: &mut ChunkRegistry) -> Result<(), PipelineError> {
        while self.inflight.is_none() {
            let Some(Queued { id, kind }) = self.queue.pop_front() else {
                return Ok(());
            };
            match kind {
                RequestKind::Generate(coords) => {
                    if let Err(source) = self.register_all(registry, &coords) {
                        log::error!(target: "pipeline", "{:?} rejected: {}", id, source);
                        return Err(PipelineError::Registry {
                            request: id,
                            source,
                        });
                    }
                    if coords.is_empty() {
                        self.complete(id, coords);
                        continue;
                    }
                    let cancel = CancelToken::new();
                    let job = Job::Generate {
                        id: id.0,
                        coords: coords.clone(),
                        cancel: cancel.clone(),
                    };
                    self.dispatch(id, coords, cancel, HashMap::new(), job)?;
                }
                RequestKind::Remesh(coords) => {
                    let mut grids = Vec::with_capacity(coords.len());
                    let mut built_revs = HashMap::new();
                    for c in coords {
                        let Some(chunk) = registry.try_get(c) else {
                            continue;
                        };
                        if !chunk.has_data() || built_revs.contains_key(&c) {
                            continue;
                        }
                        grids.push((c, chunk.grid().clone()));
                        built_revs.insert(c, self.revisions.get_rev(c));
                    }
                    let coords: Vec<ChunkCoord> = grids.iter().map(|(c, _)| *c).collect();
                    if coords.is_empty() {
                        self.complete(id, coords);
                        continue;
                    }
                    let cancel = CancelToken::new();
                    let job = Job::Remesh {
                        id: id.0,
                        grids,
                        cancel: cancel.clone(),
                    };
                    self.dispatch(id, coords, cancel, built_revs, job)?;
                }
            }
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        id: RequestId,
        coords: Vec<ChunkCoord>,
        cancel: CancelToken,
        built_revs: HashMap<ChunkCoord, u64>,
        job: Job,
    ) -> Result<(), PipelineError> {
        self.state = match job {
            Job::Generate { .. } => PipelineState::AwaitingData,
            Job::Remesh { .. } => PipelineState::AwaitingMesh,
        };
        log::info!(target: "pipeline", "{:?} started ({} chunks)", id, coords.len());
        self.inflight = Some(InFlight {
            id,
            coords,
            cancel,
            discard: false,
            built_revs,
        });
        let sent = self.job_tx.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            return Err(self.worker_gone());
        }
        Ok(())
    }

    /// Registers empty chunks for every coordinate, or none of them.
    /// Chunks left registered without data (cancelled or failed jobs) are
    /// reused so the request refills them.
    fn register_all(
        &self,
        registry: &mut ChunkRegistry,
        coords: &[ChunkCoord],
    ) -> Result<(), RegistryError> {
        debug_assert_eq!(registry.cubes_per_axis(), self.cubes_per_axis);
        let mut seen = HashSet::with_capacity(coords.len());
        for &c in coords {
            if hash::try_pack(c.cx, c.cy, c.cz).is_none() {
                return Err(RegistryError::OutOfRange(c));
            }
            let filled = registry.try_get(c).is_some_and(|chunk| chunk.has_data());
            if !seen.insert(c) || filled {
                return Err(RegistryError::Duplicate(c));
            }
        }
        let dim = self.cubes_per_axis + 1;
        for &c in coords {
            if registry.exists(c) {
                log::debug!(target: "pipeline", "refilling registered chunk {:?}", c);
                continue;
            }
            registry.add(Chunk::new_empty(c, dim))?;
        }
        Ok(())
    }

    fn complete(&mut self, request: RequestId, coords: Vec<ChunkCoord>) {
        self.stats.jobs_completed += 1;
        log::info!(
            target: "pipeline",
            "{:?} completed ({} chunks, {} ms)",
            request,
            coords.len(),
            self.stats.last_job_ms
        );
        self.events
            .push(PipelineEvent::BatchCompleted { request, coords });
    }

    fn handle(
        &mut self,
        msg: WorkerMsg,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
    ) -> Result<(), PipelineError> {
        let (request, discard, cancelled) = match &self.inflight {
            Some(job) if job.id.0 == msg.id() => (job.id, job.discard, job.cancel.is_cancelled()),
            _ => return Ok(()),
        };
        match msg {
            WorkerMsg::Stage { state, .. } => {
                if !discard && !cancelled {
                    self.state = state;
                }
            }
            WorkerMsg::SubBatch { results, .. } => {
                if discard || cancelled {
                    log::debug!(target: "pipeline", "{:?} dropping {} results", request, results.len());
                    return Ok(());
                }
                self.state = PipelineState::Applying;
                self.apply_results(results, registry, sink)?;
            }
            WorkerMsg::Finished {
                outcome,
                elapsed_ms,
                ..
            } => {
                let coords = self.inflight.take().map(|j| j.coords).unwrap_or_default();
                self.state = PipelineState::Idle;
                self.stats.last_job_ms = elapsed_ms;
                match outcome {
                    Err(source) => {
                        log::error!(target: "pipeline", "{:?} backend failure: {}", request, source);
                        return Err(PipelineError::Backend { request, source });
                    }
                    Ok(()) if discard => {}
                    Ok(()) if cancelled => {
                        self.stats.jobs_cancelled += 1;
                        log::info!(target: "pipeline", "{:?} cancelled", request);
                        self.events.push(PipelineEvent::BatchCancelled { request });
                    }
                    Ok(()) => self.complete(request, coords),
                }
            }
        }
        Ok(())
    }

    fn validate_materials(&self, mesh: &MeshBuffers) -> Result<(), MaterialError> {
        if let Some(materials) = &self.materials {
            for sm in &mesh.submeshes {
                materials.resolve(sm.material)?;
            }
        }
        Ok(())
    }

    fn apply_results(
        &mut self,
        results: Vec<ChunkResult>,
        registry: &mut ChunkRegistry,
        sink: &mut dyn ChunkSink,
    ) -> Result<(), PipelineError> {
        for r in results {
            let coord = r.coord;
            if let Err(source) = self.validate_materials(&r.mesh) {
                if let Some(job) = self.inflight.as_mut() {
                    job.discard = true;
                    job.cancel.cancel();
                }
                log::error!(target: "pipeline", "chunk {:?}: {}", coord, source);
                return Err(PipelineError::Material { coord, source });
            }
            let Some(chunk) = registry.try_get_mut(coord) else {
                log::debug!(target: "pipeline", "chunk {:?} left before apply", coord);
                continue;
            };
            if let Some(grid) = r.grid {
                chunk.set_grid(grid);
            }
            let triangles = r.mesh.triangle_count();
            let correct = r.mesh.is_physically_correct();
            chunk.set_mesh(r.mesh);
            self.stats.chunks_meshed += 1;
            if let Some(job) = &self.inflight {
                if let Some(&rev) = job.built_revs.get(&coord) {
                    self.revisions.mark_built(coord, rev);
                }
            }

            if !correct {
                chunk.set_visible(false);
                chunk.set_collidable(false);
                sink.set_visible(coord, false);
                sink.set_collidable(coord, false);
                self.deferred.remove(&coord);
                self.stats.degenerate_meshes += 1;
                log::debug!(target: "pipeline", "chunk {:?} mesh rejected ({} tris)", coord, triangles);
                self.events.push(PipelineEvent::MeshRejected { coord });
                continue;
            }

            if let Some(mesh) = chunk.mesh() {
                sink.apply(coord, mesh);
            }
            sink.set_transform(
                coord,
                ChunkTransform::for_chunk(coord, self.cubes_per_axis, self.voxel_scale),
            );
            chunk.set_visible(true);
            sink.set_visible(coord, true);
            self.stats.triangles_emitted += triangles as u64;
            self.deferred.push(coord);
            self.events
                .push(PipelineEvent::MeshReady { coord, triangles });
        }
        Ok(())
    }
}

impl Drop for GenerationPipeline {
    fn drop(&mut self) {
        if let Some(job) = &self.inflight {
            job.cancel.cancel();
        }
        self.job_tx.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::warn!(target: "pipeline", "worker thread panicked");
            }
        }
    }
}
