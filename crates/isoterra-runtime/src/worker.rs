//! The pipeline's dedicated job thread.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use isoterra_chunk::{ChunkCoord, GridBatch, MeshBuffers, VoxelGrid};
use isoterra_mesh_cpu::{MarchScratch, Mesher};
use rayon::prelude::*;

use crate::PipelineState;
use crate::backend::{BackendError, DataBackend};
use crate::cancel::CancelToken;

pub(crate) enum Job {
    Generate {
        id: u64,
        coords: Vec<ChunkCoord>,
        cancel: CancelToken,
    },
    Remesh {
        id: u64,
        grids: Vec<(ChunkCoord, VoxelGrid)>,
        cancel: CancelToken,
    },
}

pub(crate) struct ChunkResult {
    pub coord: ChunkCoord,
    /// Freshly generated voxels; `None` for remesh jobs.
    pub grid: Option<VoxelGrid>,
    pub mesh: MeshBuffers,
}

pub(crate) enum WorkerMsg {
    Stage {
        id: u64,
        state: PipelineState,
    },
    SubBatch {
        id: u64,
        results: Vec<ChunkResult>,
    },
    Finished {
        id: u64,
        outcome: Result<(), BackendError>,
        elapsed_ms: u32,
    },
}

impl WorkerMsg {
    pub fn id(&self) -> u64 {
        match self {
            WorkerMsg::Stage { id, .. }
            | WorkerMsg::SubBatch { id, .. }
            | WorkerMsg::Finished { id, .. } => *id,
        }
    }
}

pub(crate) struct WorkerCtx {
    pub backend: Arc<dyn DataBackend>,
    pub mesher: Mesher,
    pub surface: f32,
    pub grid_dim: usize,
    pub batch_size: usize,
}

pub(crate) fn run(ctx: WorkerCtx, rx: Receiver<Job>, tx: Sender<WorkerMsg>) {
    let mut batch = GridBatch::new(ctx.grid_dim);
    while let Ok(job) = rx.recv() {
        let t0 = Instant::now();
        let (id, outcome) = match job {
            Job::Generate { id, coords, cancel } => {
                (id, generate(&ctx, id, &coords, &cancel, &mut batch, &tx))
            }
            Job::Remesh { id, grids, cancel } => (id, remesh(&ctx, id, &grids, &cancel, &tx)),
        };
        let elapsed_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
        if tx
            .send(WorkerMsg::Finished {
                id,
                outcome,
                elapsed_ms,
            })
            .is_err()
        {
            break;
        }
    }
    log::debug!(target: "pipeline", "worker exiting");
}

fn generate(
    ctx: &WorkerCtx,
    id: u64,
    coords: &[ChunkCoord],
    cancel: &CancelToken,
    batch: &mut GridBatch,
    tx: &Sender<WorkerMsg>,
) -> Result<(), BackendError> {
    for sub in coords.chunks(ctx.batch_size.max(1)) {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let _ = tx.send(WorkerMsg::Stage {
            id,
            state: PipelineState::AwaitingData,
        });
        batch.reset(sub.len());
        ctx.backend.generate(sub, ctx.grid_dim, batch, cancel)?;
        if cancel.is_cancelled() {
            return Ok(());
        }
        let _ = tx.send(WorkerMsg::Stage {
            id,
            state: PipelineState::AwaitingMesh,
        });
        let batch_ref: &GridBatch = batch;
        let results: Option<Vec<ChunkResult>> = (0..sub.len())
            .into_par_iter()
            .map_init(MarchScratch::new, |scratch, i| {
                if cancel.is_cancelled() {
                    return None;
                }
                let view = batch_ref.view(i);
                Some(ChunkResult {
                    coord: sub[i],
                    grid: Some(view.to_grid()),
                    mesh: ctx.mesher.mesh_with(view, ctx.surface, scratch),
                })
            })
            .collect();
        let Some(results) = results else {
            return Ok(());
        };
        let _ = tx.send(WorkerMsg::Stage {
            id,
            state: PipelineState::AwaitingReadback,
        });
        let _ = tx.send(WorkerMsg::SubBatch { id, results });
    }
    Ok(())
}

fn remesh(
    ctx: &WorkerCtx,
    id: u64,
    grids: &[(ChunkCoord, VoxelGrid)],
    cancel: &CancelToken,
    tx: &Sender<WorkerMsg>,
) -> Result<(), BackendError> {
    for sub in grids.chunks(ctx.batch_size.max(1)) {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let _ = tx.send(WorkerMsg::Stage {
            id,
            state: PipelineState::AwaitingMesh,
        });
        let results: Option<Vec<ChunkResult>> = sub
            .par_iter()
            .map_init(MarchScratch::new, |scratch, (coord, grid)| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(ChunkResult {
                    coord: *coord,
                    grid: None,
                    mesh: ctx.mesher.mesh_with(grid.view(), ctx.surface, scratch),
                })
            })
            .collect();
        let Some(results) = results else {
            return Ok(());
        };
        let _ = tx.send(WorkerMsg::Stage {
            id,
            state: PipelineState::AwaitingReadback,
        });
        let _ = tx.send(WorkerMsg::SubBatch { id, results });
    }
    Ok(())
}
