//! Voxel data producers. A backend fills one `dim^3` grid per requested
//! chunk into a caller-owned contiguous buffer and returns when done.

use isoterra_chunk::{ChunkCoord, GridBatch};
use isoterra_world::DensitySource;
use rayon::prelude::*;
use thiserror::Error;

use crate::cancel::CancelToken;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("batch buffer holds {got} grids of dim {got_dim}, expected {want} of dim {want_dim}")]
    Layout {
        got: usize,
        got_dim: usize,
        want: usize,
        want_dim: usize,
    },
    #[error("backend failed: {0}")]
    Failed(String),
}

pub trait DataBackend: Send + Sync {
    /// Fills `out` (already sized for `coords.len()` grids of `grid_dim`).
    /// Should stop early once `cancel` is set; partial output is discarded
    /// by the caller.
    fn generate(
        &self,
        coords: &[ChunkCoord],
        grid_dim: usize,
        out: &mut GridBatch,
        cancel: &CancelToken,
    ) -> Result<(), BackendError>;
}

/// Samples a [`DensitySource`] on the CPU, one rayon task per chunk.
pub struct CpuBackend<S: DensitySource> {
    source: S,
}

impl<S: DensitySource> CpuBackend<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: DensitySource> DataBackend for CpuBackend<S> {
    fn generate(
        &self,
        coords: &[ChunkCoord],
        grid_dim: usize,
        out: &mut GridBatch,
        cancel: &CancelToken,
    ) -> Result<(), BackendError> {
        if grid_dim < 2 || out.dim() != grid_dim || out.len() != coords.len() {
            return Err(BackendError::Layout {
                got: out.len(),
                got_dim: out.dim(),
                want: coords.len(),
                want_dim: grid_dim,
            });
        }
        let cubes = grid_dim - 1;
        let stride = out.stride();
        out.as_mut_slice()
            .par_chunks_exact_mut(stride)
            .zip(coords.par_iter())
            .for_each(|(dst, c)| {
                if cancel.is_cancelled() {
                    return;
                }
                self.source.fill(c.origin(cubes), grid_dim, dst);
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoterra_world::{FlatTerrain, MaterialKey};

    fn flat() -> CpuBackend<FlatTerrain> {
        CpuBackend::new(FlatTerrain {
            height: 2.5,
            material: MaterialKey(7),
        })
    }

    #[test]
    fn fills_each_chunk_at_its_origin() {
        let backend = flat();
        let coords = [ChunkCoord::new(0, 0, 0), ChunkCoord::new(0, 1, 0)];
        let mut batch = GridBatch::new(5);
        batch.reset(coords.len());
        backend
            .generate(&coords, 5, &mut batch, &CancelToken::new())
            .unwrap();
        // chunk 0 spans y 0..=4, chunk 1 spans y 4..=8
        assert_eq!(batch.view(0).get(0, 0, 0).density, -2.5);
        assert_eq!(batch.view(1).get(0, 0, 0).density, 1.5);
        // shared plane is identical in both grids
        assert_eq!(batch.view(0).get(3, 4, 1), batch.view(1).get(3, 0, 1));
        assert_eq!(batch.view(1).get(0, 0, 0).material, 7);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let backend = flat();
        let mut batch = GridBatch::new(5);
        batch.reset(1);
        let err = backend
            .generate(&[ChunkCoord::default(); 2], 5, &mut batch, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, BackendError::Layout { want: 2, .. }));
    }

    #[test]
    fn cancelled_token_leaves_buffer_untouched() {
        let backend = flat();
        let mut batch = GridBatch::new(3);
        batch.reset(1);
        let cancel = CancelToken::new();
        cancel.cancel();
        backend
            .generate(&[ChunkCoord::default()], 3, &mut batch, &cancel)
            .unwrap();
        assert_eq!(batch.view(0).get(0, 0, 0), isoterra_chunk::Voxel::EMPTY);
    }
}
