//! Boundary-aware sculpting: shared-voxel resolution, brushes, and edit revisions.
#![forbid(unsafe_code)]

mod brush;
mod deform;
pub mod resolver;
mod revisions;

pub use brush::{BrushSample, BrushShape, ShapeCache};
pub use deform::{DeformReport, DeformRequest, apply_deform};
pub use resolver::{AffectedSet, resolve, resolve_global};
pub use revisions::{EditRevisions, EditStats};
