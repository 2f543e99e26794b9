//! Asynchronous chunk generation and meshing pipeline (engine-only).
#![forbid(unsafe_code)]

mod backend;
mod cancel;
mod deferred;
mod disposal;
mod pipeline;
mod sink;
mod worker;

pub use backend::{BackendError, CpuBackend, DataBackend};
pub use cancel::CancelToken;
pub use deferred::DeferredQueue;
pub use disposal::DisposalQueue;
pub use pipeline::{
    DeformOutcome, GenerationPipeline, PipelineError, PipelineEvent, PipelineState,
    PipelineStats, RequestId,
};
pub use sink::{ChunkSink, ChunkTransform};
