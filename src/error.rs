use thiserror::Error;

/// Fatal problems found while building the pipeline. None of these are
/// recoverable: the frame loop never starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("mesh has no vertices, nothing to simulate")]
    EmptyMesh,

    #[error("mesh does not expose a vertex position attribute")]
    MissingPositions,

    #[error("failed to load mesh asset `{path}`: {reason}")]
    AssetLoadFailed { path: String, reason: String },

    #[error("GPU cannot use {format} as a storage texture for particle state")]
    UnsupportedStateFormat { format: &'static str },

    #[error("{pipeline} failed to build: {reason}")]
    PipelineFailed {
        pipeline: &'static str,
        reason: String,
    },
}

/// Wiring bugs between components. Seeing one of these means a system was
/// scheduled in the wrong order or fed an index from somewhere else.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComputeError {
    #[error("compute stage used before initialize()")]
    Uninitialized,

    #[error("particle index {index} outside [0, {count})")]
    TexelOutOfRange { index: usize, count: usize },
}
