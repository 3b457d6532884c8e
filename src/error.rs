/// Error types for the renderer
/// The per-frame hot path never fails; errors come from setup and configuration.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TornadoError {
    /// A render target or texture was requested with a zero dimension
    #[error("invalid resolution {width}x{height}: both dimensions must be non-zero")]
    InvalidResolution { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raw pixel data does not match `width * height * channels`
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("matrix is singular and cannot be inverted")]
    SingularMatrix,

    #[error("failed to spawn worker thread {id}: {source}")]
    WorkerSpawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TornadoError>;
