//! Error types for tensor-network simulation state operations

use thiserror::Error;

use crate::simulators::StateRepresentation;

/// Errors raised by the network, the contraction backend and the state manager
#[derive(Error, Debug)]
pub enum TensorNetError {
    /// Malformed query or degenerate input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Tensor index beyond the network's operator count
    #[error("invalid tensor index {index}: network holds {count} tensors")]
    OutOfRange { index: usize, count: usize },

    /// Overlap against a state that is not network based
    #[error("computing overlap with a {0} state is not supported")]
    UnsupportedType(StateRepresentation),

    /// Reconstruction from a data layout this representation cannot ingest
    #[error("unsupported state data format: {0}")]
    UnsupportedFormat(String),

    /// Host buffer size does not match the state-vector size
    #[error("dimension mismatch: expecting {expected} elements but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Contraction workspace exceeds the scratch pool
    #[error("insufficient workspace: {required} bytes required, scratch pool holds {available}")]
    ResourceExhausted { required: usize, available: usize },

    /// Opaque failure reported by the contraction backend
    #[error("contraction backend failure: {0}")]
    BackendFailure(String),

    /// The owned network was released through `destroy_state`
    #[error("tensor network state has been released")]
    Released,

    /// Output sink failure while dumping
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for tensor-network operations
pub type Result<T> = std::result::Result<T, TensorNetError>;

impl TensorNetError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TensorNetError::InvalidArgument(msg.into())
    }
}
