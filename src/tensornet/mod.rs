//! Tensor network representation of a quantum state
//!
//! Gate tensors live in a `TensorArena`; a `TensorNetState` is the ordered
//! list of records referencing them. A `ContractionBackend` evaluates the
//! network using workspace from a `ScratchPool`.

pub mod arena;
pub mod backend;
pub mod network;
pub mod record;
pub mod scratch;

pub use arena::{ArenaScope, TensorArena, TensorHandle};
pub use backend::{AccessorQuery, AccessorResult, ContractionBackend, DenseContractionBackend};
pub use network::{OpId, TensorNetState};
pub use record::{GateTensorRecord, OperatorKind};
pub use scratch::{ScratchLease, ScratchPool};
