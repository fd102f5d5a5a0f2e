//! Tensor-network simulation state
//!
//! This crate holds the simulation state of a quantum circuit expressed as a
//! tensor network: an ordered list of gate tensors over a fixed qubit
//! register. It answers amplitude, overlap, tensor-export and state-vector
//! queries through a pluggable contraction backend, materializing dense
//! vectors only for registers small enough to afford them.

pub mod config;
pub mod error;
pub mod quantum;
pub mod simulators;
pub mod tensornet;

pub use config::{SharedRng, SimulationConfig};
pub use error::{Result, TensorNetError};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{SharedRng, SimulationConfig};
    pub use crate::error::{Result, TensorNetError};
    pub use crate::quantum::prelude::*;
    pub use crate::simulators::{SimulationState, StateData, TensorNetSimulationState};
    pub use crate::tensornet::{ContractionBackend, DenseContractionBackend, ScratchPool, TensorArena, TensorNetState};
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
