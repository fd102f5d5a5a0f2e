// src/quantum/mod.rs
//! Quantum circuit building blocks
//!
//! Gate matrices, dense host-side state vectors and the circuit builder that
//! turns gates into tensor-network records.

pub mod state;
pub mod gate;
pub mod circuit;

pub use state::{Outcome, StateVector};
pub use gate::{CustomMatrixGate, ParametrizedGate, Projector, QuantumGate, StandardGate};
pub use circuit::CircuitBuilder;

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{Outcome, StateVector};
    pub use super::{QuantumGate, StandardGate, ParametrizedGate, Projector};
    pub use super::CircuitBuilder;
}
