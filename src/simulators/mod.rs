//! Simulation states
//!
//! The tensor-network state manager and the dense state-vector state, joined
//! under the closed `SimulationState` enum.

pub mod state;
pub mod statevector;
pub mod tensornet;

pub use state::{
    Precision,
    SampleResult,
    SimulationState,
    StateData,
    StateRepresentation,
    TensorView,
};
pub use statevector::StatevectorState;
pub use tensornet::TensorNetSimulationState;
