//! Simulation state representations
//!
//! The closed set of state representations a host can hold, plus the data
//! types they exchange: exported tensor views, state data used for
//! reconstruction and sampling results.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, ArrayD};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::statevector::StatevectorState;
use super::tensornet::TensorNetSimulationState;
use crate::error::{Result, TensorNetError};
use crate::tensornet::TensorHandle;

/// Kind of state representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateRepresentation {
    TensorNetwork,
    StateVector,
}

impl StateRepresentation {
    /// Whether overlaps can be computed by joining tensor networks
    pub fn supports_network_overlap(&self) -> bool {
        matches!(self, StateRepresentation::TensorNetwork)
    }
}

impl fmt::Display for StateRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRepresentation::TensorNetwork => write!(f, "tensor-network"),
            StateRepresentation::StateVector => write!(f, "state-vector"),
        }
    }
}

/// Floating-point precision of exported tensor data.
///
/// Arena tensors are always `Complex64`, so views report `Fp64`. `Fp32` is
/// kept so exported views describe their precision like other backends do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    Fp32,
    Fp64,
}

impl Precision {
    /// Bytes per complex element
    pub fn element_size(&self) -> usize {
        match self {
            Precision::Fp32 => 8,
            Precision::Fp64 => 16,
        }
    }
}

/// Read-only view of one gate tensor.
///
/// `data` aliases the arena's tensor; nothing is copied.
#[derive(Debug, Clone)]
pub struct TensorView {
    pub handle: TensorHandle,
    pub data: Arc<Array2<Complex64>>,
    /// `2` repeated once per tensor leg
    pub extents: Vec<usize>,
    pub precision: Precision,
}

impl TensorView {
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub fn num_elements(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.num_elements() * self.precision.element_size()
    }
}

/// Data a state can be reconstructed from
#[derive(Debug, Clone, Copy)]
pub enum StateData<'d> {
    /// Explicit dense amplitudes
    Dense(&'d [Complex64]),
    /// Factored (matrix-product) tensors
    Factored(&'d [ArrayD<Complex64>]),
}

impl StateData<'_> {
    pub fn format_name(&self) -> &'static str {
        match self {
            StateData::Dense(_) => "dense",
            StateData::Factored(_) => "matrix-product tensors",
        }
    }
}

/// Counts of sampled computational-basis bit strings.
///
/// Bit strings print qubit 0 first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleResult {
    counts: BTreeMap<String, usize>,
    shots: usize,
}

impl SampleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bits: String) {
        *self.counts.entry(bits).or_insert(0) += 1;
        self.shots += 1;
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn count(&self, bits: &str) -> usize {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Observed frequency of a bit string
    pub fn probability(&self, bits: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.count(bits) as f64 / self.shots as f64
    }

    /// Most frequent bit string; ties resolve to the lexicographically smallest.
    pub fn most_probable(&self) -> Option<&str> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&String, usize)>, (bits, &count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((bits, count)),
            })
            .map(|(bits, _)| bits.as_str())
    }
}

impl fmt::Display for SampleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (bits, count) in &self.counts {
            write!(f, "{}:{} ", bits, count)?;
        }
        write!(f, "}}")
    }
}

/// A simulation state in one of the supported representations
#[derive(Debug)]
pub enum SimulationState<'a> {
    TensorNet(TensorNetSimulationState<'a>),
    StateVector(StatevectorState),
}

impl<'a> SimulationState<'a> {
    pub fn representation(&self) -> StateRepresentation {
        match self {
            SimulationState::TensorNet(_) => StateRepresentation::TensorNetwork,
            SimulationState::StateVector(_) => StateRepresentation::StateVector,
        }
    }

    pub fn supports_network_overlap(&self) -> bool {
        self.representation().supports_network_overlap()
    }

    pub fn num_qubits(&self) -> usize {
        match self {
            SimulationState::TensorNet(state) => state.num_qubits(),
            SimulationState::StateVector(state) => state.num_qubits(),
        }
    }

    pub fn as_tensor_net(&self) -> Option<&TensorNetSimulationState<'a>> {
        match self {
            SimulationState::TensorNet(state) => Some(state),
            SimulationState::StateVector(_) => None,
        }
    }

    pub fn as_tensor_net_mut(&mut self) -> Option<&mut TensorNetSimulationState<'a>> {
        match self {
            SimulationState::TensorNet(state) => Some(state),
            SimulationState::StateVector(_) => None,
        }
    }

    /// `|⟨other|self⟩|` between two states of a compatible representation
    pub fn overlap(&self, other: &SimulationState<'_>) -> Result<f64> {
        match (self, other) {
            (SimulationState::TensorNet(state), _) => state.overlap(other),
            (SimulationState::StateVector(state), SimulationState::StateVector(other)) => state.overlap(other),
            (SimulationState::StateVector(_), other) => {
                Err(TensorNetError::UnsupportedType(other.representation()))
            }
        }
    }
}

impl<'a> From<TensorNetSimulationState<'a>> for SimulationState<'a> {
    fn from(state: TensorNetSimulationState<'a>) -> Self {
        SimulationState::TensorNet(state)
    }
}

impl From<StatevectorState> for SimulationState<'_> {
    fn from(state: StatevectorState) -> Self {
        SimulationState::StateVector(state)
    }
}
