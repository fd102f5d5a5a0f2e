//! Dense state-vector representation
//!
//! Holds the full amplitude vector on the host. It answers the same queries
//! as the tensor-network state but can only overlap with other dense states.

use std::io::Write;

use num_complex::Complex64;

use crate::error::{Result, TensorNetError};
use crate::quantum::StateVector;

/// A simulation state backed by an explicit state vector
#[derive(Debug, Clone, PartialEq)]
pub struct StatevectorState {
    state: StateVector,
}

impl StatevectorState {
    pub fn new(state: StateVector) -> Self {
        StatevectorState { state }
    }

    /// Create the |0...0⟩ state
    pub fn zero_state(qubit_count: usize) -> Result<Self> {
        Ok(Self::new(StateVector::computational_basis(qubit_count, 0)?))
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn num_qubits(&self) -> usize {
        self.state.qubit_count()
    }

    /// Amplitude of a basis state given one bit per qubit, qubit 0 first
    pub fn amplitude(&self, basis_state: &[u8]) -> Result<Complex64> {
        let index = basis_index(basis_state, self.num_qubits())?;
        Ok(self.state.amplitudes()[index])
    }

    /// `|⟨other|self⟩|`
    pub fn overlap(&self, other: &StatevectorState) -> Result<f64> {
        Ok(other.state.inner_product(&self.state)?.norm())
    }

    pub fn to_host(&self, out: &mut [Complex64]) -> Result<()> {
        let amplitudes = self.state.amplitudes();
        if out.len() != amplitudes.len() {
            return Err(TensorNetError::DimensionMismatch {
                expected: amplitudes.len(),
                actual: out.len(),
            });
        }
        out.iter_mut().zip(amplitudes.iter()).for_each(|(dst, src)| *dst = *src);
        Ok(())
    }

    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", self.state)?;
        Ok(())
    }
}

/// Validate a basis-state assignment and turn it into a little-endian index.
///
/// The assignment is scanned from the last qubit to the first, so qubit 0
/// ends up as the least-significant bit.
pub(crate) fn basis_index(basis_state: &[u8], num_qubits: usize) -> Result<usize> {
    if basis_state.len() != num_qubits {
        return Err(TensorNetError::invalid(format!(
            "invalid number of bits in the basis state: expected {}, provided {}",
            num_qubits,
            basis_state.len()
        )));
    }
    if basis_state.iter().any(|&bit| bit > 1) {
        return Err(TensorNetError::invalid(
            "invalid basis state: only qubit states 0 or 1 are supported",
        ));
    }
    if basis_state.is_empty() {
        return Err(TensorNetError::invalid("empty basis state"));
    }

    Ok(basis_state
        .iter()
        .rev()
        .fold(0usize, |acc, &bit| (acc << 1) + bit as usize))
}
