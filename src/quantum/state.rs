// src/quantum/state.rs
//! Dense quantum state representations
//!
//! Host-side state vectors exchanged with the tensor-network layer. Index `i`
//! holds the amplitude of the basis state whose qubit `q` equals bit `q` of
//! `i` (qubit 0 is the least-significant bit).

use std::fmt;

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TensorNetError};
use crate::tensornet::network::state_dimension;

/// A single-qubit measurement outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    /// Measurement yielded 0
    Zero,
    /// Measurement yielded 1
    One,
}

impl Outcome {
    pub fn bit(&self) -> u8 {
        match self {
            Outcome::Zero => 0,
            Outcome::One => 1,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// State vector representation of a quantum state
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    /// Number of qubits
    pub qubit_count: usize,

    /// The state vector as an array of complex amplitudes
    amplitudes: Array1<Complex64>,
}

impl StateVector {
    /// Create a new, normalized state vector with the given amplitudes
    pub fn new(qubit_count: usize, amplitudes: Array1<Complex64>) -> Result<Self> {
        let state = Self::from_amplitudes(amplitudes)?;
        if state.qubit_count != qubit_count {
            return Err(TensorNetError::DimensionMismatch {
                expected: state_dimension(qubit_count).unwrap_or(usize::MAX),
                actual: state.dimension(),
            });
        }

        if !state.is_normalized() {
            return Err(TensorNetError::invalid(format!(
                "state vector is not normalized, norm = {}",
                state.norm_sqr()
            )));
        }

        Ok(state)
    }

    /// Wrap amplitudes whose length is a power of two; normalization is not checked.
    pub fn from_amplitudes(amplitudes: Array1<Complex64>) -> Result<Self> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(TensorNetError::invalid(format!(
                "state vector dimension {} is not a power of two",
                dim
            )));
        }

        Ok(StateVector {
            qubit_count: dim.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Create a new state vector in the computational basis state |index⟩
    pub fn computational_basis(qubit_count: usize, index: usize) -> Result<Self> {
        let dim = state_dimension(qubit_count).ok_or_else(|| {
            TensorNetError::invalid(format!("{} qubits exceed the addressable state size", qubit_count))
        })?;

        if index >= dim {
            return Err(TensorNetError::invalid(format!(
                "index {} is out of range for {}-qubit state",
                index, qubit_count
            )));
        }

        let mut amplitudes = Array1::zeros(dim);
        amplitudes[index] = Complex64::new(1.0, 0.0);

        Ok(StateVector {
            qubit_count,
            amplitudes,
        })
    }

    /// Returns the number of qubits in this quantum state
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Returns the dimension of the Hilbert space (2^n for n qubits)
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Inner product ⟨self|other⟩
    pub fn inner_product(&self, other: &Self) -> Result<Complex64> {
        if self.qubit_count != other.qubit_count {
            return Err(TensorNetError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }

        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Calculate the probability of measuring the given basis index
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map_or(0.0, |amp| amp.norm_sqr())
    }

    /// Squared norm ⟨ψ|ψ⟩
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|amp| amp.norm_sqr()).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.norm_sqr() - 1.0).abs() < 1e-10
    }

    /// Get a reference to the amplitudes
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Array1<Complex64> {
        self.amplitudes
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for amp in self.amplitudes.iter() {
            writeln!(f, "{}", amp)?;
        }
        Ok(())
    }
}
