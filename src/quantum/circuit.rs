// src/quantum/circuit.rs
//! Circuit construction
//!
//! `CircuitBuilder` populates a tensor network with gate tensors: each gate's
//! matrix is stored in the network's arena and a record referencing it is
//! appended in application order.

use tracing::trace;

use super::gate::{ParametrizedGate, Projector, QuantumGate, StandardGate};
use super::state::Outcome;
use crate::error::{Result, TensorNetError};
use crate::tensornet::{OpId, OperatorKind, TensorNetState};

/// Appends gates to a tensor network
pub struct CircuitBuilder<'n, 'a> {
    network: &'n mut TensorNetState<'a>,
}

impl<'n, 'a> CircuitBuilder<'n, 'a> {
    /// Create a builder appending to `network`
    pub fn new(network: &'n mut TensorNetState<'a>) -> Self {
        CircuitBuilder { network }
    }

    pub fn qubit_count(&self) -> usize {
        self.network.num_qubits()
    }

    /// Add a gate on `targets`, conditioned on every qubit in `controls` being 1
    pub fn add_gate(&mut self, gate: &dyn QuantumGate, targets: &[usize], controls: &[usize]) -> Result<OpId> {
        self.push(gate, targets, controls, false)
    }

    /// Add the adjoint of a gate; the stored tensor is the gate itself
    pub fn add_adjoint_gate(&mut self, gate: &dyn QuantumGate, targets: &[usize], controls: &[usize]) -> Result<OpId> {
        self.push(gate, targets, controls, true)
    }

    fn push(&mut self, gate: &dyn QuantumGate, targets: &[usize], controls: &[usize], adjoint: bool) -> Result<OpId> {
        if gate.qubit_count() != targets.len() {
            return Err(TensorNetError::invalid(format!(
                "gate {} acts on {} qubits, but {} target qubits were specified",
                gate.name(),
                gate.qubit_count(),
                targets.len()
            )));
        }

        let arena = self.network.arena();
        let handle = arena.allocate(gate.matrix())?;
        let kind = OperatorKind::from_unitary(gate.is_unitary());
        let id = self
            .network
            .append_operator(targets, controls, handle, kind, adjoint)
            .map_err(|e| {
                arena.release(handle);
                e
            })?;
        trace!(gate = %gate.name(), ?targets, ?controls, adjoint, "appended gate");
        Ok(id)
    }

    /// Add a Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::H, &[qubit], &[])
    }

    /// Add a Pauli-X gate
    pub fn x(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::X, &[qubit], &[])
    }

    /// Add a Pauli-Y gate
    pub fn y(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::Y, &[qubit], &[])
    }

    /// Add a Pauli-Z gate
    pub fn z(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::Z, &[qubit], &[])
    }

    pub fn s(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::S, &[qubit], &[])
    }

    pub fn sdg(&mut self, qubit: usize) -> Result<OpId> {
        self.add_adjoint_gate(&StandardGate::S, &[qubit], &[])
    }

    pub fn t(&mut self, qubit: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::T, &[qubit], &[])
    }

    pub fn tdg(&mut self, qubit: usize) -> Result<OpId> {
        self.add_adjoint_gate(&StandardGate::T, &[qubit], &[])
    }

    /// Add an Rx gate
    pub fn rx(&mut self, qubit: usize, theta: f64) -> Result<OpId> {
        self.add_gate(&ParametrizedGate::Rx(theta), &[qubit], &[])
    }

    /// Add an Ry gate
    pub fn ry(&mut self, qubit: usize, theta: f64) -> Result<OpId> {
        self.add_gate(&ParametrizedGate::Ry(theta), &[qubit], &[])
    }

    /// Add an Rz gate
    pub fn rz(&mut self, qubit: usize, theta: f64) -> Result<OpId> {
        self.add_gate(&ParametrizedGate::Rz(theta), &[qubit], &[])
    }

    /// Add a CNOT gate
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::X, &[target], &[control])
    }

    pub fn cz(&mut self, control: usize, target: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::Z, &[target], &[control])
    }

    /// Add a controlled Rz gate
    pub fn crz(&mut self, control: usize, target: usize, theta: f64) -> Result<OpId> {
        self.add_gate(&ParametrizedGate::Rz(theta), &[target], &[control])
    }

    /// Add a SWAP gate
    pub fn swap(&mut self, qubit1: usize, qubit2: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::SWAP, &[qubit1, qubit2], &[])
    }

    /// Add a Toffoli gate (CCNOT)
    pub fn toffoli(&mut self, control1: usize, control2: usize, target: usize) -> Result<OpId> {
        self.add_gate(&StandardGate::X, &[target], &[control1, control2])
    }

    /// Project a qubit onto a basis outcome (non-unitary, unnormalized)
    pub fn project(&mut self, qubit: usize, outcome: Outcome) -> Result<OpId> {
        self.add_gate(&Projector(outcome), &[qubit], &[])
    }

    /// Create a Bell pair (entangled state)
    pub fn bell_pair(&mut self, qubit1: usize, qubit2: usize) -> Result<OpId> {
        self.h(qubit1)?;
        self.cnot(qubit1, qubit2)
    }

    /// Prepare a GHZ state across the whole register
    pub fn ghz(&mut self) -> Result<()> {
        let n = self.qubit_count();
        if n == 0 {
            return Ok(());
        }
        self.h(0)?;
        for q in 1..n {
            self.cnot(q - 1, q)?;
        }
        Ok(())
    }
}
