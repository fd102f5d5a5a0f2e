//! Gate tensor records
//!
//! A record describes one operator applied to the network: where it acts,
//! which tensor it uses and in which form it is applied.

use serde::{Deserialize, Serialize};

use super::arena::{ArenaScope, TensorArena, TensorHandle};
use crate::error::Result;

/// How the contraction backend treats an operator's legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    /// Unitary operator; its adjoint is applied structurally by the backend.
    Unitary,
    /// Non-unitary operator (projectors, state preparation); the backend only
    /// conjugates it, so reversed connectivity needs transposed data.
    NonUnitary,
}

impl OperatorKind {
    pub fn from_unitary(is_unitary: bool) -> Self {
        if is_unitary {
            OperatorKind::Unitary
        } else {
            OperatorKind::NonUnitary
        }
    }

    pub fn is_unitary(&self) -> bool {
        matches!(self, OperatorKind::Unitary)
    }
}

/// One applied operator in a tensor network
#[derive(Debug, Clone, PartialEq)]
pub struct GateTensorRecord {
    /// Qubits the operator acts on, in tensor-leg order
    pub target_qubit_ids: Vec<usize>,
    /// Control wires; empty means no control
    pub control_qubit_ids: Vec<usize>,
    /// Tensor data owned by the allocating arena
    pub data: TensorHandle,
    pub kind: OperatorKind,
    pub is_adjoint: bool,
}

impl GateTensorRecord {
    pub fn new(
        target_qubit_ids: Vec<usize>,
        control_qubit_ids: Vec<usize>,
        data: TensorHandle,
        kind: OperatorKind,
        is_adjoint: bool,
    ) -> Self {
        GateTensorRecord {
            target_qubit_ids,
            control_qubit_ids,
            data,
            kind,
            is_adjoint,
        }
    }

    pub fn is_unitary(&self) -> bool {
        self.kind.is_unitary()
    }

    /// Number of tensor axes: one input and one output leg per target.
    pub fn rank(&self) -> usize {
        2 * self.target_qubit_ids.len()
    }

    /// Largest qubit id referenced by this record.
    pub fn max_qubit(&self) -> Option<usize> {
        self.target_qubit_ids
            .iter()
            .chain(self.control_qubit_ids.iter())
            .copied()
            .max()
    }

    /// Bra-side form of this record for an overlap network.
    ///
    /// The adjoint flag is flipped for every operator. Non-unitary operators
    /// additionally get a transposed copy of their data staged in `scope`;
    /// unitary operators keep their data unless it lives in a different arena
    /// than the scope, in which case it is copied over unchanged. The source
    /// tensor is never modified.
    pub fn to_bra_side(&self, source: &TensorArena, scope: &mut ArenaScope<'_>) -> Result<Self> {
        let mut record = self.clone();
        record.is_adjoint = !self.is_adjoint;

        match self.kind {
            OperatorKind::Unitary => {
                if !scope.arena().owns(self.data) {
                    let data = source.get(self.data)?;
                    record.data = scope.stage(data.as_ref().clone())?;
                }
            }
            OperatorKind::NonUnitary => {
                let data = source.get(self.data)?;
                let transposed = data.t().as_standard_layout().into_owned();
                record.data = scope.stage(transposed)?;
            }
        }

        Ok(record)
    }
}
