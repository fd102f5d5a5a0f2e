//! Tensor network state
//!
//! An append-only, ordered list of gate tensor records over a fixed qubit
//! register. Application order is list order.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::arena::{TensorArena, TensorHandle};
use super::record::{GateTensorRecord, OperatorKind};
use crate::error::{Result, TensorNetError};

/// `2^num_qubits`, or `None` when it does not fit in a `usize`
pub(crate) fn state_dimension(num_qubits: usize) -> Option<usize> {
    u32::try_from(num_qubits).ok().and_then(|n| 1usize.checked_shl(n))
}

/// Position of an operator in its network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub usize);

/// Ordered collection of gate tensors applied to `|0...0⟩`
#[derive(Debug, Clone)]
pub struct TensorNetState<'a> {
    num_qubits: usize,
    tensor_ops: Vec<GateTensorRecord>,
    arena: &'a TensorArena,
    version: u64,
}

impl<'a> TensorNetState<'a> {
    /// Create an empty network over `num_qubits` qubits.
    pub fn new(arena: &'a TensorArena, num_qubits: usize) -> Self {
        TensorNetState {
            num_qubits,
            tensor_ops: Vec::new(),
            arena,
            version: 0,
        }
    }

    /// Build a network whose contraction yields exactly `amplitudes`.
    ///
    /// The vector becomes the first column of a non-unitary operator acting on
    /// the whole register, so that applying it to `|0...0⟩` reproduces it.
    pub fn from_state_vector(arena: &'a TensorArena, amplitudes: &[Complex64]) -> Result<Self> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(TensorNetError::invalid(format!(
                "state vector length {} is not a power of two of at least one qubit",
                dim
            )));
        }
        let num_qubits = dim.trailing_zeros() as usize;

        let mut preparation = Array2::zeros((dim, dim));
        for (row, amp) in amplitudes.iter().enumerate() {
            preparation[[row, 0]] = *amp;
        }
        let handle = arena.allocate(preparation)?;

        let mut state = Self::new(arena, num_qubits);
        let targets: Vec<usize> = (0..num_qubits).collect();
        state.append_operator(&targets, &[], handle, OperatorKind::NonUnitary, false)?;
        debug!(num_qubits, "reconstructed tensor network from dense vector");
        Ok(state)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn arena(&self) -> &'a TensorArena {
        self.arena
    }

    /// Operators in application order
    pub fn ops(&self) -> &[GateTensorRecord] {
        &self.tensor_ops
    }

    pub fn num_tensors(&self) -> usize {
        self.tensor_ops.len()
    }

    /// Incremented on every append; used to detect stale caches.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Append an operator acting on `targets`, conditioned on `controls`.
    pub fn append_operator(
        &mut self,
        targets: &[usize],
        controls: &[usize],
        data: TensorHandle,
        kind: OperatorKind,
        adjoint: bool,
    ) -> Result<OpId> {
        let record = GateTensorRecord::new(targets.to_vec(), controls.to_vec(), data, kind, adjoint);
        self.push_record(record)
    }

    /// Append an already-built record after validating it against this network.
    pub fn push_record(&mut self, record: GateTensorRecord) -> Result<OpId> {
        self.validate(&record)?;
        self.tensor_ops.push(record);
        self.version += 1;
        Ok(OpId(self.tensor_ops.len() - 1))
    }

    fn validate(&self, record: &GateTensorRecord) -> Result<()> {
        let targets = &record.target_qubit_ids;
        let controls = &record.control_qubit_ids;

        if targets.is_empty() {
            return Err(TensorNetError::invalid("operator must act on at least one qubit"));
        }
        if let Some(q) = record.max_qubit() {
            if q >= self.num_qubits {
                return Err(TensorNetError::invalid(format!(
                    "qubit index {} out of range for {}-qubit network",
                    q, self.num_qubits
                )));
            }
        }
        let mut seen = vec![false; self.num_qubits];
        for &q in targets.iter().chain(controls.iter()) {
            if seen[q] {
                return Err(TensorNetError::invalid(format!(
                    "qubit {} appears more than once among targets and controls",
                    q
                )));
            }
            seen[q] = true;
        }

        let data = self.arena.get(record.data)?;
        let dim = state_dimension(targets.len())
            .ok_or_else(|| TensorNetError::invalid(format!("{} target qubits exceed the tensor size limit", targets.len())))?;
        if data.dim() != (dim, dim) {
            return Err(TensorNetError::invalid(format!(
                "tensor for {} target qubits must be {}x{}, got {}x{}",
                targets.len(),
                dim,
                dim,
                data.nrows(),
                data.ncols()
            )));
        }
        Ok(())
    }
}
