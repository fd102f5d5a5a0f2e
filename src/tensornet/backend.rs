//! Contraction backend
//!
//! The backend turns a tensor network into numbers: either the full state
//! vector or a reduced set of amplitudes with some modes pinned to fixed
//! values (an accessor query). Workspace comes from a caller-supplied
//! `ScratchPool` and is checked against its capacity before any numeric work.

use std::mem::size_of;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::network::{state_dimension, TensorNetState};
use super::record::{GateTensorRecord, OperatorKind};
use super::scratch::ScratchPool;
use crate::error::{Result, TensorNetError};

/// Modes pinned to fixed values for an accessor computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorQuery {
    pub pinned_modes: Vec<usize>,
    pub pinned_values: Vec<u8>,
    /// Hyper samples for the contraction-path finder
    pub hyper_samples: u32,
}

impl AccessorQuery {
    pub fn new(pinned_modes: Vec<usize>, pinned_values: Vec<u8>, hyper_samples: u32) -> Self {
        AccessorQuery {
            pinned_modes,
            pinned_values,
            hyper_samples,
        }
    }

    /// Pin qubit `i` to `values[i]` for every qubit.
    pub fn pin_all(values: &[u8], hyper_samples: u32) -> Self {
        Self::new((0..values.len()).collect(), values.to_vec(), hyper_samples)
    }

    /// Project every qubit onto `|0⟩`.
    pub fn all_zero(num_qubits: usize, hyper_samples: u32) -> Self {
        Self::pin_all(&vec![0; num_qubits], hyper_samples)
    }

    /// No pinned modes: the accessor returns the full vector.
    pub fn unpinned(hyper_samples: u32) -> Self {
        Self::new(Vec::new(), Vec::new(), hyper_samples)
    }
}

/// Output of an accessor computation
#[derive(Debug, Clone)]
pub struct AccessorResult {
    /// Amplitudes over the free modes, little-endian in ascending mode order
    pub amplitudes: Array1<Complex64>,
    /// Squared norm ⟨ψ|ψ⟩ of the contracted network
    pub norm: f64,
}

/// Engine that contracts tensor networks
pub trait ContractionBackend: Send + Sync {
    /// Workspace in bytes the backend needs to contract `network`;
    /// `usize::MAX` when it is not addressable.
    fn workspace_size(&self, network: &TensorNetState<'_>) -> usize;

    /// Contract the whole network into a dense state vector.
    fn materialize_state_vector(
        &self,
        network: &TensorNetState<'_>,
        scratch: &ScratchPool,
    ) -> Result<Array1<Complex64>>;

    /// Contract the network with the query's modes pinned.
    fn compute_accessor(
        &self,
        network: &TensorNetState<'_>,
        query: &AccessorQuery,
        scratch: &ScratchPool,
    ) -> Result<AccessorResult>;
}

/// Reference backend contracting the network into a dense vector held in
/// the scratch pool.
///
/// The workspace is two `2^n` buffers: operators are applied one at a time,
/// reading from one buffer and writing the other with a parallel gather.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseContractionBackend;

impl DenseContractionBackend {
    pub fn new() -> Self {
        DenseContractionBackend
    }

    /// Contract into the scratch pool and hand the final buffer to `read`.
    fn contract<T>(
        &self,
        network: &TensorNetState<'_>,
        scratch: &ScratchPool,
        read: impl FnOnce(&[Complex64]) -> T,
    ) -> Result<T> {
        let workspace = self.workspace_size(network);
        let mut lease = scratch.lease(workspace)?;
        // A granted lease bounds the register size.
        let dim = lease.len() / 2;

        let (front, back) = lease.split_at_mut(dim);
        let (mut current, mut next) = (front, &mut back[..dim]);
        current.iter_mut().for_each(|amp| *amp = Complex64::new(0.0, 0.0));
        current[0] = Complex64::new(1.0, 0.0);

        for (index, op) in network.ops().iter().enumerate() {
            let matrix = effective_matrix(network, op)?;
            trace!(index, targets = ?op.target_qubit_ids, controls = ?op.control_qubit_ids, "applying operator");
            apply_operator(current, next, op, &matrix);
            std::mem::swap(&mut current, &mut next);
        }

        Ok(read(current))
    }
}

impl ContractionBackend for DenseContractionBackend {
    /// Saturates at `usize::MAX` when the register is too large to address.
    fn workspace_size(&self, network: &TensorNetState<'_>) -> usize {
        state_dimension(network.num_qubits())
            .and_then(|dim| dim.checked_mul(2 * size_of::<Complex64>()))
            .unwrap_or(usize::MAX)
    }

    fn materialize_state_vector(
        &self,
        network: &TensorNetState<'_>,
        scratch: &ScratchPool,
    ) -> Result<Array1<Complex64>> {
        debug!(
            num_qubits = network.num_qubits(),
            num_tensors = network.num_tensors(),
            "materializing state vector"
        );
        self.contract(network, scratch, |amps| Array1::from(amps.to_vec()))
    }

    fn compute_accessor(
        &self,
        network: &TensorNetState<'_>,
        query: &AccessorQuery,
        scratch: &ScratchPool,
    ) -> Result<AccessorResult> {
        let num_qubits = network.num_qubits();
        let workspace = self.workspace_size(network);
        debug!(
            num_qubits,
            pinned = query.pinned_modes.len(),
            hyper_samples = query.hyper_samples,
            workspace,
            "prepared accessor plan"
        );
        // Every index below fits in a usize once the workspace does.
        scratch.check(workspace)?;

        let (pinned_mask, pinned_bits) = pinned_pattern(num_qubits, query)?;
        let free_modes: Vec<usize> = (0..num_qubits).filter(|q| pinned_mask & (1 << q) == 0).collect();

        self.contract(network, scratch, |amps| {
            let norm: f64 = amps.par_iter().map(|a| a.norm_sqr()).sum();
            let amplitudes = (0..1usize << free_modes.len())
                .map(|free| {
                    let index = free_modes
                        .iter()
                        .enumerate()
                        .fold(pinned_bits, |acc, (bit, &q)| acc | (((free >> bit) & 1) << q));
                    amps[index]
                })
                .collect::<Array1<Complex64>>();
            AccessorResult { amplitudes, norm }
        })
    }
}

/// Mask of pinned modes and the index bits they are pinned to.
fn pinned_pattern(num_qubits: usize, query: &AccessorQuery) -> Result<(usize, usize)> {
    if query.pinned_modes.len() != query.pinned_values.len() {
        return Err(TensorNetError::invalid(format!(
            "{} pinned modes but {} pinned values",
            query.pinned_modes.len(),
            query.pinned_values.len()
        )));
    }

    let mut mask = 0usize;
    let mut bits = 0usize;
    for (&mode, &value) in query.pinned_modes.iter().zip(query.pinned_values.iter()) {
        if mode >= num_qubits || mode >= usize::BITS as usize {
            return Err(TensorNetError::invalid(format!(
                "pinned mode {} out of range for {}-qubit network",
                mode, num_qubits
            )));
        }
        if value > 1 {
            return Err(TensorNetError::invalid(format!("pinned value {} is not 0 or 1", value)));
        }
        if mask & (1 << mode) != 0 {
            return Err(TensorNetError::invalid(format!("mode {} pinned twice", mode)));
        }
        mask |= 1 << mode;
        bits |= (value as usize) << mode;
    }
    Ok((mask, bits))
}

/// Matrix the backend applies for a record.
///
/// Adjoint unitaries have their legs swapped and conjugated; adjoint
/// non-unitaries are only conjugated.
fn effective_matrix(network: &TensorNetState<'_>, op: &GateTensorRecord) -> Result<Array2<Complex64>> {
    let data = network
        .arena()
        .get(op.data)
        .map_err(|e| TensorNetError::BackendFailure(e.to_string()))?;

    let matrix = match (op.kind, op.is_adjoint) {
        (_, false) => data.as_ref().clone(),
        (OperatorKind::Unitary, true) => data.t().mapv(|z| z.conj()),
        (OperatorKind::NonUnitary, true) => data.mapv(|z| z.conj()),
    };
    Ok(matrix)
}

/// Write `matrix` applied to `src` into `dst`.
fn apply_operator(src: &[Complex64], dst: &mut [Complex64], op: &GateTensorRecord, matrix: &Array2<Complex64>) {
    let targets = &op.target_qubit_ids;
    let target_mask = targets.iter().fold(0usize, |m, &q| m | (1 << q));
    let control_mask = op.control_qubit_ids.iter().fold(0usize, |m, &q| m | (1 << q));

    // Global offset of each local column index
    let offsets: Vec<usize> = (0..1usize << targets.len())
        .map(|local| {
            targets
                .iter()
                .enumerate()
                .fold(0usize, |acc, (bit, &q)| acc | (((local >> bit) & 1) << q))
        })
        .collect();

    dst.par_iter_mut().enumerate().for_each(|(i, out)| {
        if i & control_mask != control_mask {
            *out = src[i];
            return;
        }
        let row = targets
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &q)| acc | (((i >> q) & 1) << bit));
        let base = i & !target_mask;
        *out = offsets
            .iter()
            .enumerate()
            .map(|(col, &offset)| matrix[[row, col]] * src[base | offset])
            .sum();
    });
}
