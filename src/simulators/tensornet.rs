//! Tensor-network simulation state
//!
//! Wraps one `TensorNetState` together with a lazily filled dense-vector
//! cache. Small registers answer amplitude queries from the cached vector;
//! larger ones ask the contraction backend for a single pinned amplitude so
//! the `2^n` vector is never formed.

use std::fmt;
use std::io::Write;

use ndarray::Array1;
use num_complex::Complex64;
use rand::Rng;
use tracing::{debug, info, warn};

use super::state::{Precision, SampleResult, SimulationState, StateData, StateRepresentation, TensorView};
use super::statevector::basis_index;
use crate::config::{SharedRng, SimulationConfig};
use crate::error::{Result, TensorNetError};
use crate::tensornet::network::state_dimension;
use crate::tensornet::{
    AccessorQuery, ArenaScope, ContractionBackend, ScratchPool, TensorArena, TensorNetState,
};

/// Dense vector contracted from a specific network version
#[derive(Debug, Clone)]
struct CachedStateVector {
    version: u64,
    amplitudes: Array1<Complex64>,
}

/// Simulation state backed by a tensor network
pub struct TensorNetSimulationState<'a> {
    state: Option<TensorNetState<'a>>,
    num_qubits: usize,
    contracted_state: Option<CachedStateVector>,
    scratch: &'a ScratchPool,
    backend: &'a dyn ContractionBackend,
    rng: &'a SharedRng,
    config: SimulationConfig,
}

impl fmt::Debug for TensorNetSimulationState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorNetSimulationState")
            .field("num_qubits", &self.num_qubits)
            .field("num_tensors", &self.num_tensors())
            .field("cached", &self.contracted_state.is_some())
            .field("released", &self.is_released())
            .finish()
    }
}

impl<'a> TensorNetSimulationState<'a> {
    /// Take ownership of a network; scratch pool, backend and random source are borrowed.
    pub fn new(
        state: TensorNetState<'a>,
        scratch: &'a ScratchPool,
        backend: &'a dyn ContractionBackend,
        rng: &'a SharedRng,
        config: SimulationConfig,
    ) -> Self {
        TensorNetSimulationState {
            num_qubits: state.num_qubits(),
            state: Some(state),
            contracted_state: None,
            scratch,
            backend,
            rng,
            config,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn representation(&self) -> StateRepresentation {
        StateRepresentation::TensorNetwork
    }

    pub fn precision(&self) -> Precision {
        Precision::Fp64
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    /// The owned network
    pub fn network(&self) -> Result<&TensorNetState<'a>> {
        self.state.as_ref().ok_or(TensorNetError::Released)
    }

    /// Mutable access for appending operators. Appends bump the network
    /// version, which invalidates the cached state vector.
    pub fn network_mut(&mut self) -> Result<&mut TensorNetState<'a>> {
        self.state.as_mut().ok_or(TensorNetError::Released)
    }

    fn cached_vector(&self) -> Option<&Array1<Complex64>> {
        let version = self.state.as_ref()?.version();
        self.contracted_state
            .as_ref()
            .filter(|cache| cache.version == version)
            .map(|cache| &cache.amplitudes)
    }

    /// Contract the full state vector once per network version.
    fn ensure_state_vector(&mut self) -> Result<&Array1<Complex64>> {
        let network = self.state.as_ref().ok_or(TensorNetError::Released)?;
        let version = network.version();
        let stale = self.contracted_state.as_ref().map_or(true, |c| c.version != version);
        if stale {
            debug!(num_qubits = self.num_qubits, version, "caching contracted state vector");
            let amplitudes = self.backend.materialize_state_vector(network, self.scratch)?;
            self.contracted_state = Some(CachedStateVector { version, amplitudes });
        }
        match &self.contracted_state {
            Some(cache) => Ok(&cache.amplitudes),
            None => Err(TensorNetError::BackendFailure("state vector cache is empty".to_string())),
        }
    }

    /// Amplitude ⟨basis_state|ψ⟩ for one bit per qubit, qubit 0 first.
    pub fn get_amplitude(&mut self, basis_state: &[u8]) -> Result<Complex64> {
        let index = basis_index(basis_state, self.num_qubits)?;

        if self.num_qubits <= self.config.max_qubits_for_state_contraction {
            let amplitudes = self.ensure_state_vector()?;
            return Ok(amplitudes[index]);
        }

        debug!(num_qubits = self.num_qubits, "computing single amplitude through accessor");
        let network = self.network()?;
        let query = AccessorQuery::pin_all(basis_state, self.config.hyper_samples);
        let result = self.backend.compute_accessor(network, &query, self.scratch)?;
        result
            .amplitudes
            .first()
            .copied()
            .ok_or_else(|| TensorNetError::BackendFailure("accessor returned no amplitude".to_string()))
    }

    /// Amplitudes for several basis states
    pub fn get_amplitudes(&mut self, basis_states: &[Vec<u8>]) -> Result<Vec<Complex64>> {
        basis_states.iter().map(|b| self.get_amplitude(b)).collect()
    }

    /// `|⟨other|ψ⟩|` for another network-based state
    pub fn overlap(&self, other: &SimulationState<'_>) -> Result<f64> {
        match other.as_tensor_net() {
            Some(other) => self.overlap_with(other),
            None => Err(TensorNetError::UnsupportedType(other.representation())),
        }
    }

    /// `|⟨other|ψ⟩|` by contracting this network followed by the conjugated
    /// other network, projected onto `|0...0⟩`.
    pub fn overlap_with(&self, other: &TensorNetSimulationState<'_>) -> Result<f64> {
        let ket = self.network()?;
        let bra = other.network()?;
        if ket.num_qubits() == 0 || bra.num_qubits() == 0 {
            return Err(TensorNetError::invalid("cannot compute overlap of a zero-qubit state"));
        }

        // Declared before the joined network so staged tensors outlive it.
        let mut scope = ArenaScope::new(ket.arena());
        let num_qubits = ket.num_qubits().max(bra.num_qubits());
        let mut joined = TensorNetState::new(ket.arena(), num_qubits);

        for op in ket.ops() {
            joined.push_record(op.clone())?;
        }
        // Conjugating a chain of operators reverses its order.
        for op in bra.ops().iter().rev() {
            let bra_op = op.to_bra_side(bra.arena(), &mut scope)?;
            joined.push_record(bra_op)?;
        }

        debug!(
            num_qubits,
            ket_ops = ket.num_tensors(),
            bra_ops = bra.num_tensors(),
            staged = scope.staged_count(),
            "computing overlap"
        );

        let query = AccessorQuery::all_zero(num_qubits, self.config.hyper_samples);
        let result = self.backend.compute_accessor(&joined, &query, self.scratch)?;
        let overlap = result
            .amplitudes
            .first()
            .copied()
            .ok_or_else(|| TensorNetError::BackendFailure("accessor returned no amplitude".to_string()))?;

        debug!(norm = result.norm, overlap = overlap.norm(), "overlap computed");
        Ok(overlap.norm())
    }

    /// Squared norm ⟨ψ|ψ⟩ of the network
    pub fn norm(&self) -> Result<f64> {
        let query = AccessorQuery::unpinned(self.config.hyper_samples);
        Ok(self.backend.compute_accessor(self.network()?, &query, self.scratch)?.norm)
    }

    /// Build a new state whose network reproduces `data`.
    ///
    /// Only dense vectors are accepted. The new state shares this state's
    /// arena, scratch pool, backend and random source but has its own cache.
    pub fn create_from_state_data(&self, data: StateData<'_>) -> Result<TensorNetSimulationState<'a>> {
        let amplitudes = match data {
            StateData::Dense(amplitudes) => amplitudes,
            StateData::Factored(_) => {
                return Err(TensorNetError::UnsupportedFormat(format!(
                    "cannot create a tensor-network state from {}",
                    data.format_name()
                )))
            }
        };

        let arena: &'a TensorArena = self.network()?.arena();
        let network = TensorNetState::from_state_vector(arena, amplitudes)?;
        Ok(TensorNetSimulationState::new(
            network,
            self.scratch,
            self.backend,
            self.rng,
            self.config.clone(),
        ))
    }

    pub fn num_tensors(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.num_tensors())
    }

    /// View of the tensor applied at position `index`
    pub fn get_tensor(&self, index: usize) -> Result<TensorView> {
        let network = self.network()?;
        let op = network.ops().get(index).ok_or(TensorNetError::OutOfRange {
            index,
            count: network.num_tensors(),
        })?;
        Ok(TensorView {
            handle: op.data,
            data: network.arena().get(op.data)?,
            extents: vec![2; op.rank()],
            precision: self.precision(),
        })
    }

    /// Views of every applied tensor, in application order
    pub fn get_tensors(&self) -> Result<Vec<TensorView>> {
        let count = self.network()?.num_tensors();
        (0..count).map(|i| self.get_tensor(i)).collect()
    }

    /// Copy a freshly contracted state vector into `out`.
    ///
    /// Does not read or fill the amplitude cache.
    pub fn to_host(&self, out: &mut [Complex64]) -> Result<()> {
        let network = self.network()?;
        let expected = state_dimension(self.num_qubits).ok_or(TensorNetError::ResourceExhausted {
            required: usize::MAX,
            available: self.scratch.capacity(),
        })?;
        if out.len() != expected {
            return Err(TensorNetError::DimensionMismatch {
                expected,
                actual: out.len(),
            });
        }

        let amplitudes = self.backend.materialize_state_vector(network, self.scratch)?;
        out.iter_mut().zip(amplitudes.iter()).for_each(|(dst, src)| *dst = *src);
        Ok(())
    }

    /// Write one amplitude per line, reusing the cache when it is current.
    ///
    /// After `destroy_state` only a previously cached vector can be dumped.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        let fresh;
        let amplitudes = match self.cached_state_vector() {
            Some(cached) => cached,
            None => {
                fresh = self.backend.materialize_state_vector(self.network()?, self.scratch)?;
                &fresh
            }
        };
        for amp in amplitudes.iter() {
            writeln!(out, "{}", amp)?;
        }
        Ok(())
    }

    /// Draw `shots` basis states from the contracted state vector.
    pub fn sample(&mut self, shots: usize) -> Result<SampleResult> {
        if shots == 0 {
            return Err(TensorNetError::invalid("number of shots must be positive"));
        }
        if self.num_qubits > self.config.max_qubits_for_state_contraction {
            warn!(
                num_qubits = self.num_qubits,
                max = self.config.max_qubits_for_state_contraction,
                "sampling materializes the full state vector"
            );
        }

        let num_qubits = self.num_qubits;
        let rng = self.rng;
        let amplitudes = self.ensure_state_vector()?;

        let cumulative: Vec<f64> = amplitudes
            .iter()
            .scan(0.0, |total, amp| {
                *total += amp.norm_sqr();
                Some(*total)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return Err(TensorNetError::invalid("cannot sample from a zero-norm state"));
        }

        let mut result = SampleResult::new();
        let mut rng = rng.lock();
        for _ in 0..shots {
            let draw = rng.gen::<f64>() * total;
            let index = cumulative
                .partition_point(|&p| p <= draw)
                .min(cumulative.len() - 1);
            let bits: String = (0..num_qubits)
                .map(|q| if (index >> q) & 1 == 1 { '1' } else { '0' })
                .collect();
            result.record(bits);
        }
        Ok(result)
    }

    /// Release the owned network early. The cached vector, if any, stays readable.
    pub fn destroy_state(&mut self) {
        if self.state.take().is_some() {
            info!(num_qubits = self.num_qubits, "released tensor network state");
        }
    }

    /// State vector cached by amplitude queries, if current
    pub fn cached_state_vector(&self) -> Option<&Array1<Complex64>> {
        match (&self.state, &self.contracted_state) {
            (Some(_), _) => self.cached_vector(),
            (None, Some(cache)) => Some(&cache.amplitudes),
            (None, None) => None,
        }
    }
}
