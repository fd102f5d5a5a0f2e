//! Simulation configuration
//!
//! Knobs that steer how the simulation state answers queries: the qubit count
//! up to which full state vectors are materialized, the contraction-path
//! hyper-sampling budget and the scratch pool size.

use std::env;
use std::str::FromStr;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TensorNetError};
use crate::tensornet::ScratchPool;

/// Shared pseudo-random source, borrowed by every state built from one host.
pub type SharedRng = Mutex<StdRng>;

pub const ENV_MAX_QUBITS_FOR_STATE_CONTRACTION: &str = "TENSORNET_MAX_QUBITS_FOR_STATE_CONTRACTION";
pub const ENV_HYPER_SAMPLES: &str = "TENSORNET_HYPER_SAMPLES";
pub const ENV_SCRATCH_SIZE: &str = "TENSORNET_SCRATCH_SIZE";
pub const ENV_RANDOM_SEED: &str = "TENSORNET_RANDOM_SEED";

/// Configuration for tensor-network simulation states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Largest qubit count for which amplitude queries contract the full state vector.
    pub max_qubits_for_state_contraction: usize,
    /// Hyper samples used by the contraction-path finder for accessor queries.
    pub hyper_samples: u32,
    /// Scratch pool capacity in bytes.
    pub scratch_size_bytes: usize,
    /// Seed for the shared random source (entropy when absent).
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_qubits_for_state_contraction: 30,
            hyper_samples: 8,
            scratch_size_bytes: 256 * 1024 * 1024,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default configuration with overrides taken from the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = read_env(ENV_MAX_QUBITS_FOR_STATE_CONTRACTION)? {
            config.max_qubits_for_state_contraction = v;
        }
        if let Some(v) = read_env(ENV_HYPER_SAMPLES)? {
            config.hyper_samples = v;
        }
        if let Some(v) = read_env(ENV_SCRATCH_SIZE)? {
            config.scratch_size_bytes = v;
        }
        if let Some(v) = read_env(ENV_RANDOM_SEED)? {
            config.seed = Some(v);
        }
        Ok(config)
    }

    pub fn with_max_qubits_for_state_contraction(mut self, max_qubits: usize) -> Self {
        self.max_qubits_for_state_contraction = max_qubits;
        self
    }

    pub fn with_scratch_size(mut self, bytes: usize) -> Self {
        self.scratch_size_bytes = bytes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Allocate a scratch pool of the configured capacity.
    pub fn scratch_pool(&self) -> ScratchPool {
        ScratchPool::new(self.scratch_size_bytes)
    }

    /// Build the shared random source, seeded when a seed is configured.
    pub fn shared_rng(&self) -> SharedRng {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Mutex::new(rng)
    }
}

fn read_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| TensorNetError::invalid(format!("cannot parse {}={:?}", key, raw))),
        Err(_) => Ok(None),
    }
}
