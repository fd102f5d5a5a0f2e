// src/quantum/gate.rs
//! Quantum gates
//!
//! Gate matrices handed to the tensor arena by the circuit builder. A
//! `k`-qubit gate is a `2^k × 2^k` matrix (row = output, column = input) whose
//! local index bit `b` belongs to the `b`-th target qubit.

use std::fmt::Debug;

use ndarray::{array, Array2};
use num_complex::Complex64;

use super::state::Outcome;
use crate::error::{Result, TensorNetError};

/// Common complex numbers used in quantum gates
pub mod constants {
    use num_complex::Complex64;

    /// The imaginary unit i
    pub const I: Complex64 = Complex64::new(0.0, 1.0);

    pub const ONE: Complex64 = Complex64::new(1.0, 0.0);

    pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);

    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
}

/// Trait for quantum gates
pub trait QuantumGate: Debug + Send + Sync {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;

    /// Whether the matrix is unitary
    fn is_unitary(&self) -> bool {
        true
    }

    /// Conjugate transpose of the matrix
    fn adjoint_matrix(&self) -> Array2<Complex64> {
        self.matrix().t().mapv(|z| z.conj())
    }
}

/// Fixed single- and two-qubit gates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardGate {
    /// Pauli-X gate (NOT gate)
    X,

    /// Pauli-Y gate
    Y,

    /// Pauli-Z gate
    Z,

    /// Hadamard gate
    H,

    /// Phase gate (S gate)
    S,

    /// π/8 gate (T gate)
    T,

    /// SWAP gate
    SWAP,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::SWAP => 2,
            _ => 1,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        match self {
            StandardGate::X => array![[ZERO, ONE], [ONE, ZERO]],
            StandardGate::Y => array![[ZERO, -I], [I, ZERO]],
            StandardGate::Z => array![[ONE, ZERO], [ZERO, -ONE]],
            StandardGate::H => {
                let factor = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![[factor, factor], [factor, -factor]]
            }
            StandardGate::S => array![[ONE, ZERO], [ZERO, I]],
            StandardGate::T => array![
                [ONE, ZERO],
                [ZERO, Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]
            ],
            StandardGate::SWAP => array![
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ZERO, ONE, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE]
            ],
        }
    }

    fn name(&self) -> String {
        match self {
            StandardGate::X => "X",
            StandardGate::Y => "Y",
            StandardGate::Z => "Z",
            StandardGate::H => "H",
            StandardGate::S => "S",
            StandardGate::T => "T",
            StandardGate::SWAP => "SWAP",
        }
        .to_string()
    }
}

/// Parametrized quantum gates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),

    /// Rotation around Y-axis
    Ry(f64),

    /// Rotation around Z-axis
    Rz(f64),

    /// Phase shift diag(1, e^{iθ})
    Phase(f64),
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        1
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        match *self {
            ParametrizedGate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new(0.0, -(theta / 2.0).sin());
                array![[cos, sin], [sin, cos]]
            }
            ParametrizedGate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                array![[cos, -sin], [sin, cos]]
            }
            ParametrizedGate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, theta / 2.0)]
            ],
            ParametrizedGate::Phase(theta) => array![[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]],
        }
    }

    fn name(&self) -> String {
        match self {
            ParametrizedGate::Rx(theta) => format!("Rx({:.4})", theta),
            ParametrizedGate::Ry(theta) => format!("Ry({:.4})", theta),
            ParametrizedGate::Rz(theta) => format!("Rz({:.4})", theta),
            ParametrizedGate::Phase(theta) => format!("Phase({:.4})", theta),
        }
    }
}

/// Projector onto a computational basis outcome, `|o⟩⟨o|`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projector(pub Outcome);

impl QuantumGate for Projector {
    fn qubit_count(&self) -> usize {
        1
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        match self.0 {
            Outcome::Zero => array![[ONE, ZERO], [ZERO, ZERO]],
            Outcome::One => array![[ZERO, ZERO], [ZERO, ONE]],
        }
    }

    fn name(&self) -> String {
        format!("P{}", self.0)
    }

    fn is_unitary(&self) -> bool {
        false
    }
}

/// A generic gate defined by its matrix
#[derive(Debug, Clone)]
pub struct CustomMatrixGate {
    pub matrix: Array2<Complex64>,
    pub name: String,
    pub qubits: usize,
    pub unitary: bool,
}

impl CustomMatrixGate {
    /// Wrap a matrix, checking that it is square with a power-of-two size.
    pub fn new(name: impl Into<String>, matrix: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || !rows.is_power_of_two() || rows < 2 {
            return Err(TensorNetError::invalid(format!(
                "gate matrix must be 2^k x 2^k, got {}x{}",
                rows, cols
            )));
        }
        let unitary = is_unitary_matrix(&matrix);
        Ok(CustomMatrixGate {
            qubits: rows.trailing_zeros() as usize,
            matrix,
            name: name.into(),
            unitary,
        })
    }
}

impl QuantumGate for CustomMatrixGate {
    fn qubit_count(&self) -> usize {
        self.qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        self.matrix.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_unitary(&self) -> bool {
        self.unitary
    }
}

/// Check U†U = I within 1e-10
pub fn is_unitary_matrix(matrix: &Array2<Complex64>) -> bool {
    let adjoint = matrix.t().mapv(|z| z.conj());
    let product = adjoint.dot(matrix);
    product.indexed_iter().all(|((i, j), z)| {
        let expected = if i == j { 1.0 } else { 0.0 };
        (z.re - expected).abs() < 1e-10 && z.im.abs() < 1e-10
    })
}
