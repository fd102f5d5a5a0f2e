use ndarray::{array, Array2};
use num_complex::Complex64;

use tensornet_state::quantum::gate::constants;
use tensornet_state::quantum::gate::*;
use tensornet_state::quantum::{CircuitBuilder, Outcome};
use tensornet_state::tensornet::{OperatorKind, TensorArena, TensorNetState};
use tensornet_state::TensorNetError;

fn max_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    (a - b).iter().map(|z| z.norm()).fold(0.0, f64::max)
}

fn identity(dim: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(dim, constants::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_gate_algebraic_identities() {
        let h = StandardGate::H.matrix();
        let x = StandardGate::X.matrix();
        let z = StandardGate::Z.matrix();

        // H-X-H = Z
        assert!(max_diff(&h.dot(&x).dot(&h), &z) < 1e-10, "H-X-H = Z identity failed");
        // H-Z-H = X
        assert!(max_diff(&h.dot(&z).dot(&h), &x) < 1e-10, "H-Z-H = X identity failed");
        // S·S = Z, T·T = S
        let s = StandardGate::S.matrix();
        let t = StandardGate::T.matrix();
        assert!(max_diff(&s.dot(&s), &z) < 1e-10);
        assert!(max_diff(&t.dot(&t), &s) < 1e-10);

        let swap = StandardGate::SWAP.matrix();
        assert!(max_diff(&swap.dot(&swap), &identity(4)) < 1e-10, "SWAP-SWAP cancellation failed");
    }

    #[test]
    fn test_rotation_gate_algebra() {
        let rx1 = ParametrizedGate::Rx(PI / 4.0).matrix();
        let rx_combined = ParametrizedGate::Rx(PI / 2.0).matrix();
        assert!(max_diff(&rx1.dot(&rx1), &rx_combined) < 1e-10, "Rotation combination failed");

        let rz = ParametrizedGate::Rz(PI / 3.0).matrix();
        let rz_inv = ParametrizedGate::Rz(-PI / 3.0).matrix();
        assert!(max_diff(&rz.dot(&rz_inv), &identity(2)) < 1e-10, "Rotation cancellation failed");

        // Phase(π/2) is S
        assert!(max_diff(&ParametrizedGate::Phase(PI / 2.0).matrix(), &StandardGate::S.matrix()) < 1e-10);
    }

    #[test]
    fn test_standard_gates_are_unitary() {
        let gates: Vec<Box<dyn QuantumGate>> = vec![
            Box::new(StandardGate::X),
            Box::new(StandardGate::Y),
            Box::new(StandardGate::Z),
            Box::new(StandardGate::H),
            Box::new(StandardGate::S),
            Box::new(StandardGate::T),
            Box::new(StandardGate::SWAP),
            Box::new(ParametrizedGate::Rx(0.3)),
            Box::new(ParametrizedGate::Ry(1.7)),
            Box::new(ParametrizedGate::Rz(-2.1)),
            Box::new(ParametrizedGate::Phase(0.5)),
        ];

        for gate in &gates {
            let m = gate.matrix();
            assert!(gate.is_unitary(), "{} should be unitary", gate.name());
            assert!(is_unitary_matrix(&m), "{} matrix is not unitary", gate.name());
            assert_eq!(m.nrows(), 1 << gate.qubit_count());
            let product = gate.adjoint_matrix().dot(&m);
            assert!(max_diff(&product, &identity(m.nrows())) < 1e-10);
        }
    }

    #[test]
    fn test_projectors_are_not_unitary() {
        let p0 = Projector(Outcome::Zero);
        let p1 = Projector(Outcome::One);
        assert!(!p0.is_unitary());
        assert!(!is_unitary_matrix(&p0.matrix()));

        // Complementary idempotent projectors
        let sum = &p0.matrix() + &p1.matrix();
        assert!(max_diff(&sum, &identity(2)) < 1e-12);
        assert!(max_diff(&p1.matrix().dot(&p1.matrix()), &p1.matrix()) < 1e-12);
    }

    #[test]
    fn test_custom_matrix_gate_validation() {
        let one = constants::ONE;
        let zero = constants::ZERO;

        let cnot = CustomMatrixGate::new(
            "cnot",
            array![
                [one, zero, zero, zero],
                [zero, one, zero, zero],
                [zero, zero, zero, one],
                [zero, zero, one, zero]
            ],
        )
        .unwrap();
        assert_eq!(cnot.qubit_count(), 2);
        assert!(cnot.is_unitary());

        let lowering = CustomMatrixGate::new("lower", array![[zero, one], [zero, zero]]).unwrap();
        assert!(!lowering.is_unitary());

        let bad = CustomMatrixGate::new("bad", Array2::zeros((3, 3)));
        assert!(matches!(bad, Err(TensorNetError::InvalidArgument(_))));
        let bad = CustomMatrixGate::new("bad", Array2::zeros((2, 4)));
        assert!(bad.is_err());
    }

    #[test]
    fn test_builder_records_gate_kinds() {
        let arena = TensorArena::new();
        let mut network = TensorNetState::new(&arena, 3);
        {
            let mut builder = CircuitBuilder::new(&mut network);
            builder.h(0).unwrap();
            builder.tdg(1).unwrap();
            builder.cz(0, 2).unwrap();
            builder.project(1, Outcome::One).unwrap();
        }

        let ops = network.ops();
        assert_eq!(ops.len(), 4);
        assert_eq!(arena.live_count(), 4);
        assert!(!ops[0].is_adjoint);
        assert!(ops[1].is_adjoint);
        assert_eq!(ops[2].target_qubit_ids, vec![2]);
        assert_eq!(ops[2].control_qubit_ids, vec![0]);
        assert_eq!(ops[3].kind, OperatorKind::NonUnitary);
        assert_eq!(network.version(), 4);
    }

    #[test]
    fn test_builder_failure_releases_tensor() {
        let arena = TensorArena::new();
        let mut network = TensorNetState::new(&arena, 2);
        let mut builder = CircuitBuilder::new(&mut network);

        assert!(builder.cnot(0, 0).is_err());
        assert!(builder.swap(0, 2).is_err());
        assert!(builder.add_gate(&StandardGate::SWAP, &[0], &[]).is_err());
        assert_eq!(arena.live_count(), 0);
        assert_eq!(network.num_tensors(), 0);
    }

    #[test]
    fn test_ghz_builder() {
        let arena = TensorArena::new();
        let mut network = TensorNetState::new(&arena, 4);
        CircuitBuilder::new(&mut network).ghz().unwrap();
        assert_eq!(network.num_tensors(), 4);
        assert!(network.ops()[1..].iter().all(|op| op.control_qubit_ids.len() == 1));
    }
}
