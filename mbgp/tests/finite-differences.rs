//! Check the force kernels against finite differences of the energy kernels
use approx::assert_relative_eq;

use mbgp::kernels::{Hyperparameters, Kernel, KernelOrder, OutputMode};

mod data;

const DELTA: f64 = 1e-5;

fn kernel(order: KernelOrder) -> Kernel {
    let hyperparameters = Hyperparameters::from_vector(&[order], &[1.3, 0.6]).unwrap();
    return Kernel::new(&[order], OutputMode::ForceForce, hyperparameters).unwrap();
}

/// For the 2-body and 3-body kernels, each bond (resp. triangle) is shared
/// between 2 (resp. 3) local energies, and only the environment of the
/// displaced atom needs to be updated.
fn check_local_kernel(order: KernelOrder, shared: f64) {
    let kernel = kernel(order);
    let cutoffs = data::cutoffs();
    let system_1 = data::periodic_system();
    let system_2 = data::rattled_system();

    let atom_1 = 1;
    let env1 = data::environment(&system_1, atom_1, &cutoffs);
    for atom_2 in [0, 3] {
        let env2 = data::environment(&system_2, atom_2, &cutoffs);

        for d1 in 0..3 {
            let numeric = data::finite_difference(DELTA, |delta| {
                let displaced = data::displaced(&system_1, atom_1, d1, delta);
                let env1 = data::environment(&displaced, atom_1, &cutoffs);
                kernel.energy_energy(&env1, &env2)
            });

            let force_energy = kernel.force_energy(&env1, &env2, d1);
            assert_relative_eq!(force_energy, -shared * numeric, epsilon = 1e-8, max_relative = 1e-5);

            for d2 in 0..3 {
                let numeric = data::finite_difference(DELTA, |delta| {
                    let displaced = data::displaced(&system_2, atom_2, d2, delta);
                    let env2 = data::environment(&displaced, atom_2, &cutoffs);
                    kernel.force_energy(&env1, &env2, d1)
                });

                let force_force = kernel.force_force(&env1, &env2, d1, d2);
                assert_relative_eq!(force_force, -shared * numeric, epsilon = 1e-8, max_relative = 1e-5);
            }
        }
    }
}

#[test]
fn two_body() {
    check_local_kernel(KernelOrder::TwoBody, 2.0);
}

#[test]
fn three_body() {
    check_local_kernel(KernelOrder::ThreeBody, 3.0);
}

/// For the many-body kernels, moving an atom changes the descriptors of all
/// its neighbors, so the energy kernels are summed over all the atoms in the
/// displaced system.
fn check_many_body_kernel(order: KernelOrder) {
    let kernel = kernel(order);
    let cutoffs = data::cutoffs();
    let system_1 = data::periodic_system();
    let system_2 = data::rattled_system();

    let (atom_1, atom_2) = (1, 3);
    let env1 = data::environment(&system_1, atom_1, &cutoffs);
    let env2 = data::environment(&system_2, atom_2, &cutoffs);

    for d1 in 0..3 {
        let numeric = data::finite_difference(DELTA, |delta| {
            let displaced = data::displaced(&system_1, atom_1, d1, delta);
            data::all_environments(&displaced, &cutoffs).iter()
                .map(|environment| kernel.energy_energy(environment, &env2))
                .sum()
        });

        let force_energy = kernel.force_energy(&env1, &env2, d1);
        assert_relative_eq!(force_energy, -numeric, epsilon = 1e-8, max_relative = 1e-5);

        for d2 in 0..3 {
            let numeric = data::finite_difference(DELTA, |delta| {
                let displaced = data::displaced(&system_2, atom_2, d2, delta);
                data::all_environments(&displaced, &cutoffs).iter()
                    .map(|environment| kernel.force_energy(&env1, environment, d1))
                    .sum()
            });

            let force_force = kernel.force_force(&env1, &env2, d1, d2);
            assert_relative_eq!(force_force, -numeric, epsilon = 1e-8, max_relative = 1e-5);
        }
    }
}

#[test]
fn many_body() {
    check_many_body_kernel(KernelOrder::ManyBody);
}

#[test]
fn many_body_triplet() {
    check_many_body_kernel(KernelOrder::ManyBodyTriplet);
}
