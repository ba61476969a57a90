#![allow(dead_code)]

use mbgp::{AtomicEnvironment, CutoffParameters, SimpleSystem, Vector3D};
use mbgp::environment::structure_environments;

const CELL: [[f64; 3]; 3] = [[4.2, 0.0, 0.0], [0.0, 4.5, 0.0], [0.0, 0.0, 4.8]];

const SPECIES: [i32; 7] = [1, 2, 1, 2, 1, 2, 1];

const POSITIONS: [[f64; 3]; 7] = [
    [0.10, 0.20, 0.30],
    [1.25, 0.45, 0.95],
    [0.70, 1.55, 0.40],
    [2.30, 1.20, 1.60],
    [1.60, 2.40, 1.30],
    [3.40, 2.90, 2.80],
    [2.60, 3.70, 3.60],
];

/// Small periodic system with two species, where all atoms have a few
/// neighbors within the default cutoffs
pub fn periodic_system() -> SimpleSystem {
    SimpleSystem::from_arrays(CELL, &POSITIONS, &SPECIES).expect("invalid system")
}

/// Same as `periodic_system`, with all the atoms slightly moved
pub fn rattled_system() -> SimpleSystem {
    let mut system = periodic_system();
    for (i, position) in system.positions_mut().iter_mut().enumerate() {
        let i = i as f64;
        *position += Vector3D::new(
            0.08 * f64::sin(1.3 * i),
            0.06 * f64::cos(0.7 * i),
            -0.07 * f64::sin(2.1 * i + 0.4),
        );
    }
    return system;
}

/// Copy of `system` with atom `atom` moved by `delta` along `spatial`
pub fn displaced(system: &SimpleSystem, atom: usize, spatial: usize, delta: f64) -> SimpleSystem {
    let mut system = system.clone();
    system.positions_mut()[atom][spatial] += delta;
    return system;
}

/// Uniform cutoffs for all four orders
pub fn cutoffs() -> CutoffParameters {
    CutoffParameters::uniform(&[2.4, 1.8, 1.8, 1.5]).expect("invalid cutoffs")
}

pub fn environment(system: &SimpleSystem, center: usize, cutoffs: &CutoffParameters) -> AtomicEnvironment {
    AtomicEnvironment::new(system, center, cutoffs).expect("failed to build environment")
}

pub fn all_environments(system: &SimpleSystem, cutoffs: &CutoffParameters) -> Vec<AtomicEnvironment> {
    structure_environments(system, cutoffs).expect("failed to build environments")
}

/// Central finite difference of `function` around 0
pub fn finite_difference<F>(delta: f64, function: F) -> f64 where F: Fn(f64) -> f64 {
    (function(delta) - function(-delta)) / (2.0 * delta)
}
