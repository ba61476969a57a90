//! 2-body kernel, comparing all pairs of bonds between two environments with
//! matching species.
use crate::AtomicEnvironment;

use super::OrderKernel;

/// A bond to the central atom, with the envelope function and its gradient
/// with respect to the central atom position
struct PairLeg {
    species: i32,
    distance: f64,
    direction: f64,
    value: f64,
    derivative: f64,
}

/// Get the legs of all bonds in `environment`. The gradient is taken along
/// the cartesian axis `d`, or set to zero if `d` is `None`.
fn legs(environment: &AtomicEnvironment, d: Option<usize>) -> Vec<PairLeg> {
    let cutoffs = environment.cutoffs();
    let center = environment.species();

    environment.bonds().iter().map(|bond| {
        let radius = cutoffs.two_body_radius(center, bond.species);
        let direction = d.map_or(0.0, |d| bond.direction[d]);
        let (value, derivative) = cutoffs.cutoff_function.with_central_gradient(
            bond.distance, radius, direction
        );

        PairLeg {
            species: bond.species,
            distance: bond.distance,
            direction,
            value,
            derivative,
        }
    }).collect()
}

/// Two bonds can be compared if they join the same pair of species
#[inline]
fn bonds_match(center_1: i32, neighbor_1: i32, center_2: i32, neighbor_2: i32) -> bool {
    (center_1 == center_2 && neighbor_1 == neighbor_2) || (center_1 == neighbor_2 && center_2 == neighbor_1)
}

pub(super) fn force_force(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
    let legs_1 = legs(env1, Some(d1));
    let legs_2 = legs(env2, Some(d2));
    let (c1, c2) = (env1.species(), env2.species());

    let mut result = 0.0;
    for leg_1 in &legs_1 {
        let function = kernel.function(kernel.pair(c1, leg_1.species));
        for leg_2 in &legs_2 {
            if !bonds_match(c1, leg_1.species, c2, leg_2.species) {
                continue;
            }

            let r = leg_1.distance - leg_2.distance;
            let terms = function.terms(
                leg_1.direction * leg_2.direction,
                r * leg_1.direction,
                r * leg_2.direction,
                r * r,
            );
            result += function.signal2() * terms.force_force(
                leg_1.value, leg_1.derivative, leg_2.value, leg_2.derivative
            );
        }
    }

    return result;
}

pub(super) fn force_force_gradient(
    kernel: &OrderKernel,
    env1: &AtomicEnvironment,
    env2: &AtomicEnvironment,
    d1: usize,
    d2: usize,
    gradient: &mut [f64],
) -> f64 {
    let legs_1 = legs(env1, Some(d1));
    let legs_2 = legs(env2, Some(d2));
    let (c1, c2) = (env1.species(), env2.species());

    let mut values = vec![0.0; kernel.n_groups()];
    let mut length_scale = vec![0.0; kernel.n_groups()];
    for leg_1 in &legs_1 {
        let group = kernel.pair(c1, leg_1.species);
        let function = kernel.function(group);
        for leg_2 in &legs_2 {
            if !bonds_match(c1, leg_1.species, c2, leg_2.species) {
                continue;
            }

            let r = leg_1.distance - leg_2.distance;
            let (terms, terms_gradient) = function.terms_with_gradient(
                leg_1.direction * leg_2.direction,
                r * leg_1.direction,
                r * leg_2.direction,
                r * r,
            );

            let envelopes = (leg_1.value, leg_1.derivative, leg_2.value, leg_2.derivative);
            values[group] += function.signal2() * terms.force_force(envelopes.0, envelopes.1, envelopes.2, envelopes.3);
            length_scale[group] += function.signal2() * terms_gradient.force_force(envelopes.0, envelopes.1, envelopes.2, envelopes.3);
        }
    }

    kernel.fill_gradient(&values, &length_scale, gradient);
    return values.iter().sum();
}

pub(super) fn force_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
    let legs_1 = legs(env1, Some(d1));
    let legs_2 = legs(env2, None);
    let (c1, c2) = (env1.species(), env2.species());

    let mut result = 0.0;
    for leg_1 in &legs_1 {
        let function = kernel.function(kernel.pair(c1, leg_1.species));
        for leg_2 in &legs_2 {
            if !bonds_match(c1, leg_1.species, c2, leg_2.species) {
                continue;
            }

            let r = leg_1.distance - leg_2.distance;
            let terms = function.terms(0.0, r * leg_1.direction, 0.0, r * r);
            result -= function.signal2() * terms.force_energy(leg_1.value, leg_1.derivative, leg_2.value);
        }
    }

    // each bond is shared between two local energies
    return result / 2.0;
}

pub(super) fn energy_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
    let legs_1 = legs(env1, None);
    let legs_2 = legs(env2, None);
    let (c1, c2) = (env1.species(), env2.species());

    let mut result = 0.0;
    for leg_1 in &legs_1 {
        let function = kernel.function(kernel.pair(c1, leg_1.species));
        for leg_2 in &legs_2 {
            if !bonds_match(c1, leg_1.species, c2, leg_2.species) {
                continue;
            }

            let r = leg_1.distance - leg_2.distance;
            result += function.signal2() * function.exponential(r * r) * leg_1.value * leg_2.value;
        }
    }

    return result / 4.0;
}
