//! 3-body kernel, comparing all triplets between two environments under the
//! permutations of atoms that preserve species.
use crate::AtomicEnvironment;

use super::OrderKernel;

/// A triplet made of the central atom and two neighbors, described by its
/// three sides: `[center-first, center-second, first-second]`
struct Triplet {
    /// species of `[center, first, second]`
    species: [i32; 3],
    distances: [f64; 3],
    /// direction of each side along the gradient axis, zero for the side
    /// not touching the central atom
    directions: [f64; 3],
    /// product of the envelopes of the three sides
    value: f64,
    /// gradient of `value` with respect to the central atom position
    derivative: f64,
}

fn triplets(environment: &AtomicEnvironment, d: Option<usize>) -> Vec<Triplet> {
    let cutoffs = environment.cutoffs();
    let function = &cutoffs.cutoff_function;
    let center = environment.species();
    let bonds = environment.bonds().bonds();

    environment.triplets().iter().map(|(m, cross_bond)| {
        let first = &bonds[m];
        let second = &bonds[cross_bond.index];

        let direction_1 = d.map_or(0.0, |d| first.direction[d]);
        let direction_2 = d.map_or(0.0, |d| second.direction[d]);

        let (f1, fd1) = function.with_central_gradient(
            first.distance, cutoffs.three_body_radius(center, first.species), direction_1
        );
        let (f2, fd2) = function.with_central_gradient(
            second.distance, cutoffs.three_body_radius(center, second.species), direction_2
        );
        let f3 = function.compute(
            cross_bond.distance, cutoffs.three_body_radius(first.species, second.species)
        );

        Triplet {
            species: [center, first.species, second.species],
            distances: [first.distance, second.distance, cross_bond.distance],
            directions: [direction_1, direction_2, 0.0],
            value: f1 * f2 * f3,
            derivative: fd1 * f2 * f3 + f1 * fd2 * f3,
        }
    }).collect()
}

/// All permutations of the atoms `[center, first, second]` of a triplet,
/// together with the corresponding permutation of the sides
/// `[center-first, center-second, first-second]`
static PERMUTATIONS: [([usize; 3], [usize; 3]); 6] = [
    ([0, 1, 2], [0, 1, 2]),
    ([0, 2, 1], [1, 0, 2]),
    ([1, 2, 0], [2, 0, 1]),
    ([1, 0, 2], [0, 2, 1]),
    ([2, 1, 0], [2, 1, 0]),
    ([2, 0, 1], [1, 2, 0]),
];

/// Iterate over the permutations of sides mapping `first` onto `second`
/// while preserving the species of all atoms
#[inline]
fn matching_sides<'a>(first: &'a Triplet, second: &'a Triplet) -> impl Iterator<Item = &'static [usize; 3]> + 'a {
    PERMUTATIONS.iter()
        .filter(move |(atoms, _)| (0..3).all(|k| first.species[k] == second.species[atoms[k]]))
        .map(|(_, sides)| sides)
}

/// Geometric products entering the derivative terms, see
/// `SquaredExponential::terms`
#[inline]
fn geometry(first: &Triplet, second: &Triplet, sides: &[usize; 3]) -> (f64, f64, f64, f64) {
    let (mut a, mut b, mut c, mut d) = (0.0, 0.0, 0.0, 0.0);
    for (side, &other) in sides.iter().enumerate() {
        let c1 = first.directions[side];
        let c2 = second.directions[other];
        let r = first.distances[side] - second.distances[other];

        a += c1 * c2;
        b += r * c1;
        c += r * c2;
        d += r * r;
    }
    return (a, b, c, d);
}

fn group(kernel: &OrderKernel, triplet: &Triplet) -> usize {
    kernel.triplet(triplet.species[0], triplet.species[1], triplet.species[2])
}

pub(super) fn force_force(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
    let triplets_1 = triplets(env1, Some(d1));
    let triplets_2 = triplets(env2, Some(d2));

    let mut result = 0.0;
    for triplet_1 in &triplets_1 {
        let function = kernel.function(group(kernel, triplet_1));
        for triplet_2 in &triplets_2 {
            for sides in matching_sides(triplet_1, triplet_2) {
                let (a, b, c, d) = geometry(triplet_1, triplet_2, sides);
                let terms = function.terms(a, b, c, d);
                result += function.signal2() * terms.force_force(
                    triplet_1.value, triplet_1.derivative, triplet_2.value, triplet_2.derivative
                );
            }
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
    let triplets_1 = triplets(env1, Some(d1));
    let triplets_2 = triplets(env2, Some(d2));

    let mut values = vec![0.0; kernel.n_groups()];
    let mut length_scale = vec![0.0; kernel.n_groups()];
    for triplet_1 in &triplets_1 {
        let group = group(kernel, triplet_1);
        let function = kernel.function(group);
        for triplet_2 in &triplets_2 {
            for sides in matching_sides(triplet_1, triplet_2) {
                let (a, b, c, d) = geometry(triplet_1, triplet_2, sides);
                let (terms, terms_gradient) = function.terms_with_gradient(a, b, c, d);

                let (fi, fdi) = (triplet_1.value, triplet_1.derivative);
                let (fj, fdj) = (triplet_2.value, triplet_2.derivative);
                values[group] += function.signal2() * terms.force_force(fi, fdi, fj, fdj);
                length_scale[group] += function.signal2() * terms_gradient.force_force(fi, fdi, fj, fdj);
            }
        }
    }

    kernel.fill_gradient(&values, &length_scale, gradient);
    return values.iter().sum();
}

pub(super) fn force_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
    let triplets_1 = triplets(env1, Some(d1));
    let triplets_2 = triplets(env2, None);

    let mut result = 0.0;
    for triplet_1 in &triplets_1 {
        let function = kernel.function(group(kernel, triplet_1));
        for triplet_2 in &triplets_2 {
            for sides in matching_sides(triplet_1, triplet_2) {
                let (_, b, _, d) = geometry(triplet_1, triplet_2, sides);
                let terms = function.terms(0.0, b, 0.0, d);
                result -= function.signal2() * terms.force_energy(
                    triplet_1.value, triplet_1.derivative, triplet_2.value
                );
            }
        }
    }

    // each triplet is shared between three local energies
    return result / 3.0;
}

pub(super) fn energy_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
    let triplets_1 = triplets(env1, None);
    let triplets_2 = triplets(env2, None);

    let mut result = 0.0;
    for triplet_1 in &triplets_1 {
        let function = kernel.function(group(kernel, triplet_1));
        for triplet_2 in &triplets_2 {
            for sides in matching_sides(triplet_1, triplet_2) {
                let (_, _, _, d) = geometry(triplet_1, triplet_2, sides);
                result += function.signal2() * function.exponential(d) * triplet_1.value * triplet_2.value;
            }
        }
    }

    return result / 9.0;
}
