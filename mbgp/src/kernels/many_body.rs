//! Many-body kernels, comparing the coordination descriptors of the central
//! atoms and of their neighbors.
//!
//! The force kernels only contain the terms where both descriptors depend on
//! the position of the corresponding central atom: the descriptors of the
//! central atoms themselves, and the descriptors of neighbors counting the
//! species of the central atom.
use std::cmp::Ordering;

use crate::{AtomicEnvironment, StackVec};
use crate::environment::MAX_SPECIES;

use super::OrderKernel;

/// Positions of the species present in two sorted lists of species
type CommonSpecies = StackVec<(usize, usize), MAX_SPECIES>;

fn common_species(first: &[i32], second: &[i32]) -> CommonSpecies {
    let mut common = CommonSpecies::new();
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        match first[i].cmp(&second[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                common.push((i, j));
                i += 1;
                j += 1;
            }
        }
    }
    return common;
}

/// Call `accumulate(group, q1, q2, gradients)` for all pairs of two-species
/// descriptors entering the force/force kernel, where `gradients` is the
/// product of the gradients of `q1` and `q2`.
fn pair_terms<F>(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize, mut accumulate: F)
    where F: FnMut(usize, f64, f64, f64)
{
    let (Some(mb1), Some(mb2)) = (env1.many_body(), env2.many_body()) else {
        return;
    };

    let (c1, c2) = (env1.species(), env2.species());
    let (q1, q2) = (mb1.values(), mb2.values());
    let (g1, g2) = (mb1.gradients(), mb2.gradients());
    let (nq1, nq2) = (mb1.neighbor_values(), mb2.neighbor_values());
    let (ng1, ng2) = (mb1.neighbor_gradients(), mb2.neighbor_gradients());

    if c1 == c2 {
        for &(s1, s2) in common_species(mb1.species(), mb2.species()).iter() {
            let group = kernel.pair(c1, mb1.species()[s1]);
            accumulate(group, q1[s1], q2[s2], g1[[s1, d1]] * g2[[s2, d2]]);
        }
    }

    // neighbors of the first atom with the same species as the second
    // central atom
    if let (Some(s1), Some(s2)) = (mb1.species_index(c1), mb2.species_index(c1)) {
        let group = kernel.pair(c2, c1);
        for (n, bond) in mb1.bonds().iter().enumerate() {
            if bond.species == c2 {
                accumulate(group, nq1[[n, s1]], q2[s2], ng1[[n, d1]] * g2[[s2, d2]]);
            }
        }
    }

    if let (Some(s1), Some(s2)) = (mb1.species_index(c2), mb2.species_index(c2)) {
        let group = kernel.pair(c1, c2);
        for (m, bond) in mb2.bonds().iter().enumerate() {
            if bond.species == c1 {
                accumulate(group, q1[s1], nq2[[m, s2]], g1[[s1, d1]] * ng2[[m, d2]]);
            }
        }
    }

    if c1 == c2 {
        if let (Some(s1), Some(s2)) = (mb1.species_index(c1), mb2.species_index(c2)) {
            for (n, bond_1) in mb1.bonds().iter().enumerate() {
                let group = kernel.pair(bond_1.species, c1);
                for (m, bond_2) in mb2.bonds().iter().enumerate() {
                    if bond_1.species == bond_2.species {
                        accumulate(group, nq1[[n, s1]], nq2[[m, s2]], ng1[[n, d1]] * ng2[[m, d2]]);
                    }
                }
            }
        }
    }
}

pub(super) fn force_force(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
    let mut result = 0.0;
    pair_terms(kernel, env1, env2, d1, d2, |group, q1, q2, gradients| {
        result += kernel.function(group).descriptor_double_derivative(q1, q2) * gradients;
    });
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
    let mut values = vec![0.0; kernel.n_groups()];
    let mut length_scale = vec![0.0; kernel.n_groups()];
    pair_terms(kernel, env1, env2, d1, d2, |group, q1, q2, gradients| {
        let (value, value_gradient) = kernel.function(group).descriptor_double_derivative_with_gradient(q1, q2);
        values[group] += value * gradients;
        length_scale[group] += value_gradient * gradients;
    });

    kernel.fill_gradient(&values, &length_scale, gradient);
    return values.iter().sum();
}

pub(super) fn force_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
    let (Some(mb1), Some(mb2)) = (env1.many_body(), env2.many_body()) else {
        return 0.0;
    };

    let (c1, c2) = (env1.species(), env2.species());
    let (q1, q2) = (mb1.values(), mb2.values());

    let mut result = 0.0;
    // energy of the central atom
    if c1 == c2 {
        for &(s1, s2) in common_species(mb1.species(), mb2.species()).iter() {
            let function = kernel.function(kernel.pair(c1, mb1.species()[s1]));
            result -= function.descriptor_derivative(q1[s1], q2[s2]) * mb1.gradients()[[s1, d1]];
        }
    }

    // energy of the neighbors
    if let (Some(s1), Some(s2)) = (mb1.species_index(c1), mb2.species_index(c1)) {
        let function = kernel.function(kernel.pair(c2, c1));
        for (n, bond) in mb1.bonds().iter().enumerate() {
            if bond.species == c2 {
                let value = mb1.neighbor_values()[[n, s1]];
                result -= function.descriptor_derivative(value, q2[s2]) * mb1.neighbor_gradients()[[n, d1]];
            }
        }
    }

    return result;
}

pub(super) fn energy_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
    let (Some(mb1), Some(mb2)) = (env1.many_body(), env2.many_body()) else {
        return 0.0;
    };

    let c1 = env1.species();
    if c1 != env2.species() {
        return 0.0;
    }

    let mut result = 0.0;
    for &(s1, s2) in common_species(mb1.species(), mb2.species()).iter() {
        let function = kernel.function(kernel.pair(c1, mb1.species()[s1]));
        result += function.descriptor_value(mb1.values()[s1], mb2.values()[s2]);
    }
    return result;
}

/// Call `accumulate(q1, q2, gradients)` for all pairs of three-species
/// descriptors entering the force/force kernel.
///
/// Descriptors are symmetric in the two species, so only the `(si, sj)`
/// entries with `si <= sj` are compared.
fn triplet_terms<F>(env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize, mut accumulate: F)
    where F: FnMut(f64, f64, f64)
{
    let (Some(mb1), Some(mb2)) = (env1.many_body_triplet(), env2.many_body_triplet()) else {
        return;
    };

    let (c1, c2) = (env1.species(), env2.species());
    let (q1, q2) = (mb1.values(), mb2.values());
    let (g1, g2) = (mb1.gradients(), mb2.gradients());
    let (nq1, nq2) = (mb1.neighbor_values(), mb2.neighbor_values());
    let (ng1, ng2) = (mb1.neighbor_gradients(), mb2.neighbor_gradients());

    let common = common_species(mb1.species(), mb2.species());

    if c1 == c2 {
        for (i, &(si1, si2)) in common.iter().enumerate() {
            for &(sj1, sj2) in &common[i..] {
                accumulate(q1[[si1, sj1]], q2[[si2, sj2]], g1[[si1, sj1, d1]] * g2[[si2, sj2, d2]]);
            }
        }
    }

    // neighbors of the first atom with the same species as the second
    // central atom, for the pairs made of the first central species and
    // any other species
    if let (Some(c11), Some(c12)) = (mb1.species_index(c1), mb2.species_index(c1)) {
        for (n, bond) in mb1.bonds().iter().enumerate() {
            if bond.species != c2 {
                continue;
            }

            for &(s1, s2) in common.iter() {
                accumulate(nq1[[n, c11, s1]], q2[[c12, s2]], ng1[[n, s1, d1]] * g2[[c12, s2, d2]]);
            }
        }
    }

    if let (Some(c21), Some(c22)) = (mb1.species_index(c2), mb2.species_index(c2)) {
        for (m, bond) in mb2.bonds().iter().enumerate() {
            if bond.species != c1 {
                continue;
            }

            for &(s1, s2) in common.iter() {
                accumulate(q1[[c21, s1]], nq2[[m, c22, s2]], g1[[c21, s1, d1]] * ng2[[m, s2, d2]]);
            }
        }
    }

    // neighbors of both atoms. If the central species differ, the only
    // descriptor depending on both central atoms is the one for the pair of
    // central species.
    let indexes = (
        mb1.species_index(c1),
        mb1.species_index(c2),
        mb2.species_index(c1),
        mb2.species_index(c2),
    );
    if let (Some(c11), Some(c21), Some(c12), Some(c22)) = indexes {
        for (n, bond_1) in mb1.bonds().iter().enumerate() {
            for (m, bond_2) in mb2.bonds().iter().enumerate() {
                if bond_1.species != bond_2.species {
                    continue;
                }

                if c1 == c2 {
                    for &(s1, s2) in common.iter() {
                        accumulate(nq1[[n, c11, s1]], nq2[[m, c22, s2]], ng1[[n, s1, d1]] * ng2[[m, s2, d2]]);
                    }
                } else {
                    accumulate(nq1[[n, c11, c21]], nq2[[m, c22, c12]], ng1[[n, c21, d1]] * ng2[[m, c12, d2]]);
                }
            }
        }
    }
}

pub(super) fn triplet_force_force(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
    let function = kernel.function(0);
    let mut result = 0.0;
    triplet_terms(env1, env2, d1, d2, |q1, q2, gradients| {
        result += function.descriptor_double_derivative(q1, q2) * gradients;
    });
    return result;
}

pub(super) fn triplet_force_force_gradient(
    kernel: &OrderKernel,
    env1: &AtomicEnvironment,
    env2: &AtomicEnvironment,
    d1: usize,
    d2: usize,
    gradient: &mut [f64],
) -> f64 {
    let function = kernel.function(0);
    let mut value = 0.0;
    let mut length_scale = 0.0;
    triplet_terms(env1, env2, d1, d2, |q1, q2, gradients| {
        let (kernel, kernel_gradient) = function.descriptor_double_derivative_with_gradient(q1, q2);
        value += kernel * gradients;
        length_scale += kernel_gradient * gradients;
    });

    kernel.fill_gradient(&[value], &[length_scale], gradient);
    return value;
}

pub(super) fn triplet_force_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
    let (Some(mb1), Some(mb2)) = (env1.many_body_triplet(), env2.many_body_triplet()) else {
        return 0.0;
    };

    let function = kernel.function(0);
    let (c1, c2) = (env1.species(), env2.species());
    let (q1, q2) = (mb1.values(), mb2.values());
    let common = common_species(mb1.species(), mb2.species());

    let mut result = 0.0;
    if let (Some(c11), Some(c12)) = (mb1.species_index(c1), mb2.species_index(c1)) {
        for (n, bond) in mb1.bonds().iter().enumerate() {
            if bond.species != c2 {
                continue;
            }

            for &(s1, s2) in common.iter() {
                let value = mb1.neighbor_values()[[n, c11, s1]];
                result -= function.descriptor_derivative(value, q2[[c12, s2]]) * mb1.neighbor_gradients()[[n, s1, d1]];
            }
        }
    }

    if c1 == c2 {
        for (i, &(si1, si2)) in common.iter().enumerate() {
            for &(sj1, sj2) in &common[i..] {
                let derivative = function.descriptor_derivative(q1[[si1, sj1]], q2[[si2, sj2]]);
                result -= derivative * mb1.gradients()[[si1, sj1, d1]];
            }
        }
    }

    return result;
}

pub(super) fn triplet_energy_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
    let (Some(mb1), Some(mb2)) = (env1.many_body_triplet(), env2.many_body_triplet()) else {
        return 0.0;
    };

    if env1.species() != env2.species() {
        return 0.0;
    }

    let function = kernel.function(0);
    let common = common_species(mb1.species(), mb2.species());

    let mut result = 0.0;
    for (i, &(si1, si2)) in common.iter().enumerate() {
        for &(sj1, sj2) in &common[i..] {
            result += function.descriptor_value(mb1.values()[[si1, sj1]], mb2.values()[[si2, sj2]]);
        }
    }
    return result;
}
