#![allow(clippy::needless_return)]
use mbgp::{CutoffParameters, SimpleSystem, Vector3D};
use mbgp::environment::structure_environments;
use mbgp::kernels::{Hyperparameters, Kernel, KernelOrder};
use mbgp::systems::UnitCell;

use criterion::{BenchmarkGroup, Criterion, measurement::WallTime, SamplingMode};
use criterion::{criterion_group, criterion_main};

fn lattice(n: usize, spacing: f64, phase: f64) -> SimpleSystem {
    let length = n as f64 * spacing;
    let mut system = SimpleSystem::new(UnitCell::cubic(length).expect("invalid cell"));
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let index = (i * n + j) * n + k;
                let shift = 0.05 * spacing * f64::sin(index as f64 + phase);
                let position = Vector3D::new(
                    i as f64 * spacing + shift,
                    j as f64 * spacing - shift,
                    k as f64 * spacing + 0.5 * shift,
                );
                let species = if (i + j + k) % 2 == 0 { 11 } else { 17 };
                system.add_atom(species, position);
            }
        }
    }
    return system;
}

const ALL_ORDERS: [KernelOrder; 4] = [
    KernelOrder::TwoBody,
    KernelOrder::ThreeBody,
    KernelOrder::ManyBody,
    KernelOrder::ManyBodyTriplet,
];

fn run_kernels(mut group: BenchmarkGroup<WallTime>, names: &[&str], test_mode: bool) {
    let n = if test_mode { 3 } else { 4 };
    let cutoffs = CutoffParameters::uniform(&[3.5, 2.5, 2.5, 2.0]).expect("invalid cutoffs");
    let environments_1 = structure_environments(&lattice(n, 1.4, 0.0), &cutoffs).expect("failed to build environments");
    let environments_2 = structure_environments(&lattice(n, 1.4, 0.3), &cutoffs).expect("failed to build environments");

    let hyperparameters = Hyperparameters::from_vector(
        &ALL_ORDERS, &[1.0, 0.5, 0.8, 0.6, 0.5, 0.4, 0.3, 0.7]
    ).expect("invalid hyperparameters");

    for name in names {
        let kernel = Kernel::from_name(name, hyperparameters.clone()).expect("invalid kernel");
        let (env1, env2) = (&environments_1[0], &environments_2[0]);
        group.bench_function(*name, |b| b.iter(|| {
            kernel.evaluate(env1, env2, 0, 1).expect("failed to evaluate kernel")
        }));
    }

    let kernel = Kernel::from_name("2+3", hyperparameters).expect("invalid kernel");
    let n_pairs = environments_1.len() * environments_2.len();
    group.bench_function("2+3 force/force matrix (per pair)", |b| b.iter_custom(|repeat| {
        let start = std::time::Instant::now();
        for _ in 0..repeat {
            kernel.force_force_matrix(&environments_1, &environments_2);
        }
        start.elapsed() / n_pairs as u32
    }));
}

fn kernels(c: &mut Criterion) {
    let test_mode = std::env::args().any(|arg| arg == "--test");

    let mut group = c.benchmark_group("Kernels");
    group.noise_threshold(0.05);
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);

    run_kernels(group, &["2", "2_grad", "3", "3_grad", "3_force_en", "mb", "mb_grad", "2+3+mb_en"], test_mode);
}

criterion_group!(all, kernels);
criterion_main!(all);
