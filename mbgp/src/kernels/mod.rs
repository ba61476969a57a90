//! Covariance kernels between atomic environments, for Gaussian process
//! regression of forces and energies.
//!
//! Each kernel is a sum over one or more [`KernelOrder`], and can be
//! evaluated in four [`OutputMode`]: between two force components, its
//! gradient with respect to the hyperparameters, between a force component
//! and a local energy, or between two local energies.
use log::info;
use ndarray::{Array2, Zip};

use crate::{AtomicEnvironment, Error};

mod hyperparameters;
pub use self::hyperparameters::{Hyperparameters, OrderHyperparameters};
pub(crate) use self::hyperparameters::OrderKernel;

mod two_body;
mod three_body;
mod many_body;

mod registry;
pub use self::registry::{lookup_kernel, kernel_names};

/// The different terms a kernel can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
pub enum KernelOrder {
    /// Compare pairs of bonds with the central atom
    TwoBody,
    /// Compare triangles made of the central atom and two neighbors
    ThreeBody,
    /// Compare the coordination numbers of the central atom and its
    /// neighbors, for each species
    ManyBody,
    /// Compare the number of triangles around the central atom and its
    /// neighbors, for each pair of species
    ManyBodyTriplet,
}

impl KernelOrder {
    /// Human readable name of this order, used in error messages
    pub fn name(self) -> &'static str {
        match self {
            KernelOrder::TwoBody => "2-body",
            KernelOrder::ThreeBody => "3-body",
            KernelOrder::ManyBody => "many-body",
            KernelOrder::ManyBodyTriplet => "many-body triplet",
        }
    }
}

/// What a kernel computes when comparing two environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
pub enum OutputMode {
    /// Covariance between force components of the two central atoms
    ForceForce,
    /// Force/force covariance and its gradient with respect to all the
    /// hyperparameters
    Gradient,
    /// Covariance between a force component of the first central atom and
    /// the local energy of the second one
    ForceEnergy,
    /// Covariance between the local energies of the two central atoms
    EnergyEnergy,
}

/// Result of [`Kernel::evaluate`]
#[derive(Debug, Clone, PartialEq)]
pub enum KernelOutput {
    Value(f64),
    /// Kernel value and gradient with respect to the hyperparameters, in the
    /// layout of [`Kernel::force_force_gradient`]
    Gradient(f64, Vec<f64>),
}

impl KernelOutput {
    /// Get the kernel value, ignoring the gradient if any
    pub fn value(&self) -> f64 {
        match *self {
            KernelOutput::Value(value) | KernelOutput::Gradient(value, _) => value,
        }
    }
}

/// A kernel combining one or more orders, with a given set of
/// hyperparameters
#[derive(Debug, Clone)]
pub struct Kernel {
    orders: Vec<KernelOrder>,
    mode: OutputMode,
    hyperparameters: Hyperparameters,
    prepared: Vec<OrderKernel>,
}

impl Kernel {
    /// Create a new kernel summing over `orders` and computing `mode`.
    ///
    /// The orders are always evaluated (and their gradients reported) in the
    /// order of the [`KernelOrder`] enum, regardless of the order they are
    /// given in.
    pub fn new(orders: &[KernelOrder], mode: OutputMode, hyperparameters: Hyperparameters) -> Result<Kernel, Error> {
        let mut orders = orders.to_vec();
        orders.sort_unstable();
        orders.dedup();

        if orders.is_empty() {
            return Err(Error::InvalidParameter(
                "a kernel needs at least one order".into()
            ));
        }

        hyperparameters.validate(&orders)?;
        let prepared = orders.iter()
            .map(|&order| OrderKernel::new(order, &hyperparameters))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Kernel {
            orders,
            mode,
            hyperparameters,
            prepared,
        });
    }

    /// Create the kernel registered under `name` (see [`kernel_names`])
    pub fn from_name(name: &str, hyperparameters: Hyperparameters) -> Result<Kernel, Error> {
        let (orders, mode) = lookup_kernel(name)?;
        info!("creating '{}' kernel: {:?} with {:?}", name, mode, orders);
        return Kernel::new(orders, mode, hyperparameters);
    }

    /// Create the kernel registered under `name`, with hyperparameters given
    /// in JSON format
    pub fn from_json(name: &str, hyperparameters: &str) -> Result<Kernel, Error> {
        let (orders, _) = lookup_kernel(name)?;
        let hyperparameters = Hyperparameters::from_json(hyperparameters, orders)?;
        return Kernel::from_name(name, hyperparameters);
    }

    /// Orders included in this kernel, sorted
    pub fn orders(&self) -> &[KernelOrder] {
        &self.orders
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Size of the gradient with respect to the hyperparameters
    pub fn n_gradients(&self) -> usize {
        self.prepared.iter().map(|kernel| kernel.n_gradients()).sum()
    }

    /// Covariance between the force along `d1` on the central atom of `env1`
    /// and the force along `d2` on the central atom of `env2`.
    ///
    /// Orders without the corresponding data in the environments (for
    /// example many-body descriptors) do not contribute.
    pub fn force_force(&self, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
        assert!(d1 < 3 && d2 < 3, "cartesian directions must be 0, 1 or 2");
        self.prepared.iter()
            .map(|kernel| order_force_force(kernel, env1, env2, d1, d2))
            .sum()
    }

    /// Same as [`Kernel::force_force`], also computing the gradient with
    /// respect to the hyperparameters. For each order, the gradient contains
    /// the derivatives with respect to the signal variances of all groups,
    /// followed by the derivatives with respect to the length scales.
    pub fn force_force_gradient(&self, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> (f64, Vec<f64>) {
        assert!(d1 < 3 && d2 < 3, "cartesian directions must be 0, 1 or 2");

        let mut gradient = vec![0.0; self.n_gradients()];
        let mut value = 0.0;
        let mut start = 0;
        for kernel in &self.prepared {
            let stop = start + kernel.n_gradients();
            value += order_force_force_gradient(kernel, env1, env2, d1, d2, &mut gradient[start..stop]);
            start = stop;
        }

        return (value, gradient);
    }

    /// Covariance between the force along `d1` on the central atom of `env1`
    /// and the local energy of the central atom of `env2`
    pub fn force_energy(&self, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
        assert!(d1 < 3, "cartesian directions must be 0, 1 or 2");
        self.prepared.iter()
            .map(|kernel| order_force_energy(kernel, env1, env2, d1))
            .sum()
    }

    /// Covariance between the local energies of the central atoms of `env1`
    /// and `env2`
    pub fn energy_energy(&self, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
        self.prepared.iter()
            .map(|kernel| order_energy_energy(kernel, env1, env2))
            .sum()
    }

    /// Evaluate this kernel in its output mode, checking that the
    /// environments contain everything the kernel needs. `d2` is ignored
    /// for force/energy kernels, and both directions for energy/energy
    /// kernels.
    #[time_graph::instrument(name = "Kernel::evaluate")]
    pub fn evaluate(&self, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> Result<KernelOutput, Error> {
        match self.mode {
            OutputMode::ForceForce | OutputMode::Gradient => {
                check_direction(d1)?;
                check_direction(d2)?;
            }
            OutputMode::ForceEnergy => check_direction(d1)?,
            OutputMode::EnergyEnergy => {}
        }

        for &order in &self.orders {
            check_environment(order, env1)?;
            check_environment(order, env2)?;
        }

        let output = match self.mode {
            OutputMode::ForceForce => KernelOutput::Value(self.force_force(env1, env2, d1, d2)),
            OutputMode::Gradient => {
                let (value, gradient) = self.force_force_gradient(env1, env2, d1, d2);
                KernelOutput::Gradient(value, gradient)
            }
            OutputMode::ForceEnergy => KernelOutput::Value(self.force_energy(env1, env2, d1)),
            OutputMode::EnergyEnergy => KernelOutput::Value(self.energy_energy(env1, env2)),
        };

        return Ok(output);
    }

    /// Force/force covariance between all the environments in `first` and
    /// all the environments in `second`. Rows (and columns) are ordered by
    /// environment, then by cartesian direction.
    #[time_graph::instrument(name = "Kernel::force_force_matrix")]
    pub fn force_force_matrix(&self, first: &[AtomicEnvironment], second: &[AtomicEnvironment]) -> Array2<f64> {
        let mut matrix = Array2::zeros((3 * first.len(), 3 * second.len()));
        Zip::indexed(&mut matrix).par_for_each(|(i, j), value| {
            *value = self.force_force(&first[i / 3], &second[j / 3], i % 3, j % 3);
        });
        return matrix;
    }
}

fn check_direction(d: usize) -> Result<(), Error> {
    if d >= 3 {
        return Err(Error::InvalidParameter(format!(
            "cartesian direction must be 0, 1 or 2, got {}", d
        )));
    }
    return Ok(());
}

fn check_environment(order: KernelOrder, environment: &AtomicEnvironment) -> Result<(), Error> {
    let cutoffs = environment.cutoffs();
    let available = match order {
        KernelOrder::TwoBody => cutoffs.two_body.is_active(),
        KernelOrder::ThreeBody => cutoffs.three_body.is_active(),
        KernelOrder::ManyBody => environment.many_body().is_some(),
        KernelOrder::ManyBodyTriplet => environment.many_body_triplet().is_some(),
    };

    if !available {
        return Err(Error::InvalidParameter(format!(
            "the environment of atom {} was created without a {} cutoff",
            environment.center(), order.name()
        )));
    }
    return Ok(());
}

fn order_force_force(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize, d2: usize) -> f64 {
    match kernel.order() {
        KernelOrder::TwoBody => two_body::force_force(kernel, env1, env2, d1, d2),
        KernelOrder::ThreeBody => three_body::force_force(kernel, env1, env2, d1, d2),
        KernelOrder::ManyBody => many_body::force_force(kernel, env1, env2, d1, d2),
        KernelOrder::ManyBodyTriplet => many_body::triplet_force_force(kernel, env1, env2, d1, d2),
    }
}

fn order_force_force_gradient(
    kernel: &OrderKernel,
    env1: &AtomicEnvironment,
    env2: &AtomicEnvironment,
    d1: usize,
    d2: usize,
    gradient: &mut [f64],
) -> f64 {
    match kernel.order() {
        KernelOrder::TwoBody => two_body::force_force_gradient(kernel, env1, env2, d1, d2, gradient),
        KernelOrder::ThreeBody => three_body::force_force_gradient(kernel, env1, env2, d1, d2, gradient),
        KernelOrder::ManyBody => many_body::force_force_gradient(kernel, env1, env2, d1, d2, gradient),
        KernelOrder::ManyBodyTriplet => many_body::triplet_force_force_gradient(kernel, env1, env2, d1, d2, gradient),
    }
}

fn order_force_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment, d1: usize) -> f64 {
    match kernel.order() {
        KernelOrder::TwoBody => two_body::force_energy(kernel, env1, env2, d1),
        KernelOrder::ThreeBody => three_body::force_energy(kernel, env1, env2, d1),
        KernelOrder::ManyBody => many_body::force_energy(kernel, env1, env2, d1),
        KernelOrder::ManyBodyTriplet => many_body::triplet_force_energy(kernel, env1, env2, d1),
    }
}

fn order_energy_energy(kernel: &OrderKernel, env1: &AtomicEnvironment, env2: &AtomicEnvironment) -> f64 {
    match kernel.order() {
        KernelOrder::TwoBody => two_body::energy_energy(kernel, env1, env2),
        KernelOrder::ThreeBody => three_body::energy_energy(kernel, env1, env2),
        KernelOrder::ManyBody => many_body::energy_energy(kernel, env1, env2),
        KernelOrder::ManyBodyTriplet => many_body::triplet_energy_energy(kernel, env1, env2),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::systems::test_utils::test_system;
    use crate::CutoffParameters;

    use super::*;

    fn environments(radii: &[f64]) -> Vec<AtomicEnvironment> {
        let system = test_system("cluster");
        let cutoffs = CutoffParameters::uniform(radii).unwrap();
        return crate::environment::structure_environments(&system, &cutoffs).unwrap();
    }

    #[test]
    fn create() {
        let hyperparameters = Hyperparameters::from_vector(
            &[KernelOrder::TwoBody, KernelOrder::ThreeBody], &[1.0, 0.5, 2.0, 0.7]
        ).unwrap();

        let kernel = Kernel::new(
            &[KernelOrder::ThreeBody, KernelOrder::TwoBody, KernelOrder::TwoBody],
            OutputMode::Gradient,
            hyperparameters.clone(),
        ).unwrap();
        assert_eq!(kernel.orders(), [KernelOrder::TwoBody, KernelOrder::ThreeBody]);
        assert_eq!(kernel.mode(), OutputMode::Gradient);
        assert_eq!(kernel.n_gradients(), 4);

        let error = Kernel::new(&[], OutputMode::ForceForce, hyperparameters.clone()).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: a kernel needs at least one order");

        let error = Kernel::new(&[KernelOrder::ManyBody], OutputMode::ForceForce, hyperparameters).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: missing many-body hyperparameters");

        let kernel = Kernel::from_json("2+3_en", r#"{
            "two_body": {"signal": [1.0], "length_scale": [0.5]},
            "three_body": {"signal": [2.0], "length_scale": [0.7]}
        }"#).unwrap();
        assert_eq!(kernel.mode(), OutputMode::EnergyEnergy);
        assert_eq!(kernel.orders(), [KernelOrder::TwoBody, KernelOrder::ThreeBody]);

        let error = Kernel::from_json("2+4", "{}").unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: unknown kernel with name '2+4'");
    }

    #[test]
    fn sum_of_orders() {
        let environments = environments(&[3.0, 2.0, 1.5, 1.5]);
        let (env1, env2) = (&environments[0], &environments[3]);

        let all = [KernelOrder::TwoBody, KernelOrder::ThreeBody, KernelOrder::ManyBody, KernelOrder::ManyBodyTriplet];
        let values = [0.8, 0.6, 1.2, 0.5, 0.4, 0.9, 1.1, 0.7];
        let hyperparameters = Hyperparameters::from_vector(&all, &values).unwrap();

        let kernel = Kernel::new(&all, OutputMode::Gradient, hyperparameters.clone()).unwrap();
        let (value, gradient) = kernel.force_force_gradient(env1, env2, 0, 2);
        assert_eq!(gradient.len(), 8);
        assert_relative_eq!(value, kernel.force_force(env1, env2, 0, 2), max_relative = 1e-12);

        let mut sum = 0.0;
        for (i, &order) in all.iter().enumerate() {
            let single = Hyperparameters::from_vector(&[order], &values[2 * i..2 * i + 2]).unwrap();
            let single = Kernel::new(&[order], OutputMode::Gradient, single).unwrap();

            let (single_value, single_gradient) = single.force_force_gradient(env1, env2, 0, 2);
            assert_relative_eq!(gradient[2 * i], single_gradient[0], max_relative = 1e-12);
            assert_relative_eq!(gradient[2 * i + 1], single_gradient[1], max_relative = 1e-12);
            sum += single_value;

            assert_relative_eq!(
                single.energy_energy(env1, env2),
                single.energy_energy(env2, env1),
                max_relative = 1e-12
            );
        }
        assert_relative_eq!(value, sum, max_relative = 1e-12);
    }

    #[test]
    fn evaluate() {
        let environments = environments(&[3.0, 2.0]);
        let (env1, env2) = (&environments[1], &environments[2]);

        let hyperparameters = Hyperparameters::from_vector(&[KernelOrder::TwoBody], &[1.0, 0.5]).unwrap();
        let kernel = Kernel::from_name("2_force_en", hyperparameters.clone()).unwrap();

        let output = kernel.evaluate(env1, env2, 1, 12).unwrap();
        assert_eq!(output, KernelOutput::Value(kernel.force_energy(env1, env2, 1)));

        let error = kernel.evaluate(env1, env2, 3, 0).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: cartesian direction must be 0, 1 or 2, got 3");

        let kernel = Kernel::from_name("2_grad", hyperparameters).unwrap();
        let output = kernel.evaluate(env1, env2, 1, 0).unwrap();
        let (value, gradient) = kernel.force_force_gradient(env1, env2, 1, 0);
        assert_eq!(output.value(), value);
        assert_eq!(output, KernelOutput::Gradient(value, gradient));

        let hyperparameters = Hyperparameters::from_vector(&[KernelOrder::ManyBody], &[1.0, 0.5]).unwrap();
        let kernel = Kernel::from_name("many_2body_mc", hyperparameters).unwrap();
        let error = kernel.evaluate(env1, env2, 0, 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid parameter: the environment of atom 1 was created without a many-body cutoff"
        );
        // the typed functions skip the missing descriptors
        assert_eq!(kernel.force_force(env1, env2, 0, 0), 0.0);
    }

    #[test]
    fn matrix() {
        let environments = environments(&[3.0, 2.0, 1.5]);
        let hyperparameters = Hyperparameters::from_vector(
            &[KernelOrder::TwoBody, KernelOrder::ThreeBody, KernelOrder::ManyBody],
            &[1.0, 0.5, 0.5, 0.5, 0.3, 0.4],
        ).unwrap();
        let kernel = Kernel::from_name("2+3+mb", hyperparameters);
        // the many-body triplet order is missing from the hyperparameters
        assert!(kernel.is_err());

        let hyperparameters = Hyperparameters::from_vector(
            &[KernelOrder::TwoBody, KernelOrder::ThreeBody],
            &[1.0, 0.5, 0.5, 0.5],
        ).unwrap();
        let kernel = Kernel::from_name("2+3", hyperparameters).unwrap();

        let matrix = kernel.force_force_matrix(&environments, &environments[..2]);
        assert_eq!(matrix.shape(), [15, 6]);
        assert_eq!(matrix[[7, 4]], kernel.force_force(&environments[2], &environments[1], 1, 1));
        assert_eq!(matrix[[3, 5]], kernel.force_force(&environments[1], &environments[1], 0, 2));

        let square = kernel.force_force_matrix(&environments, &environments);
        assert_relative_eq!(square, square.t(), epsilon = 1e-12, max_relative = 1e-12);
    }
}
