use crate::Error;
use crate::cutoffs::SpeciesGroups;
use crate::math::SquaredExponential;

use super::KernelOrder;

/// Signal variances and length scales of one kernel order.
///
/// An order can use different hyperparameters for different groups of
/// species. The hyperparameter group of a pair of species (for the 2-body and
/// many-body orders) or of a triplet (for the 3-body order) is found in the
/// `groups` table, indexed with the species groups defined in
/// [`Hyperparameters::species_groups`].
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OrderHyperparameters {
    /// Signal variance σ of each hyperparameter group
    pub signal: Vec<f64>,
    /// Length scale ℓ of each hyperparameter group
    pub length_scale: Vec<f64>,
    /// Hyperparameter group for each pair (or triplet, for the 3-body order)
    /// of species groups. This can only be omitted if there is a single
    /// hyperparameter group.
    #[serde(default)]
    pub groups: Option<Vec<usize>>,
}

impl OrderHyperparameters {
    /// Hyperparameters with a single group for all species
    pub fn new(signal: f64, length_scale: f64) -> OrderHyperparameters {
        OrderHyperparameters {
            signal: vec![signal],
            length_scale: vec![length_scale],
            groups: None,
        }
    }

    /// Number of hyperparameter groups
    pub fn n_groups(&self) -> usize {
        self.signal.len()
    }

    fn validate(&self, order: KernelOrder, n_species_groups: usize) -> Result<(), Error> {
        let name = order.name();
        if self.signal.is_empty() || self.signal.len() != self.length_scale.len() {
            return Err(Error::InvalidParameter(format!(
                "{} hyperparameters must contain the same number of signal \
                variances and length scales, got {} and {}",
                name, self.signal.len(), self.length_scale.len()
            )));
        }

        for &value in self.signal.iter().chain(&self.length_scale) {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{} hyperparameters must be positive, got {}", name, value
                )));
            }
        }

        if order == KernelOrder::ManyBodyTriplet && self.n_groups() > 1 {
            return Err(Error::Unsupported(
                "multiple hyperparameter groups for the many-body triplet kernel".into()
            ));
        }

        match &self.groups {
            None => {
                if self.n_groups() != 1 {
                    return Err(Error::InvalidParameter(format!(
                        "{} hyperparameters define {} groups but no groups table",
                        name, self.n_groups()
                    )));
                }
            }
            Some(groups) => {
                let expected = if order == KernelOrder::ThreeBody {
                    n_species_groups * n_species_groups * n_species_groups
                } else {
                    n_species_groups * n_species_groups
                };

                if groups.len() != expected {
                    return Err(Error::InvalidParameter(format!(
                        "{} hyperparameters groups table must have {} entries \
                        for {} species groups, got {}",
                        name, expected, n_species_groups, groups.len()
                    )));
                }

                if let Some(&group) = groups.iter().find(|&&g| g >= self.n_groups()) {
                    return Err(Error::InvalidParameter(format!(
                        "{} hyperparameters groups table refers to group {}, \
                        but only {} groups are defined",
                        name, group, self.n_groups()
                    )));
                }

                // the group of a pair or triplet must not depend on the
                // order of the species in it
                let n = n_species_groups;
                let mut symmetric = true;
                for a in 0..n {
                    for b in 0..n {
                        if order == KernelOrder::ThreeBody {
                            for c in 0..n {
                                let group = groups[(a * n + b) * n + c];
                                symmetric &= group == groups[(b * n + a) * n + c];
                                symmetric &= group == groups[(a * n + c) * n + b];
                            }
                        } else {
                            symmetric &= groups[a * n + b] == groups[b * n + a];
                        }
                    }
                }

                if !symmetric {
                    return Err(Error::InvalidParameter(format!(
                        "{} hyperparameters groups table must be symmetric \
                        under permutations of the species groups",
                        name
                    )));
                }
            }
        }

        return Ok(());
    }
}

/// Hyperparameters for all orders of a kernel, and the noise of the
/// Gaussian process.
#[derive(Debug, Clone, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Hyperparameters {
    /// Groups of species used to select hyperparameter groups
    #[serde(default)]
    pub species_groups: SpeciesGroups,
    /// Hyperparameters of the 2-body kernel
    #[serde(default)]
    pub two_body: Option<OrderHyperparameters>,
    /// Hyperparameters of the 3-body kernel
    #[serde(default)]
    pub three_body: Option<OrderHyperparameters>,
    /// Hyperparameters of the two-species many-body kernel
    #[serde(default)]
    pub many_body: Option<OrderHyperparameters>,
    /// Hyperparameters of the three-species many-body kernel
    #[serde(default)]
    pub many_body_triplet: Option<OrderHyperparameters>,
    /// Noise variance of the Gaussian process. This is not used by the
    /// kernels, and only stored for convenience.
    #[serde(default)]
    pub noise: Option<f64>,
}

impl Hyperparameters {
    /// Create hyperparameters from a flat vector containing `[σ, ℓ]` for each
    /// order in `orders`, optionally followed by the noise.
    ///
    /// All orders use a single group of hyperparameters.
    pub fn from_vector(orders: &[KernelOrder], values: &[f64]) -> Result<Hyperparameters, Error> {
        let n_values = 2 * orders.len();
        if values.len() != n_values && values.len() != n_values + 1 {
            return Err(Error::InvalidParameter(format!(
                "expected {} or {} hyperparameters for {} kernel orders, got {}",
                n_values, n_values + 1, orders.len(), values.len()
            )));
        }

        let mut hyperparameters = Hyperparameters::default();
        for (i, &order) in orders.iter().enumerate() {
            let parameters = OrderHyperparameters::new(values[2 * i], values[2 * i + 1]);
            *hyperparameters.order_mut(order) = Some(parameters);
        }
        hyperparameters.noise = values.get(n_values).copied();

        hyperparameters.validate(orders)?;
        return Ok(hyperparameters);
    }

    /// Parse hyperparameters in JSON format, and check that they are valid
    /// for the given `orders`
    pub fn from_json(json: &str, orders: &[KernelOrder]) -> Result<Hyperparameters, Error> {
        let hyperparameters = serde_json::from_str::<Hyperparameters>(json)?;
        hyperparameters.validate(orders)?;
        return Ok(hyperparameters);
    }

    /// Get all hyperparameters of `orders` in a flat vector, in the same
    /// layout as the kernel gradients: `[σ_0, ..., σ_n, ℓ_0, ..., ℓ_n]` for
    /// each order, followed by the noise if it is set.
    pub fn to_vector(&self, orders: &[KernelOrder]) -> Vec<f64> {
        let mut values = Vec::new();
        for &order in orders {
            if let Some(parameters) = self.order(order) {
                values.extend_from_slice(&parameters.signal);
                values.extend_from_slice(&parameters.length_scale);
            }
        }

        if let Some(noise) = self.noise {
            values.push(noise);
        }
        return values;
    }

    /// Check that these hyperparameters can be used with a kernel containing
    /// the given `orders`
    pub fn validate(&self, orders: &[KernelOrder]) -> Result<(), Error> {
        self.species_groups.validate()?;

        for &order in orders {
            match self.order(order) {
                Some(parameters) => parameters.validate(order, self.species_groups.n_groups)?,
                None => {
                    return Err(Error::InvalidParameter(format!(
                        "missing {} hyperparameters", order.name()
                    )));
                }
            }
        }

        if let Some(noise) = self.noise {
            if !(noise.is_finite() && noise >= 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "noise must be non-negative, got {}", noise
                )));
            }
        }

        return Ok(());
    }

    /// Get the hyperparameters for a single order
    pub fn order(&self, order: KernelOrder) -> Option<&OrderHyperparameters> {
        match order {
            KernelOrder::TwoBody => self.two_body.as_ref(),
            KernelOrder::ThreeBody => self.three_body.as_ref(),
            KernelOrder::ManyBody => self.many_body.as_ref(),
            KernelOrder::ManyBodyTriplet => self.many_body_triplet.as_ref(),
        }
    }

    fn order_mut(&mut self, order: KernelOrder) -> &mut Option<OrderHyperparameters> {
        match order {
            KernelOrder::TwoBody => &mut self.two_body,
            KernelOrder::ThreeBody => &mut self.three_body,
            KernelOrder::ManyBody => &mut self.many_body,
            KernelOrder::ManyBodyTriplet => &mut self.many_body_triplet,
        }
    }
}

/// Validated hyperparameters of one order, ready to be used in the kernels
#[derive(Debug, Clone)]
pub(crate) struct OrderKernel {
    order: KernelOrder,
    species_groups: SpeciesGroups,
    groups: Option<Vec<usize>>,
    functions: Vec<SquaredExponential>,
}

impl OrderKernel {
    pub fn new(order: KernelOrder, hyperparameters: &Hyperparameters) -> Result<OrderKernel, Error> {
        let parameters = hyperparameters.order(order).ok_or_else(|| Error::InvalidParameter(
            format!("missing {} hyperparameters", order.name())
        ))?;
        parameters.validate(order, hyperparameters.species_groups.n_groups)?;

        let functions = parameters.signal.iter()
            .zip(&parameters.length_scale)
            .map(|(&signal, &length_scale)| SquaredExponential::new(signal, length_scale))
            .collect();

        return Ok(OrderKernel {
            order,
            species_groups: hyperparameters.species_groups.clone(),
            groups: parameters.groups.clone(),
            functions,
        });
    }

    pub fn order(&self) -> KernelOrder {
        self.order
    }

    /// Number of hyperparameter groups
    pub fn n_groups(&self) -> usize {
        self.functions.len()
    }

    /// Number of entries in the gradient with respect to the hyperparameters
    pub fn n_gradients(&self) -> usize {
        2 * self.functions.len()
    }

    /// Hyperparameter group of the pair of species `first` and `second`
    #[inline]
    pub fn pair(&self, first: i32, second: i32) -> usize {
        match &self.groups {
            None => 0,
            Some(groups) => groups[self.species_groups.pair(first, second)],
        }
    }

    /// Hyperparameter group of the triplet of species `first`, `second` and
    /// `third`
    #[inline]
    pub fn triplet(&self, first: i32, second: i32, third: i32) -> usize {
        match &self.groups {
            None => 0,
            Some(groups) => groups[self.species_groups.triplet(first, second, third)],
        }
    }

    #[inline]
    pub fn function(&self, group: usize) -> &SquaredExponential {
        &self.functions[group]
    }

    /// Fill `gradient` (in the `[σ_0, ..., σ_n, ℓ_0, ..., ℓ_n]` layout) from
    /// the kernel value and length scale derivative of each group
    pub fn fill_gradient(&self, values: &[f64], length_scale: &[f64], gradient: &mut [f64]) {
        let n_groups = self.n_groups();
        debug_assert_eq!(gradient.len(), 2 * n_groups);
        for group in 0..n_groups {
            gradient[group] = self.functions[group].signal_gradient(values[group]);
            gradient[n_groups + group] = length_scale[group];
        }
    }
}
