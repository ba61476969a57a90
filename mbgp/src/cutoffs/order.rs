use crate::Error;
use super::SpeciesGroups;

/// Cutoff radius for one kernel order
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(tag = "type")]
pub enum OrderCutoff {
    /// The same radius for all species. A non-positive radius disables the
    /// corresponding order.
    Uniform {
        radius: f64,
    },
    /// Different radii for different pairs of species groups
    PerPair {
        /// All the different radii
        radii: Vec<f64>,
        /// Index in `radii` for each pair of groups, with `n_groups²` entries
        /// (see `SpeciesGroups::pair`)
        pairs: Vec<usize>,
    },
}

impl Default for OrderCutoff {
    fn default() -> OrderCutoff {
        OrderCutoff::Uniform { radius: 0.0 }
    }
}

impl OrderCutoff {
    pub(crate) fn validate(&self, name: &str, n_groups: usize) -> Result<(), Error> {
        match self {
            OrderCutoff::Uniform { radius } => {
                if !radius.is_finite() {
                    return Err(Error::InvalidParameter(format!(
                        "{} cutoff must be finite, got {}", name, radius
                    )));
                }
            }
            OrderCutoff::PerPair { radii, pairs } => {
                if pairs.len() != n_groups * n_groups {
                    return Err(Error::InvalidParameter(format!(
                        "{} cutoff pairs table must have {} entries for {} species groups, got {}",
                        name, n_groups * n_groups, n_groups, pairs.len()
                    )));
                }

                if let Some(&index) = pairs.iter().find(|&&index| index >= radii.len()) {
                    return Err(Error::InvalidParameter(format!(
                        "{} cutoff pairs table refers to radius {}, but only {} radii are defined",
                        name, index, radii.len()
                    )));
                }

                if let Some(radius) = radii.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
                    return Err(Error::InvalidParameter(format!(
                        "{} cutoff radii must be positive, got {}", name, radius
                    )));
                }
            }
        }
        return Ok(());
    }

    /// Is this order enabled, i.e. does it have at least one positive radius?
    pub fn is_active(&self) -> bool {
        self.max_radius() > 0.0
    }

    pub fn is_per_pair(&self) -> bool {
        matches!(self, OrderCutoff::PerPair { .. })
    }

    /// Largest radius over all pairs of species
    pub fn max_radius(&self) -> f64 {
        match self {
            OrderCutoff::Uniform { radius } => *radius,
            OrderCutoff::PerPair { radii, .. } => radii.iter().copied().fold(0.0, f64::max),
        }
    }

    /// Get the radius between atoms of species `first` and `second`
    #[inline]
    pub fn resolve(&self, groups: &SpeciesGroups, first: i32, second: i32) -> f64 {
        match self {
            OrderCutoff::Uniform { radius } => *radius,
            OrderCutoff::PerPair { radii, pairs } => radii[pairs[groups.pair(first, second)]],
        }
    }
}
