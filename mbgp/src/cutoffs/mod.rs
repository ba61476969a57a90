//! Cutoff configuration: which neighbors enter the environments of each
//! kernel order, possibly with a different radius for each pair of species.
use crate::Error;

mod groups;
pub use self::groups::SpeciesGroups;

mod order;
pub use self::order::OrderCutoff;

pub use crate::math::CutoffFunction;

fn default_sweep() -> u32 { 1 }

/// Parameters defining the atomic environments, used both to build the
/// environments and to evaluate the envelopes inside the kernels.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CutoffParameters {
    /// Groups of species sharing the same cutoff radii
    #[serde(default)]
    pub species_groups: SpeciesGroups,
    /// Cutoff for the pairs entering the 2-body kernel
    #[serde(default)]
    pub two_body: OrderCutoff,
    /// Cutoff for the triplets entering the 3-body kernel. This must not be
    /// larger than the 2-body cutoff.
    #[serde(default)]
    pub three_body: OrderCutoff,
    /// Cutoff for the two-species many-body descriptors
    #[serde(default)]
    pub many_body: OrderCutoff,
    /// Cutoff for the three-species many-body descriptors. Only uniform
    /// cutoffs are supported here.
    #[serde(default)]
    pub many_body_triplet: OrderCutoff,
    /// Envelope function going smoothly to zero at the cutoff
    #[serde(default)]
    pub cutoff_function: CutoffFunction,
    /// Periodic images in `[-sweep, sweep]` along each cell vector are
    /// searched for neighbors
    #[serde(default = "default_sweep")]
    pub sweep: u32,
}

impl Default for CutoffParameters {
    fn default() -> CutoffParameters {
        CutoffParameters {
            species_groups: SpeciesGroups::default(),
            two_body: OrderCutoff::default(),
            three_body: OrderCutoff::default(),
            many_body: OrderCutoff::default(),
            many_body_triplet: OrderCutoff::default(),
            cutoff_function: CutoffFunction::default(),
            sweep: default_sweep(),
        }
    }
}

impl CutoffParameters {
    /// Create parameters with the same radius for all species, from a list
    /// of radii in the `[2-body, 3-body, many-body, many-body triplet]`
    /// order. Missing trailing entries are inactive orders.
    pub fn uniform(radii: &[f64]) -> Result<CutoffParameters, Error> {
        if radii.is_empty() || radii.len() > 4 {
            return Err(Error::InvalidParameter(format!(
                "expected between 1 and 4 cutoff radii, got {}", radii.len()
            )));
        }

        let radius = |i: usize| OrderCutoff::Uniform {
            radius: radii.get(i).copied().unwrap_or(0.0)
        };

        let parameters = CutoffParameters {
            two_body: radius(0),
            three_body: radius(1),
            many_body: radius(2),
            many_body_triplet: radius(3),
            ..Default::default()
        };
        parameters.validate()?;
        return Ok(parameters);
    }

    /// Parse and validate parameters in JSON format
    pub fn from_json(json: &str) -> Result<CutoffParameters, Error> {
        let parameters = serde_json::from_str::<CutoffParameters>(json)?;
        parameters.validate()?;
        return Ok(parameters);
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.species_groups.validate()?;
        self.cutoff_function.validate()?;

        let n_groups = self.species_groups.n_groups;
        self.two_body.validate("two_body", n_groups)?;
        self.three_body.validate("three_body", n_groups)?;
        self.many_body.validate("many_body", n_groups)?;
        self.many_body_triplet.validate("many_body_triplet", n_groups)?;

        if self.three_body.max_radius() > self.two_body.max_radius() {
            return Err(Error::InvalidParameter(format!(
                "the 3-body cutoff ({}) must not be larger than the 2-body cutoff ({})",
                self.three_body.max_radius(), self.two_body.max_radius()
            )));
        }

        if let OrderCutoff::PerPair { .. } = self.many_body_triplet {
            return Err(Error::Unsupported(
                "per species pair cutoffs for the many-body triplet descriptors".into()
            ));
        }

        return Ok(());
    }

    /// Largest radius over all orders, used to check the image sweep
    pub fn max_radius(&self) -> f64 {
        [&self.two_body, &self.three_body, &self.many_body, &self.many_body_triplet]
            .iter()
            .map(|cutoff| cutoff.max_radius())
            .fold(0.0, f64::max)
    }

    /// 2-body radius between atoms of `first` and `second` species
    pub fn two_body_radius(&self, first: i32, second: i32) -> f64 {
        self.two_body.resolve(&self.species_groups, first, second)
    }

    /// 3-body radius for a leg between atoms of `first` and `second` species
    pub fn three_body_radius(&self, first: i32, second: i32) -> f64 {
        self.three_body.resolve(&self.species_groups, first, second)
    }

    /// Many-body radius for a central atom of species `center` counting
    /// neighbors of species `neighbor`
    pub fn many_body_radius(&self, center: i32, neighbor: i32) -> f64 {
        self.many_body.resolve(&self.species_groups, center, neighbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform() {
        let parameters = CutoffParameters::uniform(&[3.0, 2.5]).unwrap();
        assert_eq!(parameters.two_body, OrderCutoff::Uniform { radius: 3.0 });
        assert_eq!(parameters.three_body, OrderCutoff::Uniform { radius: 2.5 });
        assert!(!parameters.many_body.is_active());
        assert!(!parameters.many_body_triplet.is_active());
        assert_eq!(parameters.max_radius(), 3.0);
        assert_eq!(parameters.sweep, 1);
        assert_eq!(parameters.two_body_radius(1, 8), 3.0);

        let error = CutoffParameters::uniform(&[]).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: expected between 1 and 4 cutoff radii, got 0");
    }

    #[test]
    fn three_body_larger_than_two_body() {
        let error = CutoffParameters::uniform(&[2.0, 3.0]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid parameter: the 3-body cutoff (3) must not be larger than the 2-body cutoff (2)"
        );
    }

    #[test]
    fn per_pair_many_body_triplet() {
        let mut parameters = CutoffParameters::uniform(&[3.0]).unwrap();
        parameters.many_body_triplet = OrderCutoff::PerPair { radii: vec![2.0], pairs: vec![0] };

        let error = parameters.validate().unwrap_err();
        assert!(matches!(error, Error::Unsupported(_)));
    }

    #[test]
    fn json() {
        let parameters = CutoffParameters::from_json(r#"{
            "species_groups": {"n_groups": 2, "groups": {"1": 0, "8": 1}},
            "two_body": {"type": "PerPair", "radii": [2.0, 3.5], "pairs": [0, 1, 1, 1]},
            "three_body": {"type": "Uniform", "radius": 2.0},
            "cutoff_function": {"type": "ShiftedCosine", "width": 0.5},
            "sweep": 2
        }"#).unwrap();

        assert_eq!(parameters.sweep, 2);
        assert_eq!(parameters.cutoff_function, CutoffFunction::ShiftedCosine { width: 0.5 });
        assert_eq!(parameters.two_body_radius(1, 1), 2.0);
        assert_eq!(parameters.two_body_radius(1, 8), 3.5);
        assert_eq!(parameters.two_body_radius(8, 8), 3.5);
        assert_eq!(parameters.three_body_radius(8, 1), 2.0);
        assert_eq!(parameters.max_radius(), 3.5);
        assert!(!parameters.many_body.is_active());

        let error = CutoffParameters::from_json(r#"{"two_body": {"type": "Uniform", "radius": 2.0}, "cutof": 3}"#);
        assert!(matches!(error, Err(Error::Json(_))));
    }
}
