//! Local environments around atoms: neighbors sorted by distance, triplets
//! of neighbors and many-body descriptors.
use log::{debug, warn};
use rayon::prelude::*;

use crate::{Error, System};
use crate::cutoffs::CutoffParameters;

mod neighbors;
pub use self::neighbors::{Bond, BondList};

mod triplets;
pub use self::triplets::{CrossBond, CrossBonds};

mod many_body;
pub use self::many_body::{ManyBodyDescriptors, ManyBodyTripletDescriptors, MAX_SPECIES};

/// The local environment of one atom in a system, containing everything the
/// kernels need to compare it with another environment.
///
/// Environments are immutable once created.
#[derive(Debug, Clone)]
pub struct AtomicEnvironment {
    center: usize,
    species: i32,
    cutoffs: CutoffParameters,
    bonds: BondList,
    triplets: CrossBonds,
    many_body: Option<ManyBodyDescriptors>,
    many_body_triplet: Option<ManyBodyTripletDescriptors>,
}

impl AtomicEnvironment {
    /// Build the environment of atom `center` in `system`.
    ///
    /// Triplets are only computed if the 3-body cutoff is active, and the
    /// same goes for the many-body descriptors.
    #[time_graph::instrument(name = "AtomicEnvironment::new")]
    pub fn new(system: &dyn System, center: usize, cutoffs: &CutoffParameters) -> Result<AtomicEnvironment, Error> {
        cutoffs.validate()?;

        if center >= system.size() {
            return Err(Error::InvalidParameter(format!(
                "central atom index is out of bounds: got {} but the system has {} atoms",
                center, system.size()
            )));
        }

        if system.species().len() != system.size() || system.positions().len() != system.size() {
            return Err(Error::InvalidParameter(format!(
                "inconsistent system: {} atoms, but {} species and {} positions",
                system.size(), system.species().len(), system.positions().len()
            )));
        }

        check_cell(system, cutoffs);

        let species = system.species()[center];
        let bonds = BondList::new(system, center, cutoffs.sweep, |neighbor| {
            cutoffs.two_body_radius(species, neighbor)
        });

        let triplets = if cutoffs.three_body.is_active() {
            CrossBonds::new(
                bonds.bonds(),
                species,
                cutoffs.three_body.max_radius(),
                |first, second| cutoffs.three_body_radius(first, second),
            )
        } else {
            CrossBonds::default()
        };

        let many_body = if cutoffs.many_body.is_active() {
            Some(ManyBodyDescriptors::new(system, center, cutoffs)?)
        } else {
            None
        };

        let many_body_triplet = if cutoffs.many_body_triplet.is_active() {
            Some(ManyBodyTripletDescriptors::new(system, center, cutoffs)?)
        } else {
            None
        };

        debug!(
            "environment of atom {} (species {}): {} neighbors, {} triplets",
            center, species, bonds.len(), triplets.len()
        );

        return Ok(AtomicEnvironment {
            center,
            species,
            cutoffs: cutoffs.clone(),
            bonds,
            triplets,
            many_body,
            many_body_triplet,
        });
    }

    /// Index of the central atom in the system
    pub fn center(&self) -> usize {
        self.center
    }

    /// Species of the central atom
    pub fn species(&self) -> i32 {
        self.species
    }

    /// Cutoffs used to create this environment
    pub fn cutoffs(&self) -> &CutoffParameters {
        &self.cutoffs
    }

    /// Neighbors within the 2-body cutoff, sorted by distance
    pub fn bonds(&self) -> &BondList {
        &self.bonds
    }

    /// Triplets within the 3-body cutoff, indexing into `self.bonds()`
    pub fn triplets(&self) -> &CrossBonds {
        &self.triplets
    }

    pub fn many_body(&self) -> Option<&ManyBodyDescriptors> {
        self.many_body.as_ref()
    }

    pub fn many_body_triplet(&self) -> Option<&ManyBodyTripletDescriptors> {
        self.many_body_triplet.as_ref()
    }
}

impl std::fmt::Display for AtomicEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut neighbor_species = self.bonds.iter().map(|bond| bond.species).collect::<Vec<_>>();
        neighbor_species.sort_unstable();
        neighbor_species.dedup();

        write!(
            f, "environment of atom {} with species {}, surrounded by {} atoms of species {:?}",
            self.center, self.species, self.bonds.len(), neighbor_species
        )
    }
}

/// Warn about cutoffs that do not fit in the unit cell
fn check_cell(system: &dyn System, cutoffs: &CutoffParameters) {
    let cell = system.cell();
    if cell.is_infinite() {
        return;
    }

    let minimal_sweep = cell.minimal_sweep(cutoffs.max_radius());
    if cutoffs.sweep < minimal_sweep {
        warn!(
            "the image sweep ({}) is too small for a cutoff of {} in this cell, \
            some neighbors might be missing. Use a sweep of at least {}",
            cutoffs.sweep, cutoffs.max_radius(), minimal_sweep
        );
    }

    let faces = cell.distances_between_faces();
    let smallest = f64::min(faces[0], f64::min(faces[1], faces[2]));
    let many_body = f64::max(cutoffs.many_body.max_radius(), cutoffs.many_body_triplet.max_radius());
    if 2.0 * many_body > smallest {
        warn!(
            "the many-body cutoff ({}) is larger than half the smallest distance \
            between faces of the cell ({}), periodic images of the central atom \
            will contribute to the descriptors of its neighbors",
            many_body, smallest
        );
    }
}

/// Build the environments of all atoms in `system`, in parallel
#[time_graph::instrument(name = "structure_environments")]
pub fn structure_environments(system: &dyn System, cutoffs: &CutoffParameters) -> Result<Vec<AtomicEnvironment>, Error> {
    (0..system.size())
        .into_par_iter()
        .map(|center| AtomicEnvironment::new(system, center, cutoffs))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::systems::test_utils::test_system;
    use crate::cutoffs::OrderCutoff;
    use crate::{Error, Vector3D};

    use super::*;

    #[test]
    fn dimer() {
        let system = test_system("dimer");
        let cutoffs = CutoffParameters::uniform(&[3.0]).unwrap();
        let environment = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap();

        assert_eq!(environment.center(), 0);
        assert_eq!(environment.species(), 1);
        assert_eq!(environment.bonds().len(), 1);

        let bond = environment.bonds().bonds()[0];
        assert_relative_eq!(bond.distance, 1.5, max_relative = 1e-12);
        assert_relative_eq!(bond.direction, Vector3D::new(0.6, 0.8, 0.0), max_relative = 1e-12);

        assert_eq!(environment.triplets().n_bonds(), 0);
        assert!(environment.triplets().is_empty());
        assert!(environment.many_body().is_none());
        assert!(environment.many_body_triplet().is_none());

        let cutoffs = CutoffParameters::uniform(&[3.0, 3.0, 2.0, 2.0]).unwrap();
        let environment = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap();
        assert_eq!(environment.triplets().n_bonds(), 1);
        assert!(environment.triplets().is_empty());
        assert!(environment.many_body().is_some());
        assert!(environment.many_body_triplet().is_some());

        assert_eq!(
            environment.to_string(),
            "environment of atom 0 with species 1, surrounded by 1 atoms of species [1]"
        );
    }

    #[test]
    fn errors() {
        let system = test_system("dimer");

        let cutoffs = CutoffParameters::uniform(&[3.0]).unwrap();
        let error = AtomicEnvironment::new(&system, 2, &cutoffs).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid parameter: central atom index is out of bounds: got 2 but the system has 2 atoms"
        );

        let mut cutoffs = CutoffParameters::uniform(&[3.0]).unwrap();
        cutoffs.three_body = OrderCutoff::Uniform { radius: 4.0 };
        let error = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));

        let mut cutoffs = CutoffParameters::uniform(&[3.0]).unwrap();
        cutoffs.many_body_triplet = OrderCutoff::PerPair { radii: vec![2.0], pairs: vec![0] };
        let error = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap_err();
        assert!(matches!(error, Error::Unsupported(_)));
    }

    #[test]
    fn species_dependent_cutoffs() {
        let system = test_system("methane");
        let cutoffs = CutoffParameters::from_json(r#"{
            "species_groups": {"n_groups": 2, "groups": {"1": 0, "6": 1}},
            "two_body": {"type": "PerPair", "radii": [1.5, 2.0], "pairs": [1, 0, 0, 0]},
            "three_body": {"type": "PerPair", "radii": [1.2, 1.5], "pairs": [1, 0, 0, 0]}
        }"#).unwrap();

        let carbon = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap();
        assert_eq!(carbon.bonds().len(), 4);
        assert_eq!(carbon.triplets().n_bonds(), 4);
        // H-H distances are around 1.78, above the H-H 3-body cutoff
        assert!(carbon.triplets().is_empty());

        // hydrogen sees the carbon atom and the other hydrogen atoms
        let hydrogen = AtomicEnvironment::new(&system, 1, &cutoffs).unwrap();
        assert_eq!(hydrogen.bonds().len(), 4);
        assert_eq!(hydrogen.bonds().bonds()[0].species, 6);
        assert_eq!(hydrogen.triplets().n_bonds(), 1);
        assert!(hydrogen.triplets().is_empty());

        let cutoffs = CutoffParameters::uniform(&[2.0, 2.0]).unwrap();
        let carbon = AtomicEnvironment::new(&system, 0, &cutoffs).unwrap();
        assert_eq!(carbon.triplets().len(), 6);
    }

    #[test]
    fn per_pair_triplets() {
        let system = test_system("cluster");
        let cutoffs = CutoffParameters::from_json(r#"{
            "species_groups": {"n_groups": 2, "groups": {"1": 0, "2": 1}},
            "two_body": {"type": "Uniform", "radius": 3.0},
            "three_body": {"type": "PerPair", "radii": [1.4, 1.1], "pairs": [0, 0, 0, 1]}
        }"#).unwrap();

        let mut counts = Vec::new();
        for center in 0..system.size() {
            let environment = AtomicEnvironment::new(&system, center, &cutoffs).unwrap();
            let species = environment.species();
            let bonds = environment.bonds().bonds();
            let triplets = environment.triplets();

            for (m, cross_bond) in triplets.iter() {
                let first = &bonds[m];
                let second = &bonds[cross_bond.index];
                assert!(first.distance < cutoffs.three_body_radius(species, first.species));
                assert!(second.distance < cutoffs.three_body_radius(species, second.species));
                assert!(cross_bond.distance < cutoffs.three_body_radius(first.species, second.species));
            }

            let mut expected = 0;
            for m in 0..bonds.len() {
                for n in (m + 1)..bonds.len() {
                    let (first, second) = (&bonds[m], &bonds[n]);
                    let cross = (second.vector - first.vector).norm();
                    if first.distance < cutoffs.three_body_radius(species, first.species)
                        && second.distance < cutoffs.three_body_radius(species, second.species)
                        && cross < cutoffs.three_body_radius(first.species, second.species) {
                        expected += 1;
                    }
                }
            }
            assert_eq!(triplets.len(), expected);
            counts.push(triplets.len());
        }
        // the 2-2 cross bond between atoms 1 and 3 (1.24) is above the 2-2
        // cutoff, and atom 3 only has one species 1 neighbor within 1.1
        assert_eq!(counts, [3, 3, 3, 0, 3]);

        let cutoffs = CutoffParameters::uniform(&[3.0, 1.4]).unwrap();
        let counts = (0..system.size())
            .map(|center| AtomicEnvironment::new(&system, center, &cutoffs).unwrap().triplets().len())
            .collect::<Vec<_>>();
        assert_eq!(counts, [4, 4, 3, 1, 3]);
    }

    #[test]
    fn all_environments() {
        let system = test_system("cluster");
        let cutoffs = CutoffParameters::uniform(&[3.0, 1.3, 1.2]).unwrap();
        let environments = structure_environments(&system, &cutoffs).unwrap();

        assert_eq!(environments.len(), 5);
        for (i, environment) in environments.iter().enumerate() {
            assert_eq!(environment.center(), i);
            assert_eq!(environment.species(), system.species()[i]);
            // all atoms are within the 2-body cutoff
            assert_eq!(environment.bonds().len(), 4);
            assert!(environment.many_body().is_some());
        }
    }
}
