use ndarray::{Array1, Array2, Array3};

use crate::{Error, System};
use crate::cutoffs::{CutoffFunction, CutoffParameters};

use super::{Bond, BondList, CrossBonds};

/// Maximal number of different species in a system for the many-body
/// descriptors. Kernels use stack-allocated lists of species with this
/// capacity.
pub const MAX_SPECIES: usize = 32;

fn system_species(system: &dyn System) -> Result<Vec<i32>, Error> {
    let species = system.unique_species();
    if species.len() > MAX_SPECIES {
        return Err(Error::Unsupported(format!(
            "many-body descriptors support at most {} different species, got {}",
            MAX_SPECIES, species.len()
        )));
    }
    return Ok(species);
}

fn species_index(species: &[i32], value: i32) -> Result<usize, Error> {
    species.binary_search(&value).map_err(|_| Error::Internal(format!(
        "species {} is missing from the list of species of the system", value
    )))
}

/// Two-species many-body descriptors: smooth coordination numbers of the
/// central atom and of all its neighbors, counted separately for each species
/// in the system.
#[derive(Debug, Clone)]
pub struct ManyBodyDescriptors {
    species: Vec<i32>,
    bonds: BondList,
    values: Array1<f64>,
    gradients: Array2<f64>,
    neighbor_values: Array2<f64>,
    neighbor_gradients: Array2<f64>,
}

impl ManyBodyDescriptors {
    /// Compute the descriptors of atom `center` in `system`, using the
    /// many-body cutoff from `cutoffs`
    pub fn new(system: &dyn System, center: usize, cutoffs: &CutoffParameters) -> Result<ManyBodyDescriptors, Error> {
        let species = system_species(system)?;
        let center_species = system.species()[center];
        let function = cutoffs.cutoff_function;

        let (bonds, values) = coordination(system, center, cutoffs, &species)?;

        let mut gradients = Array2::zeros((species.len(), 3));
        let mut neighbor_values = Array2::zeros((bonds.len(), species.len()));
        let mut neighbor_gradients = Array2::zeros((bonds.len(), 3));
        for (i, bond) in bonds.iter().enumerate() {
            let (_, neighbor) = coordination(system, bond.atom, cutoffs, &species)?;
            neighbor_values.row_mut(i).assign(&neighbor);

            // coordination of the central atom, and of the neighbor
            // counting the central atom
            let center_radius = cutoffs.many_body_radius(center_species, bond.species);
            let neighbor_radius = cutoffs.many_body_radius(bond.species, center_species);

            let s = species_index(&species, bond.species)?;
            for d in 0..3 {
                let direction = bond.direction[d];
                let (_, gradient) = function.with_central_gradient(bond.distance, center_radius, direction);
                gradients[[s, d]] += gradient;

                let (_, gradient) = function.with_central_gradient(bond.distance, neighbor_radius, direction);
                neighbor_gradients[[i, d]] = gradient;
            }
        }

        return Ok(ManyBodyDescriptors {
            species,
            bonds,
            values,
            gradients,
            neighbor_values,
            neighbor_gradients,
        });
    }

    /// Sorted list of all species in the system, defining the order of the
    /// species axis in all arrays
    pub fn species(&self) -> &[i32] {
        &self.species
    }

    /// Position of `species` in `self.species()`
    pub fn species_index(&self, species: i32) -> Option<usize> {
        self.species.binary_search(&species).ok()
    }

    /// Neighbors of the central atom within the many-body cutoff
    pub fn bonds(&self) -> &BondList {
        &self.bonds
    }

    /// Coordination number of the central atom for each species
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Gradient of `values` with respect to the central atom position, with
    /// shape `[species, 3]`
    pub fn gradients(&self) -> &Array2<f64> {
        &self.gradients
    }

    /// Coordination number of each neighbor for each species, with shape
    /// `[bonds, species]`
    pub fn neighbor_values(&self) -> &Array2<f64> {
        &self.neighbor_values
    }

    /// Gradient of the coordination number of each neighbor, counting the
    /// species of the central atom, with respect to the central atom
    /// position. The shape is `[bonds, 3]`.
    pub fn neighbor_gradients(&self) -> &Array2<f64> {
        &self.neighbor_gradients
    }
}

/// Get the neighbors of `center` and its coordination number for each
/// species
fn coordination(
    system: &dyn System,
    center: usize,
    cutoffs: &CutoffParameters,
    species: &[i32],
) -> Result<(BondList, Array1<f64>), Error> {
    let center_species = system.species()[center];
    let radius = |neighbor| cutoffs.many_body_radius(center_species, neighbor);

    let bonds = BondList::new(system, center, cutoffs.sweep, radius);

    let mut values = Array1::zeros(species.len());
    for bond in &bonds {
        let s = species_index(species, bond.species)?;
        values[s] += cutoffs.cutoff_function.compute(bond.distance, radius(bond.species));
    }

    return Ok((bonds, values));
}

/// Three-species many-body descriptors: sum over all triplets around the
/// central atom of the product of the envelope functions of the three sides,
/// for each pair of neighbor species.
#[derive(Debug, Clone)]
pub struct ManyBodyTripletDescriptors {
    species: Vec<i32>,
    bonds: BondList,
    triplets: CrossBonds,
    values: Array2<f64>,
    gradients: Array3<f64>,
    neighbor_values: Array3<f64>,
    neighbor_gradients: Array3<f64>,
}

impl ManyBodyTripletDescriptors {
    /// Compute the descriptors of atom `center` in `system`, using the
    /// many-body triplet cutoff from `cutoffs`. Only uniform cutoffs are
    /// supported.
    pub fn new(system: &dyn System, center: usize, cutoffs: &CutoffParameters) -> Result<ManyBodyTripletDescriptors, Error> {
        if cutoffs.many_body_triplet.is_per_pair() {
            return Err(Error::Unsupported(
                "per species pair cutoffs for the many-body triplet descriptors".into()
            ));
        }

        let species = system_species(system)?;
        let radius = cutoffs.many_body_triplet.max_radius();
        let function = cutoffs.cutoff_function;

        let (bonds, triplets, values) = triplet_coordination(system, center, cutoffs, &species)?;

        let n_species = species.len();
        let mut neighbor_values = Array3::zeros((bonds.len(), n_species, n_species));
        for (i, bond) in bonds.iter().enumerate() {
            let (_, _, neighbor) = triplet_coordination(system, bond.atom, cutoffs, &species)?;
            neighbor_values.index_axis_mut(ndarray::Axis(0), i).assign(&neighbor);
        }

        let mut neighbor_gradients = Array3::zeros((bonds.len(), n_species, 3));
        let bonds_slice = bonds.bonds();
        for (m, cross_bond) in triplets.iter() {
            let first = &bonds_slice[m];
            let second = &bonds_slice[cross_bond.index];
            let s_first = species_index(&species, first.species)?;
            let s_second = species_index(&species, second.species)?;

            let f_cross = function.compute(cross_bond.distance, radius);
            for d in 0..3 {
                let (f_first, fd_first) = leg(&function, first, radius, d);
                let (f_second, fd_second) = leg(&function, second, radius, d);

                let gradient = (fd_first * f_second + f_first * fd_second) * f_cross;
                neighbor_gradients[[m, s_second, d]] += gradient;
                neighbor_gradients[[cross_bond.index, s_first, d]] += gradient;
            }
        }

        // each triplet contributes to the gradient of both neighbors, only
        // count it once for triplets with twice the same species
        let mut gradients = Array3::zeros((n_species, n_species, 3));
        for (i, bond) in bonds.iter().enumerate() {
            let s_i = species_index(&species, bond.species)?;
            for s_j in 0..n_species {
                let factor = if s_i == s_j { 0.5 } else { 1.0 };
                for d in 0..3 {
                    gradients[[s_i, s_j, d]] += factor * neighbor_gradients[[i, s_j, d]];
                }
            }
        }

        return Ok(ManyBodyTripletDescriptors {
            species,
            bonds,
            triplets,
            values,
            gradients,
            neighbor_values,
            neighbor_gradients,
        });
    }

    /// Sorted list of all species in the system, defining the order of the
    /// species axes in all arrays
    pub fn species(&self) -> &[i32] {
        &self.species
    }

    /// Position of `species` in `self.species()`
    pub fn species_index(&self, species: i32) -> Option<usize> {
        self.species.binary_search(&species).ok()
    }

    /// Neighbors of the central atom within the many-body triplet cutoff
    pub fn bonds(&self) -> &BondList {
        &self.bonds
    }

    /// Triplets around the central atom
    pub fn triplets(&self) -> &CrossBonds {
        &self.triplets
    }

    /// Descriptor of the central atom for each pair of species, with shape
    /// `[species, species]`. This array is symmetric.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Gradient of `values` with respect to the central atom position, with
    /// shape `[species, species, 3]`
    pub fn gradients(&self) -> &Array3<f64> {
        &self.gradients
    }

    /// Descriptor of each neighbor, with shape `[bonds, species, species]`
    pub fn neighbor_values(&self) -> &Array3<f64> {
        &self.neighbor_values
    }

    /// Gradient of the descriptor of each neighbor for the pair made of the
    /// central atom species and each species, with respect to the central
    /// atom position. The shape is `[bonds, species, 3]`.
    pub fn neighbor_gradients(&self) -> &Array3<f64> {
        &self.neighbor_gradients
    }
}

/// Value of the envelope for one side of a triplet, and its gradient with
/// respect to the central atom position along `d`
#[inline]
fn leg(function: &CutoffFunction, bond: &Bond, radius: f64, d: usize) -> (f64, f64) {
    function.with_central_gradient(bond.distance, radius, bond.direction[d])
}

fn triplet_coordination(
    system: &dyn System,
    center: usize,
    cutoffs: &CutoffParameters,
    species: &[i32],
) -> Result<(BondList, CrossBonds, Array2<f64>), Error> {
    let radius = cutoffs.many_body_triplet.max_radius();
    let function = &cutoffs.cutoff_function;
    let center_species = system.species()[center];

    let bonds = BondList::new(system, center, cutoffs.sweep, |_| radius);
    let triplets = CrossBonds::new(bonds.bonds(), center_species, radius, |_, _| radius);

    let mut values = Array2::zeros((species.len(), species.len()));
    let bonds_slice = bonds.bonds();
    for (m, cross_bond) in triplets.iter() {
        let first = &bonds_slice[m];
        let second = &bonds_slice[cross_bond.index];

        let s_first = species_index(species, first.species)?;
        let s_second = species_index(species, second.species)?;

        let value = function.compute(first.distance, radius)
            * function.compute(second.distance, radius)
            * function.compute(cross_bond.distance, radius);

        values[[s_first, s_second]] += value;
        if s_first != s_second {
            values[[s_second, s_first]] += value;
        }
    }

    return Ok((bonds, triplets, values));
}
