use crate::{System, Vector3D};

/// A single neighbor of a central atom, possibly a periodic image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    /// Index of the neighbor atom in the system
    pub atom: usize,
    /// Species of the neighbor atom
    pub species: i32,
    /// Distance between the central atom and the neighbor
    pub distance: f64,
    /// Unit vector from the central atom to the neighbor
    pub direction: Vector3D,
    /// Vector from the central atom to the neighbor
    pub vector: Vector3D,
    /// Number of cell vectors added to the neighbor position to get this
    /// periodic image
    pub cell_shift: [i32; 3],
}

/// All the neighbors of one central atom within a cutoff, sorted by
/// increasing distance.
///
/// The same atom can appear multiple times, once for each of its periodic
/// images inside the cutoff. The central atom itself is excluded, but its
/// periodic images are not.
#[derive(Debug, Clone, Default)]
pub struct BondList {
    bonds: Vec<Bond>,
}

impl BondList {
    /// Find all neighbors of `center` in `system`, looking at periodic images
    /// obtained by translations of `[-sweep, sweep]` cell vectors along each
    /// of the three cell vectors. `cutoff` gives the cutoff radius for
    /// neighbors of a given species.
    pub fn new<F>(system: &dyn System, center: usize, sweep: u32, cutoff: F) -> BondList where F: Fn(i32) -> f64 {
        let cell = system.cell();
        let sweep = if cell.is_infinite() { 0 } else { sweep as i32 };

        let positions = system.positions();
        let species = system.species();
        let origin = positions[center];

        let visit_images = |visit: &mut dyn FnMut(usize, [i32; 3], Vector3D, f64)| {
            for (atom, (&position, &neighbor_species)) in positions.iter().zip(species).enumerate() {
                let radius = cutoff(neighbor_species);
                if radius <= 0.0 {
                    continue;
                }

                let difference = position - origin;
                for s1 in -sweep..=sweep {
                    for s2 in -sweep..=sweep {
                        for s3 in -sweep..=sweep {
                            let shift = [s1, s2, s3];
                            let vector = difference + cell.translation(shift);
                            let distance = vector.norm();
                            if distance > 0.0 && distance < radius {
                                visit(atom, shift, vector, distance);
                            }
                        }
                    }
                }
            }
        };

        let mut count = 0;
        visit_images(&mut |_, _, _, _| count += 1);

        let mut bonds = Vec::with_capacity(count);
        visit_images(&mut |atom, shift, vector, distance| {
            bonds.push(Bond {
                atom: atom,
                species: species[atom],
                distance: distance,
                direction: vector / distance,
                vector: vector,
                cell_shift: shift,
            });
        });

        // stable sort, equal distances keep the atom/image order
        bonds.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        return BondList { bonds };
    }

    /// Get all bonds
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bond> {
        self.bonds.iter()
    }

    /// Get the bonds strictly shorter than `radius`, which are a prefix of
    /// the full list
    pub fn within(&self, radius: f64) -> &[Bond] {
        let end = self.bonds.partition_point(|bond| bond.distance < radius);
        return &self.bonds[..end];
    }
}

impl<'a> IntoIterator for &'a BondList {
    type Item = &'a Bond;
    type IntoIter = std::slice::Iter<'a, Bond>;

    fn into_iter(self) -> Self::IntoIter {
        self.bonds.iter()
    }
}
