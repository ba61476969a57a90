use super::Bond;

/// A second neighbor forming a triplet with the central atom and another
/// neighbor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossBond {
    /// Index of the second neighbor in the bond list
    pub index: usize,
    /// Distance between the two neighbors
    pub distance: f64,
}

/// Triplets of atoms (central atom and two neighbors `m < n`) that are all
/// within cutoff of each other.
///
/// The partners of each neighbor `m` are stored contiguously, in increasing
/// order of `n`. Using the dense row/column layout, the partner `k` of `m`
/// is found in column `m + 1 + k`.
#[derive(Debug, Clone, Default)]
pub struct CrossBonds {
    /// number of bonds taking part in triplets
    n_bonds: usize,
    /// start of the partners of each bond in `partners`
    starts: Vec<usize>,
    partners: Vec<CrossBond>,
}

impl CrossBonds {
    /// Build the triplets from a list of bonds sorted by distance, around a
    /// central atom with species `center`.
    ///
    /// Only bonds up to `max_radius` are considered. `radius(a, b)` gives the
    /// cutoff between atoms with species `a` and `b`, and all three sides of a
    /// triplet must be shorter than their respective cutoff.
    pub fn new<F>(bonds: &[Bond], center: i32, max_radius: f64, radius: F) -> CrossBonds where F: Fn(i32, i32) -> f64 {
        // bonds at exactly `max_radius` stay in the list, but can not be part
        // of a triplet since the cutoff function vanishes there
        let n_bonds = bonds.partition_point(|bond| bond.distance <= max_radius);
        let bonds = &bonds[..n_bonds];

        let mut starts = Vec::with_capacity(n_bonds + 1);
        let mut partners = Vec::new();
        for (m, first) in bonds.iter().enumerate() {
            starts.push(partners.len());
            if first.distance >= radius(center, first.species) {
                continue;
            }

            for (n, second) in bonds.iter().enumerate().skip(m + 1) {
                if second.distance >= radius(center, second.species) {
                    continue;
                }

                let distance = (second.vector - first.vector).norm();
                if distance < radius(first.species, second.species) {
                    partners.push(CrossBond { index: n, distance });
                }
            }
        }
        starts.push(partners.len());

        return CrossBonds { n_bonds, starts, partners };
    }

    /// Number of bonds taking part in triplets, i.e. bonds not longer than
    /// the largest cutoff. This is a prefix of the bonds given to `new`.
    pub fn n_bonds(&self) -> usize {
        self.n_bonds
    }

    /// Total number of triplets
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Number of triplets in which bond `m` is the closest neighbor
    pub fn triplet_count(&self, m: usize) -> usize {
        self.starts[m + 1] - self.starts[m]
    }

    /// All the partners `n > m` of bond `m`
    pub fn partners(&self, m: usize) -> &[CrossBond] {
        &self.partners[self.starts[m]..self.starts[m + 1]]
    }

    /// Get the cross bond stored in row `m` and column `column` of the dense
    /// table, if any
    pub fn cross_bond(&self, m: usize, column: usize) -> Option<&CrossBond> {
        if m >= self.n_bonds || column <= m {
            return None;
        }
        return self.partners(m).get(column - m - 1);
    }

    /// Iterate over all triplets, as `(m, cross bond to n)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CrossBond)> + '_ {
        (0..self.n_bonds).flat_map(move |m| self.partners(m).iter().map(move |partner| (m, partner)))
    }
}
