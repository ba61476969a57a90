use std::collections::BTreeSet;

use crate::Vector3D;

mod cell;
pub use self::cell::{UnitCell, CellShape};

mod simple_system;
pub use self::simple_system::SimpleSystem;

#[cfg(test)]
pub(crate) mod test_utils;

/// A `System` gives access to the atoms of a structure snapshot: their
/// positions, species and the periodic unit cell around them.
///
/// Environments only ever read from a `System`, so they can be built in
/// parallel from a shared reference.
pub trait System: Send + Sync {
    /// Get the unit cell for this system
    fn cell(&self) -> UnitCell;

    /// Get the number of atoms in this system
    fn size(&self) -> usize;

    /// Get the species of all atoms in this system. The returned slice must
    /// have `self.size()` entries. Species are usually atomic numbers, but any
    /// integer label can be used.
    fn species(&self) -> &[i32];

    /// Get the Cartesian positions of all atoms in this system. The returned
    /// slice must have `self.size()` entries.
    fn positions(&self) -> &[Vector3D];

    /// Get the sorted list of different species in this system
    fn unique_species(&self) -> Vec<i32> {
        self.species().iter().copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
