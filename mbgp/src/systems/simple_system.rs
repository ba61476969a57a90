use crate::{Error, Matrix3};
use super::{UnitCell, System, Vector3D};

/// A simple implementation of `System`, storing all the data in memory
#[derive(Clone, Debug)]
pub struct SimpleSystem {
    cell: UnitCell,
    species: Vec<i32>,
    positions: Vec<Vector3D>,
}

impl SimpleSystem {
    /// Create a new empty system with the given unit cell
    pub fn new(cell: UnitCell) -> SimpleSystem {
        SimpleSystem {
            cell: cell,
            species: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Create a system from raw arrays: a cell with lattice vectors as rows,
    /// one position and one species per atom.
    pub fn from_arrays(cell: [[f64; 3]; 3], positions: &[[f64; 3]], species: &[i32]) -> Result<SimpleSystem, Error> {
        if positions.len() != species.len() {
            return Err(Error::InvalidParameter(format!(
                "got {} positions but {} species", positions.len(), species.len()
            )));
        }

        let mut system = SimpleSystem::new(UnitCell::new(Matrix3::new(cell))?);
        for (&position, &species) in positions.iter().zip(species) {
            system.add_atom(species, position.into());
        }
        return Ok(system);
    }

    /// Add an atom with the given species and position to this system
    pub fn add_atom(&mut self, species: i32, position: Vector3D) {
        self.species.push(species);
        self.positions.push(position);
    }

    /// Get mutable access to the positions, to displace atoms
    pub fn positions_mut(&mut self) -> &mut [Vector3D] {
        &mut self.positions
    }
}

impl System for SimpleSystem {
    fn cell(&self) -> UnitCell {
        self.cell
    }

    fn size(&self) -> usize {
        self.species.len()
    }

    fn species(&self) -> &[i32] {
        &self.species
    }

    fn positions(&self) -> &[Vector3D] {
        &self.positions
    }
}
