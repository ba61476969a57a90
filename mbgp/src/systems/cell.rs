//! The `UnitCell` type represents the periodic box around a structure, and
//! produces the periodic image translations used by the neighbor search.
use crate::{Error, Matrix3, Vector3D};

/// The shape of a cell determine which periodic images exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    /// Infinite unit cell, with no periodic images
    Infinite,
    /// Orthorhombic unit cell, with cuboid shape
    Orthorhombic,
    /// Triclinic unit cell, with arbitrary parallelepiped shape
    Triclinic,
}

/// An `UnitCell` defines the periodic boundaries of a structure. The three
/// lattice vectors are the rows of the cell matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    matrix: Matrix3,
    shape: CellShape,
}

impl UnitCell {
    /// Create a unit cell from a matrix containing the lattice vectors as
    /// rows. A matrix full of zeros gives an infinite cell.
    pub fn new(matrix: Matrix3) -> Result<UnitCell, Error> {
        if matrix == Matrix3::zero() {
            return Ok(UnitCell::infinite());
        }

        if matrix.determinant().abs() < 1e-6 {
            return Err(Error::InvalidParameter(format!(
                "the cell matrix {:?} is not invertible", matrix
            )));
        }

        let is_close_0 = |value: f64| value.abs() < 1e-6;
        let is_diagonal = is_close_0(matrix[0][1]) && is_close_0(matrix[0][2]) &&
            is_close_0(matrix[1][0]) && is_close_0(matrix[1][2]) &&
            is_close_0(matrix[2][0]) && is_close_0(matrix[2][1]);

        let shape = if is_diagonal {
            CellShape::Orthorhombic
        } else {
            CellShape::Triclinic
        };

        return Ok(UnitCell {
            matrix: matrix,
            shape: shape,
        });
    }

    /// Create an infinite unit cell
    pub fn infinite() -> UnitCell {
        UnitCell {
            matrix: Matrix3::zero(),
            shape: CellShape::Infinite,
        }
    }

    /// Create an orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<UnitCell, Error> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "cell lengths must be positive, got {}, {} and {}", a, b, c
            )));
        }

        return Ok(UnitCell {
            matrix: Matrix3::new([
                [a, 0.0, 0.0],
                [0.0, b, 0.0],
                [0.0, 0.0, c]
            ]),
            shape: CellShape::Orthorhombic,
        });
    }

    /// Create a cubic unit cell, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> Result<UnitCell, Error> {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Create a triclinic unit cell, with side lengths `a, b, c` and angles
    /// `alpha, beta, gamma` in degrees.
    pub fn triclinic(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<UnitCell, Error> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "cell lengths must be positive, got {}, {} and {}", a, b, c
            )));
        }

        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let b_x = b * cos_gamma;
        let b_y = b * sin_gamma;

        let c_x = c * cos_beta;
        let c_y = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c_z = f64::sqrt(c * c - c_y * c_y - c_x * c_x);

        return UnitCell::new(Matrix3::new([
            [a,   0.0, 0.0],
            [b_x, b_y, 0.0],
            [c_x, c_y, c_z],
        ]));
    }

    /// Get the cell shape
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Check if this unit cell is infinite, *i.e.* if it does not have
    /// periodic boundary conditions.
    pub fn is_infinite(&self) -> bool {
        self.shape == CellShape::Infinite
    }

    /// Get the matrix representation of the unit cell, with lattice vectors
    /// as rows
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get one of the three lattice vectors
    pub fn vector(&self, axis: usize) -> Vector3D {
        self.matrix[axis].into()
    }

    /// Get the distances between opposite faces of the unit cell
    pub fn distances_between_faces(&self) -> Vector3D {
        if self.is_infinite() {
            return Vector3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        }

        let (a, b, c) = (self.vector(0), self.vector(1), self.vector(2));
        let na = (b ^ c).normalized();
        let nb = (c ^ a).normalized();
        let nc = (a ^ b).normalized();

        Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::abs(nc * c))
    }

    /// Get the volume of the cell
    pub fn volume(&self) -> f64 {
        match self.shape {
            CellShape::Infinite => 0.0,
            CellShape::Orthorhombic => self.matrix[0][0] * self.matrix[1][1] * self.matrix[2][2],
            CellShape::Triclinic => {
                let (a, b, c) = (self.vector(0), self.vector(1), self.vector(2));
                f64::abs(a * (b ^ c))
            }
        }
    }

    /// Get the cartesian translation corresponding to `shift[0]` times the
    /// first lattice vector, plus `shift[1]` times the second, plus
    /// `shift[2]` times the third.
    pub fn translation(&self, shift: [i32; 3]) -> Vector3D {
        let m = &self.matrix;
        let (s1, s2, s3) = (shift[0] as f64, shift[1] as f64, shift[2] as f64);
        Vector3D::new(
            s1 * m[0][0] + s2 * m[1][0] + s3 * m[2][0],
            s1 * m[0][1] + s2 * m[1][1] + s3 * m[2][1],
            s1 * m[0][2] + s2 * m[1][2] + s3 * m[2][2],
        )
    }

    /// Get the smallest image sweep `s` such that all periodic images of any
    /// atom inside the cell within `cutoff` of another atom inside the cell
    /// are found by translations in `[-s, s]` along each lattice vector.
    ///
    /// Atoms outside of the cell might need a larger sweep.
    pub fn minimal_sweep(&self, cutoff: f64) -> u32 {
        if self.is_infinite() || cutoff <= 0.0 {
            return 0;
        }

        let distances = self.distances_between_faces();
        let smallest = f64::min(distances[0], f64::min(distances[1], distances[2]));
        return f64::ceil(cutoff / smallest) as u32;
    }
}
