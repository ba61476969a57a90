use crate::{Vector3D, Matrix3};
use super::{UnitCell, SimpleSystem};

pub fn test_system(name: &str) -> SimpleSystem {
    match name {
        "methane" => get_methane(),
        "water" => get_water(),
        "dimer" => get_dimer(),
        "triangle" => get_triangle(),
        "cluster" => get_cluster(),
        "NaCl" => get_nacl(),
        _ => panic!("unknown test system {}", name)
    }
}

/// Same as `test_system`, with the position of atom `atom` moved by `delta`
/// along the cartesian axis `spatial`.
pub fn displaced_system(name: &str, atom: usize, spatial: usize, delta: f64) -> SimpleSystem {
    let mut system = test_system(name);
    system.positions_mut()[atom][spatial] += delta;
    return system;
}

fn get_methane() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(10.0).unwrap());
    system.add_atom(6, Vector3D::new(5.0000, 5.0000, 5.0000));
    system.add_atom(1, Vector3D::new(5.5288, 5.1610, 5.9359));
    system.add_atom(1, Vector3D::new(5.2051, 5.8240, 4.3214));
    system.add_atom(1, Vector3D::new(5.3345, 4.0686, 4.5504));
    system.add_atom(1, Vector3D::new(3.9315, 4.9463, 5.1921));
    return system;
}

fn get_water() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(10.0).unwrap());
    // species do not have to be atomic number
    system.add_atom(-42, Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom(1, Vector3D::new(0.0, 0.75545, -0.58895));
    system.add_atom(1, Vector3D::new(0.0, -0.75545, -0.58895));
    return system;
}

/// Two hydrogen atoms in a huge cell, 1.5 apart
fn get_dimer() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(1e7).unwrap());
    system.add_atom(1, Vector3D::new(1.0, 1.0, 1.0));
    system.add_atom(1, Vector3D::new(1.9, 2.2, 1.0));
    return system;
}

/// Equilateral triangle of side 1 without periodicity
fn get_triangle() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::infinite());
    system.add_atom(1, Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom(1, Vector3D::new(1.0, 0.0, 0.0));
    system.add_atom(2, Vector3D::new(0.5, 0.5 * f64::sqrt(3.0), 0.0));
    return system;
}

/// Small disordered two-species cluster in a huge cell
fn get_cluster() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(1e7).unwrap());
    system.add_atom(1, Vector3D::new(1.00, 1.00, 1.00));
    system.add_atom(2, Vector3D::new(1.82, 1.21, 0.93));
    system.add_atom(1, Vector3D::new(0.71, 1.88, 1.25));
    system.add_atom(2, Vector3D::new(1.19, 0.57, 1.79));
    system.add_atom(1, Vector3D::new(1.64, 1.95, 1.62));
    return system;
}

/// NaCl structure, using a primitive unit cell. The distance between the
/// closest Na-Cl pair is exactly 1.
fn get_nacl() -> SimpleSystem {
    let cell = Matrix3::new([[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]]);
    let mut system = SimpleSystem::new(UnitCell::new(cell).unwrap());
    system.add_atom(11, Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom(17, Vector3D::new(1.0, 0.0, 0.0));
    return system;
}
