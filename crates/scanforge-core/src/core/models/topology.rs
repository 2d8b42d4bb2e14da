use super::molecule::Molecule;

/// Distance margin in Angstroms added to the summed covalent radii when
/// deciding whether two atoms are bonded.
pub const BOND_TOLERANCE: f64 = 0.4;

/// A covalent bond between two atoms, identified by their indices.
///
/// Bonds are stored with `i < j`; a bond carries no order or type information
/// beyond connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
}

impl Bond {
    /// Creates a bond, normalizing the index order so `i < j`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { i: a, j: b }
        } else {
            Self { i: b, j: a }
        }
    }
}

/// Perceives covalent bonds from interatomic distances.
///
/// Two atoms are bonded when their separation is at most the sum of their
/// covalent radii plus [`BOND_TOLERANCE`]. Atoms whose element has no
/// tabulated radius never take part in a perceived bond. The result is sorted
/// by `(i, j)`.
pub fn perceive_bonds(molecule: &Molecule) -> Vec<Bond> {
    let atoms = molecule.atoms();
    let radii: Vec<Option<f64>> = atoms.iter().map(|a| a.element.covalent_radius()).collect();

    let mut bonds = Vec::new();
    for i in 0..atoms.len() {
        let Some(r_i) = radii[i] else { continue };
        for j in (i + 1)..atoms.len() {
            let Some(r_j) = radii[j] else { continue };
            let dist = (atoms[i].position - atoms[j].position).norm();
            if dist <= r_i + r_j + BOND_TOLERANCE {
                bonds.push(Bond::new(i, j));
            }
        }
    }
    bonds
}

/// Builds per-atom neighbour lists from a bond set.
pub fn adjacency(bonds: &[Bond], atom_count: usize) -> Vec<Vec<usize>> {
    let mut neighbours = vec![Vec::new(); atom_count];
    for bond in bonds {
        neighbours[bond.i].push(bond.j);
        neighbours[bond.j].push(bond.i);
    }
    neighbours
}
