use std::fmt;

/// A pinned interatomic distance between two atoms.
///
/// Indices are 0-based positions into the owning molecule's atom order; the
/// target distance is in Angstroms. Deck builders convert to whatever index
/// base or atom labelling the external program expects at the point of
/// emission, never earlier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
}

impl DistanceConstraint {
    /// Creates a constraint pinning atoms `i` and `j` at `distance` Angstroms.
    pub fn new(i: usize, j: usize, distance: f64) -> Self {
        Self { i, j, distance }
    }

    /// Returns `true` if `index` is one of the constrained atoms.
    pub fn involves(&self, index: usize) -> bool {
        self.i == index || self.j == index
    }

    /// Returns the constrained atom opposite to `index`, if `index` is one of
    /// the pair.
    pub fn partner(&self, index: usize) -> Option<usize> {
        if self.i == index {
            Some(self.j)
        } else if self.j == index {
            Some(self.i)
        } else {
            None
        }
    }
}

impl fmt::Display for DistanceConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}={:.2}", self.i, self.j, self.distance)
    }
}

/// Three atoms to be held collinear: two flanking atoms and the shared vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollinearTriple {
    pub first: usize,
    pub vertex: usize,
    pub last: usize,
}

/// Finds the atom two constraints have in common.
///
/// When exactly one atom is shared, returns the triple `(partner of a, shared,
/// partner of b)`, the geometry a collinearity restraint spans. Returns `None`
/// when the constraints are disjoint or describe the same atom pair.
pub fn shared_atom(a: &DistanceConstraint, b: &DistanceConstraint) -> Option<CollinearTriple> {
    let candidates = [a.i, a.j];
    let mut shared = None;
    for &index in &candidates {
        if b.involves(index) {
            if shared.is_some() {
                // Both atoms shared: the constraints cover the same pair.
                return None;
            }
            shared = Some(index);
        }
    }
    let vertex = shared?;
    let first = a.partner(vertex)?;
    let last = b.partner(vertex)?;
    Some(CollinearTriple { first, vertex, last })
}
