use super::atom::Atom;
use super::element::Element;
use nalgebra::Point3;

/// An ordered collection of atoms.
///
/// Atom order is load order and is part of the public contract: distance
/// constraints, scan targets, and the indices emitted into decks all refer to
/// an atom's 0-based position in this order. Operations on a molecule never
/// reorder its atoms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
}

impl Molecule {
    /// Creates an empty molecule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a molecule from an ordered list of atoms.
    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Returns the number of atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the molecule contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the atoms in order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns the atom at `index`, or `None` if out of range.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Appends an atom, assigning it the next index.
    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    /// Returns a snapshot of all positions, in atom order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// Returns a copy of this molecule with every position replaced.
    ///
    /// `positions` must have one entry per atom, in atom order; this is how a
    /// relaxed geometry is carried back into the model.
    pub fn with_positions(&self, positions: &[Point3<f64>]) -> Self {
        debug_assert_eq!(positions.len(), self.atoms.len());
        let atoms = self
            .atoms
            .iter()
            .zip(positions.iter())
            .map(|(atom, &position)| Atom::new(atom.element.clone(), position))
            .collect();
        Self { atoms }
    }

    /// Returns the distance in Angstroms between atoms `i` and `j`, or `None`
    /// if either index is out of range.
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        let a = self.atoms.get(i)?;
        let b = self.atoms.get(j)?;
        Some((a.position - b.position).norm())
    }

    /// Returns the distinct elements of the molecule in lexicographic symbol
    /// order, the order deck builders enumerate element kinds in.
    pub fn distinct_elements(&self) -> Vec<Element> {
        let mut elements: Vec<Element> = self.atoms.iter().map(|a| a.element.clone()).collect();
        elements.sort();
        elements.dedup();
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(symbol: &str) -> Element {
        Element::parse(symbol).unwrap()
    }

    fn water() -> Molecule {
        Molecule::from_atoms(vec![
            Atom::new(element("O"), Point3::new(0.0, 0.0, 0.0)),
            Atom::new(element("H"), Point3::new(0.96, 0.0, 0.0)),
            Atom::new(element("H"), Point3::new(-0.24, 0.93, 0.0)),
        ])
    }

    #[test]
    fn atom_count_and_indexing_follow_insertion_order() {
        let mol = water();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.atom(0).unwrap().element.symbol(), "O");
        assert_eq!(mol.atom(2).unwrap().element.symbol(), "H");
        assert!(mol.atom(3).is_none());
    }

    #[test]
    fn distance_returns_pairwise_separation() {
        let mol = water();
        let d = mol.distance(0, 1).unwrap();
        assert!((d - 0.96).abs() < 1e-12);
    }

    #[test]
    fn distance_returns_none_for_out_of_range_indices() {
        let mol = water();
        assert!(mol.distance(0, 5).is_none());
    }

    #[test]
    fn distinct_elements_are_sorted_and_deduplicated() {
        let mol = water();
        let elements = mol.distinct_elements();
        let symbols: Vec<&str> = elements.iter().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["H", "O"]);
    }

    #[test]
    fn with_positions_replaces_coordinates_but_keeps_elements() {
        let mol = water();
        let mut positions = mol.positions();
        positions[1] = Point3::new(1.1, 0.0, 0.0);
        let moved = mol.with_positions(&positions);
        assert_eq!(moved.atom(1).unwrap().element.symbol(), "H");
        assert!((moved.distance(0, 1).unwrap() - 1.1).abs() < 1e-12);
        // Original is untouched.
        assert!((mol.distance(0, 1).unwrap() - 0.96).abs() < 1e-12);
    }
}
