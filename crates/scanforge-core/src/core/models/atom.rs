use super::element::Element;
use nalgebra::Point3;

/// Represents a single atom: a chemical element at a Cartesian position.
///
/// Positions are in Angstroms. An atom has no identity of its own; it is
/// identified by its index within the [`Molecule`](super::molecule::Molecule)
/// that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element of this atom.
    pub element: Element,
    /// The 3D Cartesian coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new atom at the given position.
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }
}
