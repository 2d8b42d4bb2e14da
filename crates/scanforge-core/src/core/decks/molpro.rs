//! Molpro constrained-optimization deck builder.
//!
//! Molpro's `optg` block identifies atoms by the labels they carry in the
//! geometry file, so the deck builder writes one `constraint,...,bond` line per
//! restrained distance using `<symbol><index>` labels, with indices counted
//! from 0 to match the labelled XYZ written alongside the deck. When two
//! constraints share an atom, that atom sits between two partners along the
//! scanned axis and an additional 180-degree angle constraint keeps the triple
//! collinear during the optimization.

use super::cp2k::DeckError;
use super::template::{Substitutions, TemplateSet};
use crate::core::models::constraint::{DistanceConstraint, shared_atom};
use crate::core::models::molecule::Molecule;

/// Renders a complete Molpro constrained-optimization input deck.
///
/// The deck points at a sibling labelled XYZ file named `<name>.xyz`; labels
/// in the constraint lines refer to atoms by the `<symbol><index>` names that
/// file assigns.
///
/// # Arguments
///
/// * `templates` - The template set providing the deck skeleton.
/// * `name` - The job name, used as deck title and geometry file stem.
/// * `molecule` - The geometry the deck will optimize.
/// * `constraints` - Distances held fixed during the optimization.
///
/// # Errors
///
/// Returns a [`DeckError`] if a constraint points outside the molecule or the
/// template leaves a placeholder unresolved.
pub fn render_opt_deck(
    templates: &TemplateSet,
    name: &str,
    molecule: &Molecule,
    constraints: &[DistanceConstraint],
) -> Result<String, DeckError> {
    let mut lines = Vec::with_capacity(constraints.len() + 1);
    for constraint in constraints {
        lines.push(format!(
            "constraint,{:.3},angstrom,bond,atoms=[{},{}]",
            constraint.distance,
            atom_label(molecule, constraint.i)?,
            atom_label(molecule, constraint.j)?,
        ));
    }
    if let [first, second, ..] = constraints {
        if let Some(triple) = shared_atom(first, second) {
            lines.push(format!(
                "constraint,180,deg,angle,atoms=[{},{},{}]",
                atom_label(molecule, triple.first)?,
                atom_label(molecule, triple.vertex)?,
                atom_label(molecule, triple.last)?,
            ));
        }
    }

    let subs = Substitutions::new()
        .var("name", name)
        .var("xyzfilename", format!("{name}.xyz"))
        .block("constraints", lines.join("\n"));
    Ok(templates.molpro_opt.render(&subs)?)
}

/// Builds the `<symbol><index>` label of an atom, with the index counted from 0.
fn atom_label(molecule: &Molecule, index: usize) -> Result<String, DeckError> {
    let atom = molecule.atom(index).ok_or(DeckError::AtomOutOfRange {
        index,
        atom_count: molecule.atom_count(),
    })?;
    Ok(format!("{}{}", atom.element.symbol(), index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use nalgebra::Point3;
    use std::str::FromStr;

    fn atom(symbol: &str, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(Element::from_str(symbol).unwrap(), Point3::new(x, y, z))
    }

    fn chain() -> Molecule {
        Molecule::from_atoms(vec![
            atom("H", -1.0, 0.0, 0.0),
            atom("C", 0.0, 0.0, 0.0),
            atom("O", 1.3, 0.0, 0.0),
            atom("H", 2.2, 0.0, 0.0),
        ])
    }

    #[test]
    fn writes_one_bond_line_per_constraint() {
        let deck = render_opt_deck(
            &TemplateSet::embedded(),
            "job",
            &chain(),
            &[
                DistanceConstraint::new(1, 2, 1.25),
                DistanceConstraint::new(0, 3, 2.5),
            ],
        )
        .unwrap();

        assert!(deck.contains("constraint,1.250,angstrom,bond,atoms=[C1,O2]"));
        assert!(deck.contains("constraint,2.500,angstrom,bond,atoms=[H0,H3]"));
    }

    #[test]
    fn adds_an_angle_line_when_two_constraints_share_an_atom() {
        let deck = render_opt_deck(
            &TemplateSet::embedded(),
            "job",
            &chain(),
            &[
                DistanceConstraint::new(1, 2, 1.25),
                DistanceConstraint::new(2, 3, 1.05),
            ],
        )
        .unwrap();

        assert!(deck.contains("constraint,180,deg,angle,atoms=[C1,O2,H3]"));
    }

    #[test]
    fn omits_the_angle_line_for_disjoint_constraints() {
        let deck = render_opt_deck(
            &TemplateSet::embedded(),
            "job",
            &chain(),
            &[
                DistanceConstraint::new(0, 1, 1.1),
                DistanceConstraint::new(2, 3, 1.0),
            ],
        )
        .unwrap();

        assert!(!deck.contains("angle"));
    }

    #[test]
    fn omits_the_angle_line_for_a_single_constraint() {
        let deck = render_opt_deck(
            &TemplateSet::embedded(),
            "job",
            &chain(),
            &[DistanceConstraint::new(1, 2, 1.25)],
        )
        .unwrap();

        assert!(deck.contains("bond"));
        assert!(!deck.contains("angle"));
    }

    #[test]
    fn fills_title_and_geometry_file_name() {
        let deck = render_opt_deck(
            &TemplateSet::embedded(),
            "O_1.20_1.40",
            &chain(),
            &[DistanceConstraint::new(1, 2, 1.2)],
        )
        .unwrap();

        assert!(deck.contains("O_1.20_1.40"));
        assert!(deck.contains("O_1.20_1.40.xyz"));
        assert!(!deck.contains('$'), "deck still holds a placeholder:\n{deck}");
    }

    #[test]
    fn rejects_constraints_pointing_outside_the_molecule() {
        let err = render_opt_deck(
            &TemplateSet::embedded(),
            "job",
            &chain(),
            &[DistanceConstraint::new(0, 7, 1.2)],
        )
        .unwrap_err();

        assert!(matches!(err, DeckError::AtomOutOfRange { index: 7, .. }));
    }
}
