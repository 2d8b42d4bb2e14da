use super::error::EngineError;
use crate::core::models::constraint::DistanceConstraint;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology;
use std::collections::HashSet;

/// A named set of distance constraints to generate one deck from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanJob {
    /// Basename for every file the job produces (`<name>.inp`, `<name>.xyz`).
    pub name: String,
    pub constraints: Vec<DistanceConstraint>,
}

/// Describes a two-dimensional distance scan.
///
/// Every perceived bond whose endpoints match `bond` contributes one scanned
/// pair; the atom matching `bond.0` is the pivot the job is named after and
/// the atom both constraints share. Each pair is crossed with
/// `distances x target_distances`: the first grid pins the pair itself, the
/// second pins the pivot against `target_atom`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSpec {
    /// Element pair selecting the scanned bonds, pivot element first.
    pub bond: (Element, Element),
    /// 0-based index of the fixed counterpart atom.
    pub target_atom: usize,
    /// Distance grid for the scanned bond, in Angstroms.
    pub distances: Vec<f64>,
    /// Distance grid for the pivot-target pair, in Angstroms.
    pub target_distances: Vec<f64>,
    /// Skip grid points where both distances exceed this cutoff; such
    /// geometries have the pivot detached from both partners and carry no
    /// information.
    pub skip_beyond: Option<f64>,
}

impl ScanSpec {
    /// Expands the scan against a concrete molecule into named jobs.
    ///
    /// Job names follow `<pivot index>_<d1>_<d2>` with two decimal places per
    /// distance.
    ///
    /// # Errors
    ///
    /// Fails when the target atom is out of range, when no bond matches, when
    /// a grid is empty or fully skipped, when a constraint is invalid, or when
    /// two jobs would collide on the same name (several scanned bonds sharing
    /// a pivot atom).
    pub fn plan(&self, molecule: &Molecule) -> Result<Vec<ScanJob>, EngineError> {
        if self.target_atom >= molecule.atom_count() {
            return Err(EngineError::TargetOutOfRange {
                index: self.target_atom,
                atom_count: molecule.atom_count(),
            });
        }
        if self.distances.is_empty() || self.target_distances.is_empty() {
            return Err(EngineError::EmptyScan(
                "a distance grid is empty".to_string(),
            ));
        }

        let atoms = molecule.atoms();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for bond in topology::perceive_bonds(molecule) {
            let (e_i, e_j) = (&atoms[bond.i].element, &atoms[bond.j].element);
            if e_i == &self.bond.0 && e_j == &self.bond.1 {
                pairs.push((bond.i, bond.j));
            } else if self.bond.0 != self.bond.1 && e_j == &self.bond.0 && e_i == &self.bond.1 {
                pairs.push((bond.j, bond.i));
            }
        }
        if pairs.is_empty() {
            return Err(EngineError::EmptyScan(format!(
                "no {}-{} bonds in the molecule",
                self.bond.0, self.bond.1
            )));
        }

        let mut names = HashSet::new();
        let mut jobs = Vec::new();
        for &(pivot, partner) in &pairs {
            for &d1 in &self.distances {
                for &d2 in &self.target_distances {
                    if let Some(cutoff) = self.skip_beyond {
                        if d1 > cutoff && d2 > cutoff {
                            continue;
                        }
                    }
                    let name = format!("{pivot}_{d1:.2}_{d2:.2}");
                    if !names.insert(name.clone()) {
                        return Err(EngineError::DuplicateJobName(name));
                    }
                    let constraints = vec![
                        DistanceConstraint::new(pivot, partner, d1),
                        DistanceConstraint::new(pivot, self.target_atom, d2),
                    ];
                    validate_constraints(molecule, &constraints)?;
                    jobs.push(ScanJob { name, constraints });
                }
            }
        }
        if jobs.is_empty() {
            return Err(EngineError::EmptyScan(
                "every grid point fell beyond the skip cutoff".to_string(),
            ));
        }
        Ok(jobs)
    }
}

/// Checks that every constraint addresses two distinct in-range atoms at a
/// positive distance.
pub fn validate_constraints(
    molecule: &Molecule,
    constraints: &[DistanceConstraint],
) -> Result<(), EngineError> {
    let atom_count = molecule.atom_count();
    for &constraint in constraints {
        if constraint.i == constraint.j {
            return Err(EngineError::InvalidConstraint {
                constraint,
                reason: "atoms must be distinct".to_string(),
            });
        }
        if constraint.i >= atom_count || constraint.j >= atom_count {
            return Err(EngineError::InvalidConstraint {
                constraint,
                reason: format!("atom index out of range ({atom_count} atoms)"),
            });
        }
        if !(constraint.distance > 0.0) {
            return Err(EngineError::InvalidConstraint {
                constraint,
                reason: "distance must be positive".to_string(),
            });
        }
    }
    Ok(())
}
