use super::params::{self, ParameterizationError, UffParams};
use super::potentials;
use crate::core::models::constraint::DistanceConstraint;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology;
use nalgebra::{Point3, Vector3};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
struct BondTerm {
    i: usize,
    j: usize,
    r0: f64,
    k: f64,
}

#[derive(Debug, Clone, Copy)]
enum BendForm {
    Harmonic { cos_theta0: f64, k_cos: f64 },
    Linear { k: f64 },
}

#[derive(Debug, Clone, Copy)]
struct AngleTerm {
    i: usize,
    j: usize,
    k: usize,
    bend: BendForm,
}

#[derive(Debug, Clone, Copy)]
struct PairTerm {
    i: usize,
    j: usize,
    r_min: f64,
    well_depth: f64,
}

#[derive(Debug, Clone, Copy)]
struct RestraintTerm {
    i: usize,
    j: usize,
    target: f64,
    strength: f64,
}

/// The assembled force-field terms for one molecule under a set of distance
/// restraints.
///
/// The model is built once per relaxation and then evaluated many times with
/// candidate positions. Terms: harmonic bond stretches over the perceived
/// bonds, angle bends at every bonded triple, Lennard-Jones interactions over
/// all pairs except 1-2 and 1-3 neighbours, and one harmonic restraint per
/// distance constraint. A restrained pair contributes no stretch or
/// Lennard-Jones term of its own; the restraint alone dictates that distance,
/// while the pair still counts as bonded for angle terms and exclusions.
pub struct EnergyModel {
    atom_count: usize,
    bonds: Vec<BondTerm>,
    angles: Vec<AngleTerm>,
    pairs: Vec<PairTerm>,
    restraints: Vec<RestraintTerm>,
}

const LINEAR_BEND_THRESHOLD: f64 = 1e-6;

impl EnergyModel {
    /// Assembles the model for `molecule` with harmonic restraints of the
    /// given strength (kcal/mol/A^2) for each distance constraint.
    ///
    /// # Errors
    ///
    /// Returns `ParameterizationError::MissingElement` if any atom's element
    /// is outside the built-in UFF table.
    pub fn build(
        molecule: &Molecule,
        constraints: &[DistanceConstraint],
        restraint_strength: f64,
    ) -> Result<Self, ParameterizationError> {
        let atom_count = molecule.atom_count();
        let atom_params: Vec<&'static UffParams> = molecule
            .atoms()
            .iter()
            .map(|atom| params::for_element(&atom.element))
            .collect::<Result<_, _>>()?;

        let perceived = topology::perceive_bonds(molecule);
        let neighbours = topology::adjacency(&perceived, atom_count);
        let restrained: HashSet<(usize, usize)> =
            constraints.iter().map(|c| ordered(c.i, c.j)).collect();

        let bonds = perceived
            .iter()
            .filter(|bond| !restrained.contains(&(bond.i, bond.j)))
            .map(|bond| {
                let (p_i, p_j) = (atom_params[bond.i], atom_params[bond.j]);
                let r0 = params::natural_bond_length(p_i, p_j);
                BondTerm {
                    i: bond.i,
                    j: bond.j,
                    r0,
                    k: params::bond_force_constant(p_i, p_j, r0),
                }
            })
            .collect();

        let mut angles = Vec::new();
        for (vertex, adjacent) in neighbours.iter().enumerate() {
            for (a, &first) in adjacent.iter().enumerate() {
                for &last in &adjacent[a + 1..] {
                    let k_uff = params::angle_force_constant(
                        atom_params[first],
                        atom_params[vertex],
                        atom_params[last],
                    );
                    let theta0 = atom_params[vertex].theta0.to_radians();
                    let sin_sq = theta0.sin().powi(2);
                    let bend = if sin_sq < LINEAR_BEND_THRESHOLD {
                        BendForm::Linear { k: k_uff }
                    } else {
                        BendForm::Harmonic {
                            cos_theta0: theta0.cos(),
                            k_cos: k_uff / sin_sq,
                        }
                    };
                    angles.push(AngleTerm {
                        i: first,
                        j: vertex,
                        k: last,
                        bend,
                    });
                }
            }
        }

        let mut excluded: HashSet<(usize, usize)> = restrained;
        for bond in &perceived {
            excluded.insert((bond.i, bond.j));
        }
        for angle in &angles {
            excluded.insert(ordered(angle.i, angle.k));
        }

        let mut pairs = Vec::new();
        for i in 0..atom_count {
            for j in (i + 1)..atom_count {
                if excluded.contains(&(i, j)) {
                    continue;
                }
                let (p_i, p_j) = (atom_params[i], atom_params[j]);
                pairs.push(PairTerm {
                    i,
                    j,
                    r_min: params::vdw_minimum(p_i, p_j),
                    well_depth: params::vdw_well_depth(p_i, p_j),
                });
            }
        }

        let restraints = constraints
            .iter()
            .map(|c| {
                debug_assert!(c.i < atom_count && c.j < atom_count);
                RestraintTerm {
                    i: c.i,
                    j: c.j,
                    target: c.distance,
                    strength: restraint_strength,
                }
            })
            .collect();

        Ok(Self {
            atom_count,
            bonds,
            angles,
            pairs,
            restraints,
        })
    }

    /// Returns the number of atoms the model was built for.
    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    /// Evaluates the total energy in kcal/mol.
    pub fn energy(&self, positions: &[Point3<f64>]) -> f64 {
        let mut total = 0.0;

        for bond in &self.bonds {
            let dist = (positions[bond.i] - positions[bond.j]).norm();
            total += potentials::harmonic(dist, bond.r0, bond.k);
        }

        for angle in &self.angles {
            if let Some(cos_theta) = cos_angle(positions, angle) {
                total += match angle.bend {
                    BendForm::Harmonic { cos_theta0, k_cos } => {
                        potentials::harmonic_cosine_bend(cos_theta, cos_theta0, k_cos)
                    }
                    BendForm::Linear { k } => potentials::linear_bend(cos_theta, k),
                };
            }
        }

        for pair in &self.pairs {
            let dist = (positions[pair.i] - positions[pair.j]).norm();
            total += potentials::lennard_jones_12_6(dist, pair.r_min, pair.well_depth);
        }

        for restraint in &self.restraints {
            let dist = (positions[restraint.i] - positions[restraint.j]).norm();
            total += potentials::harmonic(dist, restraint.target, restraint.strength);
        }

        total
    }

    /// Evaluates the gradient of the energy with respect to every position,
    /// accumulating into `gradient`, and returns the total energy.
    ///
    /// `gradient` must have one entry per atom; it is zeroed first.
    pub fn gradient(&self, positions: &[Point3<f64>], gradient: &mut [Vector3<f64>]) -> f64 {
        debug_assert_eq!(gradient.len(), self.atom_count);
        for g in gradient.iter_mut() {
            *g = Vector3::zeros();
        }
        let mut total = 0.0;

        for bond in &self.bonds {
            total += accumulate_pair(
                positions,
                gradient,
                bond.i,
                bond.j,
                |d| potentials::harmonic(d, bond.r0, bond.k),
                |d| potentials::harmonic_deriv(d, bond.r0, bond.k),
            );
        }

        for angle in &self.angles {
            let (u, v) = angle_arms(positions, angle);
            let (nu, nv) = (u.norm(), v.norm());
            if nu < 1e-12 || nv < 1e-12 {
                continue;
            }
            let cos_theta = (u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0);
            let (energy, de_dcos) = match angle.bend {
                BendForm::Harmonic { cos_theta0, k_cos } => (
                    potentials::harmonic_cosine_bend(cos_theta, cos_theta0, k_cos),
                    potentials::harmonic_cosine_bend_deriv(cos_theta, cos_theta0, k_cos),
                ),
                BendForm::Linear { k } => (
                    potentials::linear_bend(cos_theta, k),
                    potentials::linear_bend_deriv(k),
                ),
            };
            total += energy;

            let dcos_di = v / (nu * nv) - u * (cos_theta / (nu * nu));
            let dcos_dk = u / (nu * nv) - v * (cos_theta / (nv * nv));
            gradient[angle.i] += de_dcos * dcos_di;
            gradient[angle.k] += de_dcos * dcos_dk;
            gradient[angle.j] -= de_dcos * (dcos_di + dcos_dk);
        }

        for pair in &self.pairs {
            total += accumulate_pair(
                positions,
                gradient,
                pair.i,
                pair.j,
                |d| potentials::lennard_jones_12_6(d, pair.r_min, pair.well_depth),
                |d| potentials::lennard_jones_12_6_deriv(d, pair.r_min, pair.well_depth),
            );
        }

        for restraint in &self.restraints {
            total += accumulate_pair(
                positions,
                gradient,
                restraint.i,
                restraint.j,
                |d| potentials::harmonic(d, restraint.target, restraint.strength),
                |d| potentials::harmonic_deriv(d, restraint.target, restraint.strength),
            );
        }

        total
    }

    /// Returns the largest absolute deviation of a restrained distance from
    /// its target, or 0 when there are no restraints.
    pub fn max_restraint_deviation(&self, positions: &[Point3<f64>]) -> f64 {
        self.restraints
            .iter()
            .map(|r| {
                let dist = (positions[r.i] - positions[r.j]).norm();
                (dist - r.target).abs()
            })
            .fold(0.0, f64::max)
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn angle_arms(positions: &[Point3<f64>], angle: &AngleTerm) -> (Vector3<f64>, Vector3<f64>) {
    (
        positions[angle.i] - positions[angle.j],
        positions[angle.k] - positions[angle.j],
    )
}

fn cos_angle(positions: &[Point3<f64>], angle: &AngleTerm) -> Option<f64> {
    let (u, v) = angle_arms(positions, angle);
    let (nu, nv) = (u.norm(), v.norm());
    if nu < 1e-12 || nv < 1e-12 {
        return None;
    }
    Some((u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0))
}

fn accumulate_pair(
    positions: &[Point3<f64>],
    gradient: &mut [Vector3<f64>],
    i: usize,
    j: usize,
    energy_fn: impl Fn(f64) -> f64,
    deriv_fn: impl Fn(f64) -> f64,
) -> f64 {
    let delta = positions[i] - positions[j];
    let dist = delta.norm();
    if dist < 1e-12 {
        return energy_fn(dist);
    }
    let de_dr = deriv_fn(dist);
    let direction = delta / dist;
    gradient[i] += de_dr * direction;
    gradient[j] -= de_dr * direction;
    energy_fn(dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;

    fn atom(symbol: &str, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(Element::parse(symbol).unwrap(), Point3::new(x, y, z))
    }

    fn methane() -> Molecule {
        // Tetrahedral CH4 at standard geometry.
        let d = 1.09 / (3.0f64).sqrt();
        Molecule::from_atoms(vec![
            atom("C", 0.0, 0.0, 0.0),
            atom("H", d, d, d),
            atom("H", d, -d, -d),
            atom("H", -d, d, -d),
            atom("H", -d, -d, d),
        ])
    }

    #[test]
    fn build_collects_bond_angle_and_pair_terms() {
        let model = EnergyModel::build(&methane(), &[], 500.0).unwrap();
        assert_eq!(model.bonds.len(), 4);
        assert_eq!(model.angles.len(), 6);
        // Every H..H pair is a 1-3 neighbour, so no nonbonded terms remain.
        assert!(model.pairs.is_empty());
        assert!(model.restraints.is_empty());
    }

    #[test]
    fn build_fails_for_unparameterized_elements() {
        let mol = Molecule::from_atoms(vec![atom("U", 0.0, 0.0, 0.0)]);
        let result = EnergyModel::build(&mol, &[], 500.0);
        assert_eq!(
            result.err(),
            Some(ParameterizationError::MissingElement("U".to_string()))
        );
    }

    #[test]
    fn restrained_pair_loses_its_nonbonded_term() {
        // Two methane-like fragments far apart; restrain an H to the other C.
        let mut atoms = methane().atoms().to_vec();
        atoms.push(atom("C", 5.0, 0.0, 0.0));
        let mol = Molecule::from_atoms(atoms);
        let restrained = DistanceConstraint::new(1, 5, 1.2);

        let free = EnergyModel::build(&mol, &[], 500.0).unwrap();
        let pinned = EnergyModel::build(&mol, &[restrained], 500.0).unwrap();
        assert_eq!(pinned.pairs.len(), free.pairs.len() - 1);
        assert_eq!(pinned.restraints.len(), 1);
    }

    #[test]
    fn restraining_a_bonded_pair_replaces_its_stretch_term() {
        let restrained = DistanceConstraint::new(0, 1, 1.3);
        let model = EnergyModel::build(&methane(), &[restrained], 500.0).unwrap();
        // One of the four C-H stretches is taken over by the restraint;
        // the pair still counts as bonded, so all six angles survive.
        assert_eq!(model.bonds.len(), 3);
        assert_eq!(model.angles.len(), 6);
        assert_eq!(model.restraints.len(), 1);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mol = methane();
        let constraints = [DistanceConstraint::new(0, 1, 1.2)];
        let model = EnergyModel::build(&mol, &constraints, 500.0).unwrap();

        // Perturb away from equilibrium so every term contributes.
        let mut positions = mol.positions();
        positions[1].x += 0.07;
        positions[2].y -= 0.11;
        positions[3].z += 0.05;

        let mut gradient = vec![Vector3::zeros(); model.atom_count()];
        model.gradient(&positions, &mut gradient);

        let h = 1e-6;
        for atom_index in 0..positions.len() {
            for axis in 0..3 {
                let mut plus = positions.clone();
                let mut minus = positions.clone();
                plus[atom_index][axis] += h;
                minus[atom_index][axis] -= h;
                let numeric = (model.energy(&plus) - model.energy(&minus)) / (2.0 * h);
                let analytic = gradient[atom_index][axis];
                assert!(
                    (numeric - analytic).abs() < 1e-4,
                    "atom {atom_index} axis {axis}: numeric {numeric} vs analytic {analytic}"
                );
            }
        }
    }

    #[test]
    fn gradient_returns_the_same_energy_as_energy() {
        let mol = methane();
        let model = EnergyModel::build(&mol, &[], 500.0).unwrap();
        let positions = mol.positions();
        let mut gradient = vec![Vector3::zeros(); model.atom_count()];
        let from_gradient = model.gradient(&positions, &mut gradient);
        let direct = model.energy(&positions);
        assert!((from_gradient - direct).abs() < 1e-9);
    }

    #[test]
    fn max_restraint_deviation_reports_worst_offender() {
        let mol = methane();
        let constraints = [
            DistanceConstraint::new(0, 1, 1.09),
            DistanceConstraint::new(0, 2, 2.0),
        ];
        let model = EnergyModel::build(&mol, &constraints, 500.0).unwrap();
        let deviation = model.max_restraint_deviation(&mol.positions());
        assert!((deviation - (2.0 - 1.09)).abs() < 1e-9);
    }
}
