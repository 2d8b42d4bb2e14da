use super::config::RelaxConfig;
use super::error::EngineError;
use super::scan::validate_constraints;
use crate::core::forcefield::model::EnergyModel;
use crate::core::models::constraint::DistanceConstraint;
use crate::core::models::molecule::Molecule;
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace};

/// Largest per-atom displacement allowed in a single trial step, Angstroms.
const MAX_DISPLACEMENT: f64 = 0.3;
/// Armijo sufficient-decrease constant for the backtracking line search.
const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: u32 = 30;

/// Outcome of a constrained relaxation.
#[derive(Debug, Clone)]
pub struct Relaxation {
    /// Relaxed positions, one per atom in molecule order.
    pub positions: Vec<Point3<f64>>,
    /// Final force-field energy, kcal/mol.
    pub energy: f64,
    /// Largest per-atom force magnitude at the final geometry, kcal/mol/A.
    pub max_force: f64,
    /// Largest deviation of a restrained distance from its target, Angstroms.
    pub max_restraint_deviation: f64,
    /// Conjugate-gradient steps taken.
    pub steps: u32,
    /// Whether the force tolerance was reached inside the step budget.
    pub converged: bool,
}

/// Relaxes a molecule under harmonic distance restraints.
///
/// Runs Polak-Ribiere conjugate gradients with a backtracking line search
/// over the assembled force-field model. Exhausting `max_steps` is a normal
/// outcome; the caller gets the best geometry reached either way.
///
/// # Errors
///
/// Fails if a constraint is malformed or if any element in the molecule has
/// no force-field parameters.
pub fn relax(
    molecule: &Molecule,
    constraints: &[DistanceConstraint],
    config: &RelaxConfig,
) -> Result<Relaxation, EngineError> {
    validate_constraints(molecule, constraints)?;
    let model = EnergyModel::build(molecule, constraints, config.restraint_strength)?;

    let mut positions = molecule.positions();
    let mut gradient = vec![Vector3::zeros(); positions.len()];
    let mut energy = model.gradient(&positions, &mut gradient);
    let mut direction: Vec<Vector3<f64>> = gradient.iter().map(|g| -g).collect();
    let mut on_steepest = true;

    let mut steps = 0u32;
    let mut converged = false;
    while steps < config.max_steps {
        let max_force = max_atom_force(&gradient);
        if max_force <= config.force_tolerance {
            converged = true;
            break;
        }

        let mut slope = dot(&gradient, &direction);
        if slope >= 0.0 {
            // Conjugacy has drifted; restart along the gradient.
            reset_direction(&mut direction, &gradient);
            on_steepest = true;
            slope = dot(&gradient, &direction);
            if slope >= 0.0 {
                break;
            }
        }

        let longest = direction.iter().map(Vector3::norm).fold(0.0, f64::max);
        if longest < 1e-14 {
            break;
        }
        let mut alpha = (MAX_DISPLACEMENT / longest).min(1.0);

        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let trial: Vec<Point3<f64>> = positions
                .iter()
                .zip(&direction)
                .map(|(p, d)| p + alpha * d)
                .collect();
            let trial_energy = model.energy(&trial);
            if trial_energy <= energy + ARMIJO_C * alpha * slope {
                accepted = Some(trial);
                break;
            }
            alpha *= 0.5;
        }
        let Some(new_positions) = accepted else {
            if on_steepest {
                break;
            }
            reset_direction(&mut direction, &gradient);
            on_steepest = true;
            continue;
        };
        positions = new_positions;

        let mut new_gradient = vec![Vector3::zeros(); positions.len()];
        energy = model.gradient(&positions, &mut new_gradient);

        // Polak-Ribiere with restart on negative beta.
        let denom = dot(&gradient, &gradient);
        let mut beta = 0.0;
        if denom > 0.0 {
            beta = (dot(&new_gradient, &new_gradient) - dot(&new_gradient, &gradient)) / denom;
            beta = beta.max(0.0);
        }
        for (d, g) in direction.iter_mut().zip(&new_gradient) {
            *d = -g + beta * *d;
        }
        on_steepest = beta == 0.0;
        gradient = new_gradient;

        steps += 1;
        trace!(step = steps, energy, "relaxation step");
    }

    // Covers molecules already at a minimum and the max_steps = 0 case.
    let max_force = max_atom_force(&gradient);
    if max_force <= config.force_tolerance {
        converged = true;
    }

    let max_restraint_deviation = model.max_restraint_deviation(&positions);
    debug!(
        steps,
        converged, energy, max_force, max_restraint_deviation, "relaxation finished"
    );
    Ok(Relaxation {
        positions,
        energy,
        max_force,
        max_restraint_deviation,
        steps,
        converged,
    })
}

fn dot(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x.dot(y)).sum()
}

fn max_atom_force(gradient: &[Vector3<f64>]) -> f64 {
    gradient.iter().map(Vector3::norm).fold(0.0, f64::max)
}

fn reset_direction(direction: &mut [Vector3<f64>], gradient: &[Vector3<f64>]) {
    for (d, g) in direction.iter_mut().zip(gradient) {
        *d = -g;
    }
}
