//! CP2K constrained-MD deck builder.
//!
//! Assembles a complete CP2K input deck from the MD template: scalar run
//! parameters go into `$var_*` slots, while the per-constraint `&COLLECTIVE`
//! and `&COLVAR` sections, the per-element `&KIND` sections, and the optional
//! charge lines are rendered from their sub-templates and spliced into the
//! `$block_*` slots. CP2K numbers atoms and collective variables from 1, so
//! all indices are shifted on the way out.

use thiserror::Error;

use super::kinds::KindTable;
use super::template::{Substitutions, TemplateError, TemplateSet};
use crate::core::models::constraint::DistanceConstraint;
use crate::core::models::molecule::Molecule;

/// Represents errors that can occur while building a simulation deck.
#[derive(Debug, Error)]
pub enum DeckError {
    /// A run parameter fails validation.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The molecule contains an element the kind table does not cover.
    #[error("element '{0}' is missing from the kind table")]
    MissingKind(String),
    /// A constraint references an atom index outside the molecule.
    #[error("constraint references atom index {index}, but the molecule has {atom_count} atoms")]
    AtomOutOfRange {
        /// The offending atom index.
        index: usize,
        /// The number of atoms in the molecule.
        atom_count: usize,
    },
    /// A template left a placeholder unresolved.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Run parameters of a constrained MD deck.
#[derive(Debug, Clone, PartialEq)]
pub struct MdParams {
    /// Number of MD steps between trajectory and restart dumps.
    pub dump_frequency: u32,
    /// Thermostat temperature in Kelvin.
    pub temperature: f64,
    /// Total number of MD steps.
    pub steps: u32,
    /// Integration timestep in femtoseconds.
    pub timestep: f64,
    /// Net charge of the system.
    pub charge: i32,
    /// Whether the system is open-shell and needs spin-unrestricted DFT.
    pub radical: bool,
    /// Simulation cell line in CP2K `&CELL` syntax, e.g. `ABC 20.0 20.0 20.0`.
    pub cell: String,
}

impl Default for MdParams {
    fn default() -> Self {
        Self {
            dump_frequency: 100,
            temperature: 300.0,
            steps: 300,
            timestep: 0.25,
            charge: 0,
            radical: false,
            cell: "ABC 20.0 20.0 20.0".to_string(),
        }
    }
}

impl MdParams {
    /// Checks the parameters for values that would produce a useless run.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InvalidParameter`] naming the first offending
    /// parameter. A dump frequency at or above the step count is rejected
    /// because such a run would finish without ever writing a trajectory
    /// frame.
    pub fn validate(&self) -> Result<(), DeckError> {
        if self.steps == 0 {
            return Err(DeckError::InvalidParameter {
                name: "steps",
                reason: "step count must be positive".to_string(),
            });
        }
        if self.dump_frequency == 0 {
            return Err(DeckError::InvalidParameter {
                name: "dump_frequency",
                reason: "dump frequency must be positive".to_string(),
            });
        }
        if self.dump_frequency >= self.steps {
            return Err(DeckError::InvalidParameter {
                name: "dump_frequency",
                reason: format!(
                    "dump frequency must be below the step count ({}), or no frame is ever written",
                    self.steps
                ),
            });
        }
        if !(self.temperature > 0.0) {
            return Err(DeckError::InvalidParameter {
                name: "temperature",
                reason: format!("temperature must be positive, got {}", self.temperature),
            });
        }
        if !(self.timestep > 0.0) {
            return Err(DeckError::InvalidParameter {
                name: "timestep",
                reason: format!("timestep must be positive, got {}", self.timestep),
            });
        }
        Ok(())
    }
}

/// Renders a complete CP2K constrained-MD input deck.
///
/// The geometry itself is not embedded; the deck points at a sibling XYZ file
/// named `<name>.xyz`, which the caller is expected to write next to it.
///
/// # Arguments
///
/// * `templates` - The template set providing the deck and its sub-sections.
/// * `kinds` - The valence-electron table for the `&KIND` sections.
/// * `name` - The job name, used as project name and geometry file stem.
/// * `molecule` - The geometry the deck will simulate.
/// * `constraints` - Distances held fixed during the run, in atom-index order.
/// * `params` - Scalar run parameters.
///
/// # Errors
///
/// Returns a [`DeckError`] if a parameter is invalid, a constraint points
/// outside the molecule, an element has no kind-table entry, or a template
/// leaves a placeholder unresolved.
pub fn render_md_deck(
    templates: &TemplateSet,
    kinds: &KindTable,
    name: &str,
    molecule: &Molecule,
    constraints: &[DistanceConstraint],
    params: &MdParams,
) -> Result<String, DeckError> {
    params.validate()?;

    let mut collective = Vec::with_capacity(constraints.len());
    let mut colvar = Vec::with_capacity(constraints.len());
    for (ordinal, constraint) in constraints.iter().enumerate() {
        check_index(constraint.i, molecule)?;
        check_index(constraint.j, molecule)?;
        let subs = Substitutions::new()
            .var("constraint_n", ordinal + 1)
            .var("constraint_distance", format!("{:.2}", constraint.distance));
        collective.push(templates.cp2k_collective.render(&subs)?.trim_end().to_string());
        let subs = Substitutions::new()
            .var("pos1", constraint.i + 1)
            .var("pos2", constraint.j + 1);
        colvar.push(templates.cp2k_colvar.render(&subs)?.trim_end().to_string());
    }

    let mut kind_sections = Vec::new();
    for element in molecule.distinct_elements() {
        let q = kinds
            .valence_electrons(&element)
            .ok_or_else(|| DeckError::MissingKind(element.symbol().to_string()))?;
        let subs = Substitutions::new()
            .var("atomtype", element.symbol())
            .var("valence_electrons", q);
        kind_sections.push(templates.cp2k_kind.render(&subs)?.trim_end().to_string());
    }

    let mut charge_lines = Vec::new();
    if params.charge != 0 {
        charge_lines.push(format!("    CHARGE {}", params.charge));
    }
    if params.radical {
        charge_lines.push("    LSD".to_string());
    }

    let subs = Substitutions::new()
        .var("name", name)
        .var("filename", format!("{name}.xyz"))
        .var("steps", params.steps)
        .var("timestep", params.timestep)
        .var("temperature", params.temperature)
        .var("dump_frequency", params.dump_frequency)
        .var("cell", &params.cell)
        .block("constraints1", collective.join("\n"))
        .block("constraints2", colvar.join("\n"))
        .block("kind", kind_sections.join("\n"))
        .block("charge", charge_lines.join("\n"));
    Ok(templates.cp2k_md.render(&subs)?)
}

fn check_index(index: usize, molecule: &Molecule) -> Result<(), DeckError> {
    if index < molecule.atom_count() {
        Ok(())
    } else {
        Err(DeckError::AtomOutOfRange {
            index,
            atom_count: molecule.atom_count(),
        })
    }
}
