//! # Force Field Module
//!
//! This module provides the molecular mechanics machinery behind geometry
//! pre-relaxation: UFF-style parameters, pure potential functions with their
//! analytic derivatives, and the assembled energy model a minimizer can drive.
//!
//! ## Overview
//!
//! Generated decks start from geometries whose constrained distances differ from
//! the input structure, sometimes by Angstroms. Relaxing the remaining degrees of
//! freedom under harmonic restraints removes that strain before the expensive
//! external program ever sees the geometry. The force field here is intentionally
//! small: bond stretches, valence-angle bends, Lennard-Jones nonbonded pairs, and
//! the restraints themselves. Torsions and inversions are omitted; local strain
//! relief does not need them.
//!
//! ## Key Components
//!
//! - [`params`] - Per-element UFF parameters and combination rules
//! - [`potentials`] - Pure energy/derivative functions for each interaction type
//! - [`model`] - The [`model::EnergyModel`] assembling all terms for one molecule

pub mod model;
pub mod params;
pub mod potentials;
