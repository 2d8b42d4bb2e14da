//! # Scanforge Core Library
//!
//! A library for turning a single molecular geometry into batches of constrained
//! simulation input decks: CP2K molecular dynamics inputs and Molpro geometry
//! optimization inputs, one deck per point of a distance-constraint scan.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Molecule`,
//!   `DistanceConstraint`), the XYZ codec, pure force-field mathematics
//!   (`potentials`, `params`), and the template-driven deck builders.
//!
//! - **[`engine`]: The Logic Core.** This layer orchestrates the work: it plans
//!   constraint scans over a molecule, relaxes each geometry under its restraints
//!   with a conjugate-gradient minimizer, and reports progress to the caller.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together to execute complete batch
//!   runs: relax every scan point, render its deck, and write the deck, geometry,
//!   and batch manifest to disk.

pub mod core;
pub mod engine;
pub mod workflows;
