//! # Engine Module
//!
//! This module implements the orchestration layer between the stateless core and
//! the user-facing workflows: planning constraint scans, relaxing geometries
//! under restraints, and reporting progress while doing so.
//!
//! ## Overview
//!
//! A batch run is a plan followed by many independent relaxations. The engine
//! owns both halves. [`scan`] expands a scan specification against a concrete
//! molecule into named jobs with validated constraints; [`minimize`] drives the
//! force-field model with a conjugate-gradient minimizer until the restrained
//! geometry is relaxed or the step budget runs out.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Relaxation parameters and the batch
//!   generation configuration with its builder
//! - **Scan Planning** ([`scan`]) - Expanding distance grids over bonded pairs
//!   into concrete jobs
//! - **Minimization** ([`minimize`]) - Conjugate-gradient relaxation under
//!   harmonic restraints
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user
//!   feedback mechanisms
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod error;
pub mod minimize;
pub mod progress;
pub mod scan;
