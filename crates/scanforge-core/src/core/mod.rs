//! # Core Module
//!
//! This module provides the fundamental building blocks for constrained input deck
//! generation in Scanforge, serving as the computational core of the library.
//!
//! ## Overview
//!
//! The core module implements the data structures, codecs, and pure functions the
//! higher layers orchestrate: molecular geometries loaded from XYZ files, distance
//! constraints addressed by atom index, a small UFF-style force field for
//! pre-relaxation, and the placeholder templates that become CP2K and Molpro
//! input decks.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different aspects
//! of deck generation:
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, ordered molecules,
//!   covalent bond perception, and distance constraints
//! - **File I/O** ([`io`]) - The XYZ geometry codec with plain and atom-labelled writers
//! - **Energy Calculations** ([`forcefield`]) - UFF parameters, pair/angle potentials,
//!   and the restrained energy model used for pre-relaxation
//! - **Deck Building** ([`decks`]) - `$var_*`/`$block_*` template substitution and the
//!   CP2K / Molpro deck builders
//!
//! ## Key Capabilities
//!
//! - **Index-stable geometries**: atom order is load order, so constraint indices
//!   survive from the input XYZ through relaxation to the emitted decks
//! - **Structured parse errors** carrying line numbers for malformed geometry files
//! - **Analytic gradients** for every force-field term, enabling deterministic
//!   conjugate-gradient relaxation
//! - **Template-defined formats**: the external programs' input syntax lives in
//!   the templates, not in code, and can be overridden per deployment

pub mod decks;
pub mod forcefield;
pub mod io;
pub mod models;
