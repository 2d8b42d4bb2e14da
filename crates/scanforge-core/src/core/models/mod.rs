//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent molecular
//! geometries and the constraints imposed on them, providing the foundation for
//! scan planning, relaxation, and deck generation.
//!
//! ## Overview
//!
//! The models are deliberately positional: a [`molecule::Molecule`] is an ordered
//! list of atoms, and everything downstream (distance constraints, scan targets,
//! emitted deck indices) addresses atoms by their 0-based position in that order.
//! Keeping the order stable from file load to deck write is the central contract
//! of the library.
//!
//! ## Key Components
//!
//! - [`element`] - Validated element symbols with static covalent-radius data
//! - [`atom`] - A single atom: element plus Cartesian position
//! - [`molecule`] - Ordered atom collections with index-based queries
//! - [`topology`] - Covalent bonds and distance-based bond perception
//! - [`constraint`] - Pinned interatomic distances between atom pairs

pub mod atom;
pub mod constraint;
pub mod element;
pub mod molecule;
pub mod topology;
