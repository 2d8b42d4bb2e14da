//! Provides input/output functionality for molecular geometry formats.
//!
//! This module contains the XYZ codec used to load scan geometries and to write
//! relaxed structures next to generated decks, behind a trait-based interface so
//! additional geometry formats can slot in without touching the workflows.

pub mod traits;
pub mod xyz;
