//! # Deck Building Module
//!
//! This module turns a relaxed geometry plus a set of distance constraints into
//! the text of a simulation input deck, by substituting values into placeholder
//! templates.
//!
//! ## Overview
//!
//! The input syntax of the external programs is not encoded in Rust; it lives in
//! text templates carrying `$var_*` and `$block_*` placeholders. The deck
//! builders only decide *what* goes into each placeholder: scalar parameters,
//! 1-based constraint indices for CP2K, labelled atom references for Molpro,
//! per-element kind sections. Swapping a template customizes the deck without
//! touching code; leaving a placeholder unfilled is a structured error rather
//! than a broken deck.
//!
//! ## Key Components
//!
//! - [`template`] - The placeholder engine and the built-in template set
//! - [`kinds`] - Element valence-electron table for CP2K `&KIND` sections
//! - [`cp2k`] - Constrained MD deck builder with parameter validation
//! - [`molpro`] - Constrained geometry-optimization deck builder

pub mod cp2k;
pub mod kinds;
pub mod molpro;
pub mod template;
