//! # Workflows Module
//!
//! This module provides the high-level entry points that turn a molecule and a
//! set of scan jobs into ready-to-run simulation inputs on disk.
//!
//! ## Overview
//!
//! Workflows are what callers of Scanforge actually invoke. Each one strings
//! together the full pipeline: constraint validation, constrained force-field
//! pre-relaxation, deck rendering, and writing the deck / geometry / manifest
//! files into the output directory, with progress reporting along the way.
//!
//! ## Architecture
//!
//! The module is organized around the deck formats being produced:
//!
//! - **Generation Workflows** ([`generate`]) - Batch and single-job input
//!   generation for CP2K constrained MD and Molpro constrained optimization.
//!
//! ## Key Capabilities
//!
//! - **End-to-end generation** from loaded geometry to deck files on disk
//! - **Fail-fast validation** of run parameters and constraints before any
//!   file is written
//! - **Progress monitoring** with per-job batch reporting
//! - **Manifest output** indexing every generated job as CSV

pub mod generate;
