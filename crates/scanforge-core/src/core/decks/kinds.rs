//! Valence-electron counts for CP2K `&KIND` sections.
//!
//! CP2K names its GTH pseudopotentials by the number of valence electrons they
//! treat explicitly (`GTH-PBE-q4` for carbon, and so on), so the deck builder
//! needs a per-element lookup. A table for the common elements is compiled in;
//! a user table can replace it wholesale from a TOML file or patch single
//! entries through [`KindTable::merge`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::models::element::Element;

/// Valence-electron counts of the GTH-PBE pseudopotentials for elements the
/// built-in table covers.
const EMBEDDED_VALENCE: &[(&str, u32)] = &[
    ("H", 1),
    ("Li", 3),
    ("B", 3),
    ("C", 4),
    ("N", 5),
    ("O", 6),
    ("F", 7),
    ("Na", 9),
    ("Mg", 10),
    ("Al", 3),
    ("Si", 4),
    ("P", 5),
    ("S", 6),
    ("Cl", 7),
    ("K", 9),
    ("Ca", 10),
    ("Fe", 16),
    ("Zn", 12),
    ("Br", 7),
    ("I", 7),
];

/// Represents errors that can occur while loading a kind table from disk.
#[derive(Debug, Error)]
pub enum KindLoadError {
    /// The table file could not be read.
    #[error("failed to read kind table '{path}': {source}")]
    Io {
        /// The path of the offending file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The table file is not valid TOML of the expected shape.
    #[error("failed to parse kind table '{path}': {source}")]
    Toml {
        /// The path of the offending file.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },
}

/// A lookup table from element symbol to valence-electron count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindTable {
    valence_electrons: HashMap<String, u32>,
}

impl KindTable {
    /// Returns the built-in table.
    pub fn embedded() -> Self {
        Self {
            valence_electrons: EMBEDDED_VALENCE
                .iter()
                .map(|&(symbol, count)| (symbol.to_string(), count))
                .collect(),
        }
    }

    /// Loads a replacement table from a TOML file.
    ///
    /// The file maps element symbols to integer counts, one `symbol = count`
    /// pair per line. The result does not inherit entries from the built-in
    /// table; use [`merge`](KindTable::merge) on top of
    /// [`embedded`](KindTable::embedded) to patch it instead.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the TOML file to load.
    ///
    /// # Errors
    ///
    /// Returns a [`KindLoadError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KindLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| KindLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let valence_electrons =
            toml::from_str(&text).map_err(|e| KindLoadError::Toml {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self { valence_electrons })
    }

    /// Overlays entries onto this table, replacing existing symbols.
    pub fn merge(&mut self, overrides: &HashMap<String, u32>) {
        for (symbol, count) in overrides {
            self.valence_electrons.insert(symbol.clone(), *count);
        }
    }

    /// Looks up the valence-electron count of an element.
    pub fn valence_electrons(&self, element: &Element) -> Option<u32> {
        self.valence_electrons.get(element.symbol()).copied()
    }

    /// Returns the number of elements the table covers.
    pub fn len(&self) -> usize {
        self.valence_electrons.len()
    }

    /// Checks whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.valence_electrons.is_empty()
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::embedded()
    }
}
