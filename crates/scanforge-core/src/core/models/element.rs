use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Covalent radii in Angstroms, used for distance-based bond perception.
///
/// Values follow the Cordero (2008) compilation for the elements this library
/// is expected to meet in organic and small inorganic systems. Elements outside
/// this table still parse and can appear in decks, but cannot take part in
/// automatic bond perception or force-field relaxation.
static COVALENT_RADII: phf::Map<&'static str, f64> = phf::phf_map! {
    "H" => 0.31,
    "Li" => 1.28,
    "B" => 0.84,
    "C" => 0.76,
    "N" => 0.71,
    "O" => 0.66,
    "F" => 0.57,
    "Na" => 1.66,
    "Mg" => 1.41,
    "Al" => 1.21,
    "Si" => 1.11,
    "P" => 1.07,
    "S" => 1.05,
    "Cl" => 1.02,
    "K" => 2.03,
    "Ca" => 1.76,
    "Fe" => 1.32,
    "Zn" => 1.22,
    "Br" => 1.20,
    "I" => 1.39,
};

/// Error types that can occur when parsing element symbols.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// The token is not a chemical element symbol, optionally followed by a
    /// numeric atom label.
    #[error("'{0}' is not a valid element symbol")]
    InvalidSymbol(String),
}

/// A chemical element identified by its canonical symbol.
///
/// Symbols are stored in canonical case (`H`, `Cl`), so two occurrences of the
/// same element always compare equal regardless of how the input file spelled
/// them. Ordering is lexicographic on the symbol, which is the order deck
/// builders enumerate element kinds in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(String);

impl Element {
    /// Parses an element symbol.
    ///
    /// Accepts an optional trailing numeric atom label (`"C7"` parses as
    /// carbon), the convention used by labelled Molpro coordinate blocks, and
    /// normalizes letter case (`"CL"` and `"cl"` both parse as `Cl`).
    ///
    /// # Arguments
    ///
    /// * `token` - The symbol text, e.g. from an XYZ atom line.
    ///
    /// # Errors
    ///
    /// Returns `ElementError::InvalidSymbol` if the token is empty, contains
    /// non-alphanumeric characters, or has no alphabetic part.
    pub fn parse(token: &str) -> Result<Self, ElementError> {
        let trimmed = token.trim();
        let alpha = trimmed.trim_end_matches(|c: char| c.is_ascii_digit());
        if alpha.is_empty()
            || alpha.len() > 3
            || !alpha.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ElementError::InvalidSymbol(token.to_string()));
        }

        let mut symbol = String::with_capacity(alpha.len());
        for (i, c) in alpha.chars().enumerate() {
            if i == 0 {
                symbol.push(c.to_ascii_uppercase());
            } else {
                symbol.push(c.to_ascii_lowercase());
            }
        }
        Ok(Element(symbol))
    }

    /// Returns the canonical symbol, e.g. `"H"` or `"Cl"`.
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Returns the covalent radius in Angstroms, if tabulated.
    pub fn covalent_radius(&self) -> Option<f64> {
        COVALENT_RADII.get(self.0.as_str()).copied()
    }
}

impl FromStr for Element {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::parse(s)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
