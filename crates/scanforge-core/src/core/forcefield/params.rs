use crate::core::models::element::Element;
use thiserror::Error;

/// Per-element UFF parameters driving the pre-relaxation force field.
///
/// The subset of the published UFF parameterization this library needs: bond
/// geometry, van der Waals shape, and the effective charge entering the bond
/// force-constant rule. One entry per element; hybridization variants collapse
/// to the tetrahedral member, which is the right default for the saturated
/// systems scans are built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UffParams {
    /// Natural bond radius in Angstroms.
    pub r1: f64,
    /// Equilibrium valence angle at this atom, in degrees.
    pub theta0: f64,
    /// Van der Waals minimum-energy distance in Angstroms.
    pub x1: f64,
    /// Van der Waals well depth in kcal/mol.
    pub d1: f64,
    /// Effective charge for the bond force-constant rule.
    pub z_star: f64,
}

static UFF_PARAMS: phf::Map<&'static str, UffParams> = phf::phf_map! {
    "H" => UffParams { r1: 0.354, theta0: 180.0, x1: 2.886, d1: 0.044, z_star: 0.712 },
    "Li" => UffParams { r1: 1.336, theta0: 180.0, x1: 2.451, d1: 0.025, z_star: 1.026 },
    "B" => UffParams { r1: 0.838, theta0: 109.47, x1: 4.083, d1: 0.180, z_star: 1.755 },
    "C" => UffParams { r1: 0.757, theta0: 109.47, x1: 3.851, d1: 0.105, z_star: 1.912 },
    "N" => UffParams { r1: 0.700, theta0: 106.70, x1: 3.660, d1: 0.069, z_star: 2.544 },
    "O" => UffParams { r1: 0.658, theta0: 104.51, x1: 3.500, d1: 0.060, z_star: 2.300 },
    "F" => UffParams { r1: 0.668, theta0: 180.0, x1: 3.364, d1: 0.050, z_star: 1.735 },
    "Na" => UffParams { r1: 1.539, theta0: 180.0, x1: 2.983, d1: 0.030, z_star: 1.081 },
    "Mg" => UffParams { r1: 1.421, theta0: 109.47, x1: 3.021, d1: 0.111, z_star: 1.787 },
    "Al" => UffParams { r1: 1.244, theta0: 109.47, x1: 4.499, d1: 0.505, z_star: 1.792 },
    "Si" => UffParams { r1: 1.117, theta0: 109.47, x1: 4.295, d1: 0.402, z_star: 2.323 },
    "P" => UffParams { r1: 1.101, theta0: 93.80, x1: 4.147, d1: 0.305, z_star: 2.863 },
    "S" => UffParams { r1: 1.064, theta0: 92.10, x1: 4.035, d1: 0.274, z_star: 2.703 },
    "Cl" => UffParams { r1: 1.044, theta0: 180.0, x1: 3.947, d1: 0.227, z_star: 2.348 },
    "K" => UffParams { r1: 1.953, theta0: 180.0, x1: 3.812, d1: 0.035, z_star: 1.165 },
    "Ca" => UffParams { r1: 1.761, theta0: 90.0, x1: 3.399, d1: 0.238, z_star: 2.141 },
    "Fe" => UffParams { r1: 1.270, theta0: 109.47, x1: 4.540, d1: 0.013, z_star: 2.430 },
    "Zn" => UffParams { r1: 1.193, theta0: 109.47, x1: 4.045, d1: 0.124, z_star: 1.308 },
    "Br" => UffParams { r1: 1.192, theta0: 180.0, x1: 4.189, d1: 0.251, z_star: 2.519 },
    "I" => UffParams { r1: 1.382, theta0: 180.0, x1: 4.500, d1: 0.339, z_star: 2.650 },
};

/// Error types that can occur when assigning force-field parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterizationError {
    /// The element has no entry in the built-in UFF table, so the molecule
    /// cannot be relaxed.
    #[error("element '{0}' has no force-field parameters")]
    MissingElement(String),
}

/// Looks up the UFF parameters for an element.
pub fn for_element(element: &Element) -> Result<&'static UffParams, ParameterizationError> {
    UFF_PARAMS
        .get(element.symbol())
        .ok_or_else(|| ParameterizationError::MissingElement(element.symbol().to_string()))
}

/// Natural bond length between two parameterized elements: the sum of their
/// bond radii.
pub fn natural_bond_length(a: &UffParams, b: &UffParams) -> f64 {
    a.r1 + b.r1
}

/// UFF bond stretch force constant in kcal/mol/A^2:
/// `664.12 * z*_i * z*_j / r0^3`.
pub fn bond_force_constant(a: &UffParams, b: &UffParams, r0: f64) -> f64 {
    664.12 * a.z_star * b.z_star / r0.powi(3)
}

/// Van der Waals minimum-energy distance, geometric-mean combination.
pub fn vdw_minimum(a: &UffParams, b: &UffParams) -> f64 {
    (a.x1 * b.x1).sqrt()
}

/// Van der Waals well depth, geometric-mean combination.
pub fn vdw_well_depth(a: &UffParams, b: &UffParams) -> f64 {
    (a.d1 * b.d1).sqrt()
}

/// UFF angle bend force constant in kcal/mol/rad^2 for the triple `i-j-k`,
/// where `j` is the vertex and `theta0` is the vertex element's equilibrium
/// angle.
pub fn angle_force_constant(i: &UffParams, j: &UffParams, k: &UffParams) -> f64 {
    let r_ij = natural_bond_length(i, j);
    let r_jk = natural_bond_length(j, k);
    let cos0 = j.theta0.to_radians().cos();
    let r_ik_sq = r_ij.powi(2) + r_jk.powi(2) - 2.0 * r_ij * r_jk * cos0;
    let r_ik = r_ik_sq.sqrt();
    664.12 * i.z_star * k.z_star / r_ik.powi(5)
        * (3.0 * r_ij * r_jk * (1.0 - cos0.powi(2)) - r_ik_sq * cos0)
}
