use thiserror::Error;

use crate::core::forcefield::params::ParameterizationError;
use crate::core::models::constraint::DistanceConstraint;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Force-field parameterization failed: {source}")]
    Parameterization {
        #[from]
        source: ParameterizationError,
    },

    #[error("Invalid constraint {constraint}: {reason}")]
    InvalidConstraint {
        constraint: DistanceConstraint,
        reason: String,
    },

    #[error("Scan target atom {index} is out of range for a molecule of {atom_count} atoms")]
    TargetOutOfRange { index: usize, atom_count: usize },

    #[error("Scan produced no jobs: {0}")]
    EmptyScan(String),

    #[error("Scan produced duplicate job name '{0}'")]
    DuplicateJobName(String),
}
