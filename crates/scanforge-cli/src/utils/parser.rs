use scanforge::core::models::constraint::DistanceConstraint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error(
        "Invalid constraint format for '{0}'. Expected 'I,J,DIST' with 0-based atom indices (e.g., '3,7,1.20')."
    )]
    InvalidConstraintFormat(String),

    #[error("Invalid atom index '{value}' in constraint '{input}'.")]
    InvalidIndex { input: String, value: String },

    #[error("Invalid distance '{value}' in constraint '{input}'.")]
    InvalidDistance { input: String, value: String },
}

/// Parses a `--constraint` argument of the form `I,J,DIST`.
///
/// Only the syntax is checked here; index ranges and distance positivity are
/// validated against the molecule when the jobs are planned.
pub fn parse_constraint(input: &str) -> Result<DistanceConstraint, ParseError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [i_str, j_str, dist_str] = parts.as_slice() else {
        return Err(ParseError::InvalidConstraintFormat(input.to_string()));
    };

    let i = parse_index(input, i_str)?;
    let j = parse_index(input, j_str)?;
    let distance: f64 = dist_str.parse().map_err(|_| ParseError::InvalidDistance {
        input: input.to_string(),
        value: dist_str.to_string(),
    })?;

    Ok(DistanceConstraint::new(i, j, distance))
}

fn parse_index(input: &str, token: &str) -> Result<usize, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidIndex {
        input: input.to_string(),
        value: token.to_string(),
    })
}
