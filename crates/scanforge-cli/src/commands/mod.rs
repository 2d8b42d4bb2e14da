pub mod md;
pub mod opt;
pub mod templates;

use crate::cli::CommonArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use scanforge::core::models::constraint::DistanceConstraint;
use scanforge::core::models::molecule::Molecule;
use scanforge::engine::scan::{ScanJob, ScanSpec};
use std::path::Path;

/// What a generation subcommand is about to produce: one explicitly specified
/// job or a batch planned from a scan section.
#[derive(Debug)]
pub(crate) enum JobPlan {
    Single {
        name: String,
        constraints: Vec<DistanceConstraint>,
    },
    Batch(Vec<ScanJob>),
}

/// Turns the command line into a concrete job plan.
///
/// `--constraint` arguments take precedence: they select single-job mode and
/// any `[scan]` section is ignored. Without them a scan section must be
/// present in the configuration.
pub(crate) fn build_plan(
    common: &CommonArgs,
    molecule: &Molecule,
    scan: Option<&ScanSpec>,
) -> Result<JobPlan> {
    if !common.constraints.is_empty() {
        let constraints = common
            .constraints
            .iter()
            .map(|text| parser::parse_constraint(text).map_err(|e| CliError::Argument(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        let name = match &common.name {
            Some(name) => name.clone(),
            None => default_job_name(&common.geometry)?,
        };
        return Ok(JobPlan::Single { name, constraints });
    }

    let spec = scan.ok_or_else(|| {
        CliError::Config(
            "No jobs to generate: provide --constraint arguments or a [scan] section in the config file."
                .to_string(),
        )
    })?;
    Ok(JobPlan::Batch(spec.plan(molecule)?))
}

fn default_job_name(geometry: &Path) -> Result<String> {
    geometry
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot derive a job name from geometry path '{}'; pass --name.",
                geometry.display()
            ))
        })
}
