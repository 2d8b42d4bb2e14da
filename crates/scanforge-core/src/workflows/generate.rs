use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::decks::cp2k::{self, DeckError};
use crate::core::decks::molpro;
use crate::core::io::traits::GeometryFile;
use crate::core::io::xyz::{XyzError, XyzFile, XyzMetadata};
use crate::core::models::constraint::DistanceConstraint;
use crate::core::models::molecule::Molecule;
use crate::engine::config::GenerateConfig;
use crate::engine::error::EngineError;
use crate::engine::minimize;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scan::{self, ScanJob};

/// Represents errors that can occur while running a generation workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Constraint validation or pre-relaxation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Deck rendering failed.
    #[error(transparent)]
    Deck(#[from] DeckError),
    /// A geometry file could not be written.
    #[error("failed to write geometry: {0}")]
    Geometry(#[from] XyzError),
    /// The output directory could not be created.
    #[error("failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A deck file could not be written.
    #[error("failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The manifest could not be written.
    #[error("failed to write manifest '{path}': {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One row of the batch manifest, describing a generated job.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    /// Job name; also the stem of the files the job produced.
    pub name: String,
    /// File name of the rendered deck, relative to the output directory.
    pub deck_file: String,
    /// File name of the relaxed geometry, relative to the output directory.
    pub geometry_file: String,
    /// The job's constraints as `i-j=d` pairs joined with `;`.
    pub constraints: String,
    /// Force-field energy of the relaxed geometry, kcal/mol.
    pub energy: f64,
    /// Largest deviation of a restrained distance from its target, Angstroms.
    pub max_restraint_deviation: f64,
    /// Whether the pre-relaxation converged inside its step budget.
    pub converged: bool,
}

/// The deck format a generation run produces.
#[derive(Debug, Clone, Copy)]
enum DeckFormat {
    Cp2kMd,
    MolproOpt,
}

impl DeckFormat {
    fn deck_file(self, name: &str) -> String {
        match self {
            Self::Cp2kMd => format!("{name}.inp"),
            Self::MolproOpt => format!("{name}.com"),
        }
    }

    fn render(
        self,
        config: &GenerateConfig,
        name: &str,
        molecule: &Molecule,
        constraints: &[DistanceConstraint],
    ) -> Result<String, DeckError> {
        match self {
            Self::Cp2kMd => cp2k::render_md_deck(
                &config.templates,
                &config.kinds,
                name,
                molecule,
                constraints,
                &config.md,
            ),
            Self::MolproOpt => molpro::render_opt_deck(&config.templates, name, molecule, constraints),
        }
    }

    fn write_geometry(
        self,
        molecule: &Molecule,
        metadata: &XyzMetadata,
        path: &std::path::Path,
    ) -> Result<(), XyzError> {
        match self {
            // CP2K reads plain element symbols; Molpro needs the labelled
            // block its constraint lines refer to.
            Self::Cp2kMd => XyzFile::write_to_path(molecule, metadata, path),
            Self::MolproOpt => XyzFile::write_labelled_to_path(molecule, metadata, path),
        }
    }
}

/// Generates CP2K constrained-MD inputs for a batch of scan jobs.
///
/// Each job's geometry is pre-relaxed under its constraints and written next
/// to its deck as `<name>.xyz`; the deck lands in `<name>.inp`. When enabled
/// in the config, a `manifest.csv` indexing every job closes the batch.
///
/// # Errors
///
/// Fails before writing anything if the MD parameters are invalid, a job name
/// repeats, or any constraint is malformed; later failures surface I/O,
/// parameterization, and rendering problems per job.
#[instrument(skip_all, name = "md_batch_workflow")]
pub fn run_md_batch(
    molecule: &Molecule,
    jobs: &[ScanJob],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<JobRecord>, WorkflowError> {
    config.md.validate()?;
    run_batch(molecule, jobs, config, reporter, DeckFormat::Cp2kMd)
}

/// Generates Molpro constrained-optimization inputs for a batch of scan jobs.
///
/// Like [`run_md_batch`], but decks land in `<name>.com` and geometries are
/// written with labelled atoms so the decks' constraint lines can name them.
#[instrument(skip_all, name = "opt_batch_workflow")]
pub fn run_opt_batch(
    molecule: &Molecule,
    jobs: &[ScanJob],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<JobRecord>, WorkflowError> {
    run_batch(molecule, jobs, config, reporter, DeckFormat::MolproOpt)
}

/// Generates a single CP2K constrained-MD input without a manifest.
#[instrument(skip_all, name = "md_workflow")]
pub fn run_md(
    molecule: &Molecule,
    name: &str,
    constraints: &[DistanceConstraint],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
) -> Result<JobRecord, WorkflowError> {
    config.md.validate()?;
    run_single(molecule, name, constraints, config, reporter, DeckFormat::Cp2kMd)
}

/// Generates a single Molpro constrained-optimization input without a manifest.
#[instrument(skip_all, name = "opt_workflow")]
pub fn run_opt(
    molecule: &Molecule,
    name: &str,
    constraints: &[DistanceConstraint],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
) -> Result<JobRecord, WorkflowError> {
    run_single(molecule, name, constraints, config, reporter, DeckFormat::MolproOpt)
}

fn run_batch(
    molecule: &Molecule,
    jobs: &[ScanJob],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
    format: DeckFormat,
) -> Result<Vec<JobRecord>, WorkflowError> {
    // === Phase 0: Validation and output directory ===
    reporter.report(Progress::StageStart {
        name: "Preparation",
    });
    info!(
        jobs = jobs.len(),
        output_dir = %config.output_dir.display(),
        "Starting batch generation."
    );

    let mut names = HashSet::new();
    for job in jobs {
        if !names.insert(job.name.as_str()) {
            return Err(EngineError::DuplicateJobName(job.name.clone()).into());
        }
        scan::validate_constraints(molecule, &job.constraints)?;
    }
    create_output_dir(config)?;
    reporter.report(Progress::StageFinish);

    // === Phase 1: Relax, render, and write each job ===
    reporter.report(Progress::BatchStart {
        total_jobs: jobs.len() as u64,
    });
    let mut records = Vec::with_capacity(jobs.len());
    for job in jobs {
        let record = generate_job(molecule, &job.name, &job.constraints, config, format)?;
        if !record.converged {
            reporter.report(Progress::Message(format!(
                "Job '{}' did not fully relax; largest restraint deviation {:.3} A.",
                job.name, record.max_restraint_deviation
            )));
        }
        reporter.report(Progress::JobFinished {
            name: job.name.clone(),
        });
        records.push(record);
    }
    reporter.report(Progress::BatchFinish);

    // === Phase 2: Manifest ===
    if config.write_manifest {
        write_manifest(&records, config)?;
    }

    info!(jobs = records.len(), "Batch generation complete.");
    Ok(records)
}

fn run_single(
    molecule: &Molecule,
    name: &str,
    constraints: &[DistanceConstraint],
    config: &GenerateConfig,
    reporter: &ProgressReporter,
    format: DeckFormat,
) -> Result<JobRecord, WorkflowError> {
    reporter.report(Progress::StageStart { name: "Generation" });
    info!(job = name, "Generating single input.");

    scan::validate_constraints(molecule, constraints)?;
    create_output_dir(config)?;
    let record = generate_job(molecule, name, constraints, config, format)?;

    reporter.report(Progress::StageFinish);
    Ok(record)
}

fn generate_job(
    molecule: &Molecule,
    name: &str,
    constraints: &[DistanceConstraint],
    config: &GenerateConfig,
    format: DeckFormat,
) -> Result<JobRecord, WorkflowError> {
    debug!(job = name, "Relaxing constrained geometry.");
    let relaxation = minimize::relax(molecule, constraints, &config.relax)?;
    if !relaxation.converged {
        warn!(
            job = name,
            max_force = relaxation.max_force,
            "Relaxation stopped at the step budget; using the geometry as-is."
        );
    }
    let relaxed = molecule.with_positions(&relaxation.positions);

    let deck = format.render(config, name, &relaxed, constraints)?;
    let deck_file = format.deck_file(name);
    let deck_path = config.output_dir.join(&deck_file);
    fs::write(&deck_path, deck).map_err(|e| WorkflowError::WriteFile {
        path: deck_path,
        source: e,
    })?;

    let geometry_file = format!("{name}.xyz");
    let geometry_path = config.output_dir.join(&geometry_file);
    format.write_geometry(&relaxed, &XyzMetadata::new(name), &geometry_path)?;

    debug!(
        job = name,
        energy = relaxation.energy,
        deviation = relaxation.max_restraint_deviation,
        "Job files written."
    );
    Ok(JobRecord {
        name: name.to_string(),
        deck_file,
        geometry_file,
        constraints: join_constraints(constraints),
        energy: relaxation.energy,
        max_restraint_deviation: relaxation.max_restraint_deviation,
        converged: relaxation.converged,
    })
}

fn create_output_dir(config: &GenerateConfig) -> Result<(), WorkflowError> {
    fs::create_dir_all(&config.output_dir).map_err(|e| WorkflowError::OutputDir {
        path: config.output_dir.clone(),
        source: e,
    })
}

fn write_manifest(records: &[JobRecord], config: &GenerateConfig) -> Result<(), WorkflowError> {
    let path = config.output_dir.join("manifest.csv");
    let manifest_error = |source: csv::Error| WorkflowError::Manifest {
        path: config.output_dir.join("manifest.csv"),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(manifest_error)?;
    for record in records {
        writer.serialize(record).map_err(manifest_error)?;
    }
    writer.flush().map_err(|e| manifest_error(e.into()))?;
    debug!(path = %path.display(), rows = records.len(), "Manifest written.");
    Ok(())
}

fn join_constraints(constraints: &[DistanceConstraint]) -> String {
    constraints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}
