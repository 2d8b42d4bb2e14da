use super::JobPlan;
use crate::cli::OptArgs;
use crate::config::PartialGenerateConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use scanforge::{
    core::io::{traits::GeometryFile, xyz::XyzFile},
    engine::progress::ProgressReporter,
    workflows::generate,
};
use tracing::info;

pub fn run(args: OptArgs) -> Result<()> {
    let partial_config = PartialGenerateConfig::load(args.common.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let resolved = partial_config.resolve_opt(&args.common)?;

    info!("Loading input geometry from {:?}", &args.common.geometry);
    let (molecule, _) =
        XyzFile::read_from_path(&args.common.geometry).map_err(|e| CliError::FileParsing {
            path: args.common.geometry.clone(),
            source: e.into(),
        })?;

    let plan = super::build_plan(&args.common, &molecule, resolved.scan.as_ref())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    match plan {
        JobPlan::Single { name, constraints } => {
            info!("Invoking the single-deck optimization workflow...");
            let record =
                generate::run_opt(&molecule, &name, &constraints, &resolved.generate, &reporter)?;

            println!(
                "✓ Input written to: {} (relaxed energy: {:.4} kcal/mol)",
                resolved.generate.output_dir.join(&record.deck_file).display(),
                record.energy
            );
        }
        JobPlan::Batch(jobs) => {
            println!(
                "Generating {} constrained-optimization input deck(s)...",
                jobs.len()
            );
            info!("Invoking the batch optimization workflow...");
            let records = generate::run_opt_batch(&molecule, &jobs, &resolved.generate, &reporter)?;

            println!(
                "✓ {} input(s) written to: {}",
                records.len(),
                resolved.generate.output_dir.display()
            );
        }
    }

    Ok(())
}
