use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Scanforge CLI - A command-line interface for generating constrained CP2K MD and Molpro geometry-optimization input decks along bond-dissociation scans.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate CP2K constrained-MD input decks for a distance scan.
    Md(MdArgs),
    /// Generate Molpro constrained geometry-optimization input decks.
    Opt(OptArgs),
    /// Inspect or export the built-in deck templates.
    Templates(TemplatesArgs),
}

/// Arguments shared by the generation subcommands.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to the input geometry file in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub geometry: PathBuf,

    /// Directory the decks, relaxed geometries, and manifest are written into.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Path to the scan configuration file in TOML format.
    /// Defaults to 'scanforge.toml' in the working directory when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate a single job from this constraint instead of planning a scan.
    /// Can be used multiple times. Atom indices are 0-based.
    #[arg(long = "constraint", value_name = "I,J,DIST")]
    pub constraints: Vec<String>,

    /// Job name for single-job generation. Defaults to the geometry file stem.
    #[arg(long, value_name = "NAME", requires = "constraints")]
    pub name: Option<String>,

    /// Directory of template files overriding the built-in deck templates.
    #[arg(short, long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Skip writing the manifest.csv job index.
    #[arg(long)]
    pub no_manifest: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S md.steps=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `md` subcommand.
#[derive(Args, Debug)]
pub struct MdArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the total number of MD steps from the config file.
    #[arg(long, value_name = "INT")]
    pub steps: Option<u32>,

    /// Override the integration timestep in femtoseconds.
    #[arg(long, value_name = "FLOAT")]
    pub timestep: Option<f64>,

    /// Override the thermostat temperature in Kelvin.
    #[arg(short = 'T', long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Override how many MD steps pass between trajectory dumps.
    #[arg(long, value_name = "INT")]
    pub dump_frequency: Option<u32>,

    /// Override the net charge of the system.
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub charge: Option<i32>,

    /// Override `md.radical` from the config file.
    #[command(flatten)]
    pub radical: RadicalFlags,

    /// Override the simulation cell line, e.g. 'ABC 20.0 20.0 20.0'.
    #[arg(long, value_name = "CELL")]
    pub cell: Option<String>,
}

/// A group to handle mutually exclusive boolean flags for open-shell systems.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct RadicalFlags {
    /// Treat the system as an open-shell radical (spin-unrestricted DFT).
    #[arg(long)]
    pub radical: bool,
    /// Force closed-shell DFT, overriding the config file.
    #[arg(long)]
    pub no_radical: bool,
}

/// Arguments for the `opt` subcommand.
#[derive(Args, Debug)]
pub struct OptArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `templates` subcommand.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommands,
}

/// Available commands for template management.
#[derive(Subcommand, Debug)]
pub enum TemplatesCommands {
    /// List the built-in templates and the placeholders they mention.
    List,
    /// Write the built-in templates into a directory for customization.
    Export {
        /// The directory to write the template files into.
        #[arg(required = true, value_name = "PATH")]
        dir: PathBuf,
        /// Overwrite template files that already exist.
        #[arg(long)]
        force: bool,
    },
}
