use crate::core::decks::cp2k::MdParams;
use crate::core::decks::kinds::KindTable;
use crate::core::decks::template::TemplateSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Parameters for the constrained pre-relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxConfig {
    /// Upper bound on conjugate-gradient steps. Reaching it is not an error;
    /// the geometry is simply taken as-is.
    pub max_steps: u32,
    /// Convergence threshold on the largest per-atom force magnitude,
    /// kcal/mol/A.
    pub force_tolerance: f64,
    /// Spring constant of the harmonic distance restraints, kcal/mol/A^2.
    pub restraint_strength: f64,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            max_steps: 500,
            force_tolerance: 0.05,
            restraint_strength: 500.0,
        }
    }
}

/// Everything a batch generation run needs besides the molecule and the jobs.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory decks, geometries, and the manifest are written into.
    pub output_dir: PathBuf,
    /// CP2K MD parameters; ignored by optimization batches.
    pub md: MdParams,
    /// Pre-relaxation settings.
    pub relax: RelaxConfig,
    /// The deck templates to render.
    pub templates: TemplateSet,
    /// Element kind table for CP2K decks; ignored by optimization batches.
    pub kinds: KindTable,
    /// Whether to write a `manifest.csv` job index next to the decks.
    pub write_manifest: bool,
}

#[derive(Default)]
pub struct GenerateConfigBuilder {
    output_dir: Option<PathBuf>,
    md: Option<MdParams>,
    relax: Option<RelaxConfig>,
    templates: Option<TemplateSet>,
    kinds: Option<KindTable>,
    write_manifest: Option<bool>,
}

impl GenerateConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn md_params(mut self, params: MdParams) -> Self {
        self.md = Some(params);
        self
    }
    pub fn relax(mut self, config: RelaxConfig) -> Self {
        self.relax = Some(config);
        self
    }
    pub fn templates(mut self, templates: TemplateSet) -> Self {
        self.templates = Some(templates);
        self
    }
    pub fn kinds(mut self, kinds: KindTable) -> Self {
        self.kinds = Some(kinds);
        self
    }
    pub fn write_manifest(mut self, write: bool) -> Self {
        self.write_manifest = Some(write);
        self
    }

    pub fn build(self) -> Result<GenerateConfig, ConfigError> {
        Ok(GenerateConfig {
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            md: self.md.unwrap_or_default(),
            relax: self.relax.unwrap_or_default(),
            templates: self.templates.unwrap_or_else(TemplateSet::embedded),
            kinds: self.kinds.unwrap_or_else(KindTable::embedded),
            write_manifest: self.write_manifest.unwrap_or(true),
        })
    }
}
