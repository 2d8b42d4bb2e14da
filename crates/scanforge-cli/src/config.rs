use crate::cli::{CommonArgs, MdArgs, RadicalFlags};
use crate::error::{CliError, Result};
use scanforge::core::decks::cp2k::MdParams;
use scanforge::core::decks::kinds::KindTable;
use scanforge::core::decks::template::TemplateSet;
use scanforge::core::models::element::Element;
use scanforge::engine::config::{GenerateConfig, GenerateConfigBuilder, RelaxConfig};
use scanforge::engine::scan::ScanSpec;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scanforge.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialScanConfig {
    bond: Option<[String; 2]>,
    #[serde(rename = "target-atom")]
    target_atom: Option<usize>,
    distances: Option<Vec<f64>>,
    #[serde(rename = "target-distances")]
    target_distances: Option<Vec<f64>>,
    #[serde(rename = "skip-beyond")]
    skip_beyond: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialMdConfig {
    steps: Option<u32>,
    timestep: Option<f64>,
    temperature: Option<f64>,
    #[serde(rename = "dump-frequency")]
    dump_frequency: Option<u32>,
    charge: Option<i32>,
    radical: Option<bool>,
    cell: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialRelaxConfig {
    #[serde(rename = "max-steps")]
    max_steps: Option<u32>,
    #[serde(rename = "force-tolerance")]
    force_tolerance: Option<f64>,
    #[serde(rename = "restraint-strength")]
    restraint_strength: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTemplatesConfig {
    dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialKindsConfig {
    file: Option<PathBuf>,
    patch: Option<HashMap<String, u32>>,
}

/// The TOML configuration file as written by the user, every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialGenerateConfig {
    scan: Option<PartialScanConfig>,
    md: Option<PartialMdConfig>,
    relax: Option<PartialRelaxConfig>,
    templates: Option<PartialTemplatesConfig>,
    kinds: Option<PartialKindsConfig>,
    #[serde(rename = "write-manifest")]
    write_manifest: Option<bool>,
}

/// The fully merged settings a generation subcommand runs with.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub generate: GenerateConfig,
    /// Present when the config file carries a `[scan]` section.
    pub scan: Option<ScanSpec>,
}

impl PartialGenerateConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the explicit config file, or `scanforge.toml` from the working
    /// directory when one exists, or falls back to an empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let discovered = Path::new(DEFAULT_CONFIG_FILE);
        if discovered.is_file() {
            return Self::from_file(discovered);
        }
        debug!("No configuration file found; using built-in defaults");
        Ok(Self::default())
    }

    /// Merges the file with `md` subcommand arguments. CLI flags win over
    /// `--set` pairs, which win over the file, which wins over defaults.
    pub fn resolve_md(mut self, args: &MdArgs) -> Result<ResolvedConfig> {
        self.apply_set_values(&args.common.set_values)?;

        let scan = self.build_scan_spec()?;
        let md_file = self.md.take().unwrap_or_default();
        let defaults = MdParams::default();
        let md = MdParams {
            steps: args.steps.or(md_file.steps).unwrap_or(defaults.steps),
            timestep: args
                .timestep
                .or(md_file.timestep)
                .unwrap_or(defaults.timestep),
            temperature: args
                .temperature
                .or(md_file.temperature)
                .unwrap_or(defaults.temperature),
            dump_frequency: args
                .dump_frequency
                .or(md_file.dump_frequency)
                .unwrap_or(defaults.dump_frequency),
            charge: args.charge.or(md_file.charge).unwrap_or(defaults.charge),
            radical: Self::merge_radical(args.radical, md_file.radical),
            cell: args.cell.clone().or(md_file.cell).unwrap_or(defaults.cell),
        };

        let generate = self.build_generate(&args.common, Some(md))?;
        Ok(ResolvedConfig { generate, scan })
    }

    /// Merges the file with `opt` subcommand arguments. The `[md]` section is
    /// ignored; optimization decks carry no MD parameters.
    pub fn resolve_opt(mut self, common: &CommonArgs) -> Result<ResolvedConfig> {
        self.apply_set_values(&common.set_values)?;

        let scan = self.build_scan_spec()?;
        let generate = self.build_generate(common, None)?;
        Ok(ResolvedConfig { generate, scan })
    }

    fn build_generate(
        &mut self,
        common: &CommonArgs,
        md: Option<MdParams>,
    ) -> Result<GenerateConfig> {
        let relax_file = self.relax.take().unwrap_or_default();
        let relax_defaults = RelaxConfig::default();
        let relax = RelaxConfig {
            max_steps: relax_file.max_steps.unwrap_or(relax_defaults.max_steps),
            force_tolerance: relax_file
                .force_tolerance
                .unwrap_or(relax_defaults.force_tolerance),
            restraint_strength: relax_file
                .restraint_strength
                .unwrap_or(relax_defaults.restraint_strength),
        };

        let template_dir = common
            .templates
            .as_ref()
            .or(self.templates.as_ref().and_then(|t| t.dir.as_ref()));
        let templates = match template_dir {
            Some(dir) => TemplateSet::from_dir(dir)?,
            None => TemplateSet::embedded(),
        };

        let kinds_file = self.kinds.take().unwrap_or_default();
        let mut kinds = match kinds_file.file {
            Some(path) => KindTable::from_path(&path)?,
            None => KindTable::embedded(),
        };
        if let Some(patch) = &kinds_file.patch {
            kinds.merge(patch);
        }

        let write_manifest = if common.no_manifest {
            false
        } else {
            self.write_manifest.unwrap_or(true)
        };

        let mut builder = GenerateConfigBuilder::new()
            .output_dir(common.output_dir.clone())
            .relax(relax)
            .templates(templates)
            .kinds(kinds)
            .write_manifest(write_manifest);
        if let Some(md) = md {
            builder = builder.md_params(md);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_radical(cli_flags: RadicalFlags, file_val: Option<bool>) -> bool {
        if cli_flags.radical {
            true
        } else if cli_flags.no_radical {
            false
        } else {
            file_val.unwrap_or(false)
        }
    }

    fn build_scan_spec(&mut self) -> Result<Option<ScanSpec>> {
        let Some(partial) = self.scan.take() else {
            return Ok(None);
        };

        let require = |key: &'static str| {
            CliError::Config(format!(
                "`scan.{}` is required when a [scan] section is present.",
                key
            ))
        };

        let [pivot, partner] = partial.bond.ok_or_else(|| require("bond"))?;
        let bond = (
            Element::from_str(&pivot).map_err(|e| CliError::Argument(e.to_string()))?,
            Element::from_str(&partner).map_err(|e| CliError::Argument(e.to_string()))?,
        );

        Ok(Some(ScanSpec {
            bond,
            target_atom: partial.target_atom.ok_or_else(|| require("target-atom"))?,
            distances: partial.distances.ok_or_else(|| require("distances"))?,
            target_distances: partial
                .target_distances
                .ok_or_else(|| require("target-distances"))?,
            skip_beyond: partial.skip_beyond,
        }))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        if set_values.is_empty() {
            return Ok(());
        }
        for kv_pair in set_values {
            let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            }
            let key = parts[0];
            let value = parts[1];

            match key {
                "md.steps" => {
                    self.md.get_or_insert_with(Default::default).steps =
                        Some(parse_value(key, value, "integer")?);
                }
                "md.timestep" => {
                    self.md.get_or_insert_with(Default::default).timestep =
                        Some(parse_value(key, value, "float")?);
                }
                "md.temperature" => {
                    self.md.get_or_insert_with(Default::default).temperature =
                        Some(parse_value(key, value, "float")?);
                }
                "md.dump-frequency" => {
                    self.md.get_or_insert_with(Default::default).dump_frequency =
                        Some(parse_value(key, value, "integer")?);
                }
                "md.charge" => {
                    self.md.get_or_insert_with(Default::default).charge =
                        Some(parse_value(key, value, "integer")?);
                }
                "md.radical" => {
                    self.md.get_or_insert_with(Default::default).radical =
                        Some(parse_value(key, value, "boolean")?);
                }
                "md.cell" => {
                    self.md.get_or_insert_with(Default::default).cell = Some(value.to_string());
                }
                "relax.max-steps" => {
                    self.relax.get_or_insert_with(Default::default).max_steps =
                        Some(parse_value(key, value, "integer")?);
                }
                "relax.force-tolerance" => {
                    self.relax
                        .get_or_insert_with(Default::default)
                        .force_tolerance = Some(parse_value(key, value, "float")?);
                }
                "relax.restraint-strength" => {
                    self.relax
                        .get_or_insert_with(Default::default)
                        .restraint_strength = Some(parse_value(key, value, "float")?);
                }
                "scan.target-atom" => {
                    self.scan.get_or_insert_with(Default::default).target_atom =
                        Some(parse_value(key, value, "integer")?);
                }
                "scan.skip-beyond" => {
                    self.scan.get_or_insert_with(Default::default).skip_beyond =
                        Some(parse_value(key, value, "float")?);
                }
                "write-manifest" => {
                    self.write_manifest = Some(parse_value(key, value, "boolean")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    const SCAN_SECTION: &str = r#"
[scan]
bond = ["C", "H"]
target-atom = 4
distances = [1.1, 1.4]
target-distances = [1.2, 1.6]
skip-beyond = 1.5
"#;

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn get_minimal_cli_args(config_path: &Path) -> Vec<String> {
        vec![
            "scanforge".to_string(),
            "md".to_string(),
            "-g".to_string(),
            "mol.xyz".to_string(),
            "-c".to_string(),
            config_path.to_str().unwrap().to_string(),
        ]
    }

    fn resolve(args: Vec<String>, config_path: &Path) -> Result<ResolvedConfig> {
        let cli = Cli::parse_from(args);
        let Commands::Md(md_args) = cli.command else {
            panic!("Expected 'md' subcommand");
        };
        PartialGenerateConfig::from_file(config_path)?.resolve_md(&md_args)
    }

    #[test]
    fn file_values_merge_with_defaults() {
        let content = format!("{SCAN_SECTION}\n[md]\nsteps = 800\nradical = true\n");
        let config_path = write_config_file("config_defaults.toml", &content);

        let resolved = resolve(get_minimal_cli_args(&config_path), &config_path).unwrap();

        assert_eq!(resolved.generate.md.steps, 800);
        assert!(resolved.generate.md.radical);
        assert!((resolved.generate.md.timestep - 0.25).abs() < 1e-12);
        assert_eq!(resolved.generate.md.dump_frequency, 100);
        assert_eq!(resolved.generate.relax.max_steps, 500);
        assert!(resolved.generate.write_manifest);

        let scan = resolved.scan.unwrap();
        assert_eq!(scan.bond.0, Element::from_str("C").unwrap());
        assert_eq!(scan.bond.1, Element::from_str("H").unwrap());
        assert_eq!(scan.target_atom, 4);
        assert_eq!(scan.distances, vec![1.1, 1.4]);
        assert_eq!(scan.skip_beyond, Some(1.5));
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let content = format!("{SCAN_SECTION}\n[md]\nsteps = 800\ntemperature = 350.0\n");
        let config_path = write_config_file("config_override.toml", &content);

        let mut args = get_minimal_cli_args(&config_path);
        args.extend_from_slice(&[
            "--steps".to_string(),
            "1200".to_string(),
            "-T".to_string(),
            "500.0".to_string(),
            "--radical".to_string(),
        ]);
        let resolved = resolve(args, &config_path).unwrap();

        assert_eq!(resolved.generate.md.steps, 1200);
        assert!((resolved.generate.md.temperature - 500.0).abs() < 1e-12);
        assert!(resolved.generate.md.radical);
    }

    #[test]
    fn set_values_override_the_file() {
        let content = format!("{SCAN_SECTION}\n[md]\nsteps = 800\n");
        let config_path = write_config_file("config_set.toml", &content);

        let mut args = get_minimal_cli_args(&config_path);
        args.extend_from_slice(&[
            "-S".to_string(),
            "md.steps=250".to_string(),
            "-S".to_string(),
            "relax.force-tolerance=0.2".to_string(),
            "-S".to_string(),
            "write-manifest=false".to_string(),
        ]);
        let resolved = resolve(args, &config_path).unwrap();

        assert_eq!(resolved.generate.md.steps, 250);
        assert!((resolved.generate.relax.force_tolerance - 0.2).abs() < 1e-12);
        assert!(!resolved.generate.write_manifest);
    }

    #[test]
    fn no_radical_flag_overrides_the_file() {
        let content = format!("{SCAN_SECTION}\n[md]\nradical = true\n");
        let config_path = write_config_file("config_radical.toml", &content);

        let mut args = get_minimal_cli_args(&config_path);
        args.push("--no-radical".to_string());
        let resolved = resolve(args, &config_path).unwrap();

        assert!(!resolved.generate.md.radical);
    }

    #[test]
    fn no_manifest_flag_overrides_the_file() {
        let content = format!("write-manifest = true\n{SCAN_SECTION}");
        let config_path = write_config_file("config_manifest.toml", &content);

        let mut args = get_minimal_cli_args(&config_path);
        args.push("--no-manifest".to_string());
        let resolved = resolve(args, &config_path).unwrap();

        assert!(!resolved.generate.write_manifest);
    }

    #[test]
    fn missing_scan_key_is_a_config_error() {
        let content = r#"
[scan]
bond = ["C", "H"]
distances = [1.1]
target-distances = [1.2]
"#;
        let config_path = write_config_file("config_incomplete_scan.toml", content);

        let err = resolve(get_minimal_cli_args(&config_path), &config_path).unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("scan.target-atom"));
    }

    #[test]
    fn invalid_bond_symbol_is_an_argument_error() {
        let content = r#"
[scan]
bond = ["C", "123"]
target-atom = 0
distances = [1.1]
target-distances = [1.2]
"#;
        let config_path = write_config_file("config_bad_bond.toml", content);

        let err = resolve(get_minimal_cli_args(&config_path), &config_path).unwrap_err();

        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let config_path = write_config_file("config_set_key.toml", SCAN_SECTION);

        let mut args = get_minimal_cli_args(&config_path);
        args.extend_from_slice(&["-S".to_string(), "md.bogus=1".to_string()]);
        let err = resolve(args, &config_path).unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("Unsupported configuration key"));
    }

    #[test]
    fn unknown_file_key_is_a_parsing_error() {
        let config_path = write_config_file("config_typo.toml", "[md]\nstep = 800\n");

        let err = PartialGenerateConfig::from_file(&config_path).unwrap_err();

        assert!(matches!(err, CliError::FileParsing { .. }));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = PartialGenerateConfig::load(None).unwrap();

        assert!(config.scan.is_none());
        assert!(config.md.is_none());
        assert!(config.write_manifest.is_none());
    }
}
