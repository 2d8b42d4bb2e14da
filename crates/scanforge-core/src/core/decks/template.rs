//! Placeholder templates for simulation input decks.
//!
//! A template is plain text in which `$var_<name>` marks a scalar substitution
//! and `$block_<name>` marks a multi-line one. Rendering walks the text once:
//! placeholder values are inserted verbatim and are never re-scanned, so a
//! substituted value containing `$` survives untouched. A `$` that is not
//! followed by a `var_` or `block_` identifier is ordinary text.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the CP2K constrained-MD deck template.
pub const CP2K_MD_TEMPLATE: &str = "cp2k_md.inp.tmpl";
/// File name of the per-constraint `&COLLECTIVE` sub-template.
pub const CP2K_COLLECTIVE_TEMPLATE: &str = "cp2k_collective.tmpl";
/// File name of the per-constraint `&COLVAR` sub-template.
pub const CP2K_COLVAR_TEMPLATE: &str = "cp2k_colvar.tmpl";
/// File name of the per-element `&KIND` sub-template.
pub const CP2K_KIND_TEMPLATE: &str = "cp2k_kind.tmpl";
/// File name of the Molpro constrained-optimization deck template.
pub const MOLPRO_OPT_TEMPLATE: &str = "molpro_opt.com.tmpl";

const EMBEDDED_CP2K_MD: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cp2k_md.inp.tmpl"));
const EMBEDDED_CP2K_COLLECTIVE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cp2k_collective.tmpl"));
const EMBEDDED_CP2K_COLVAR: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cp2k_colvar.tmpl"));
const EMBEDDED_CP2K_KIND: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cp2k_kind.tmpl"));
const EMBEDDED_MOLPRO_OPT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/molpro_opt.com.tmpl"));

/// Represents errors that can occur while rendering a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder in the template had no value in the substitution map.
    #[error("template '{template}' leaves placeholder '${name}' unresolved")]
    UnresolvedPlaceholder {
        /// The name of the template being rendered.
        template: String,
        /// The full placeholder identifier, including its `var_` or `block_` prefix.
        name: String,
    },
}

/// Represents errors that can occur while loading templates from disk.
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    /// A template file exists but could not be read.
    #[error("failed to read template '{path}': {source}")]
    Io {
        /// The path of the offending file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A named piece of placeholder text.
///
/// The name is only used to give rendering errors a useful context; the text is
/// kept verbatim and scanned lazily on each [`render`](Template::render) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    /// Creates a template from its name and raw text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Returns the name of this template.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw, unrendered text of this template.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Collects every placeholder identifier mentioned in the template.
    ///
    /// Identifiers keep their `var_` or `block_` prefix and are returned in
    /// sorted order.
    pub fn placeholders(&self) -> BTreeSet<&str> {
        let mut found = BTreeSet::new();
        let mut rest = self.text.as_str();
        while let Some(pos) = rest.find('$') {
            let after = &rest[pos + 1..];
            let ident = leading_identifier(after);
            if is_placeholder(ident) {
                found.insert(ident);
                rest = &after[ident.len()..];
            } else {
                rest = after;
            }
        }
        found
    }

    /// Renders the template by substituting every placeholder from `subs`.
    ///
    /// # Arguments
    ///
    /// * `subs` - The substitution map providing a value for each placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnresolvedPlaceholder`] if the template mentions
    /// a placeholder that `subs` does not define. Keys in `subs` that the
    /// template never mentions are ignored.
    pub fn render(&self, subs: &Substitutions) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let ident = leading_identifier(after);
            if is_placeholder(ident) {
                let value = subs.get(ident).ok_or_else(|| {
                    TemplateError::UnresolvedPlaceholder {
                        template: self.name.clone(),
                        name: ident.to_string(),
                    }
                })?;
                out.push_str(value);
                rest = &after[ident.len()..];
            } else {
                out.push('$');
                rest = after;
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Returns the longest run of identifier characters at the start of `text`.
fn leading_identifier(text: &str) -> &str {
    let len = text
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    &text[..len]
}

/// Checks whether an identifier names a placeholder rather than ordinary text.
fn is_placeholder(ident: &str) -> bool {
    ident.starts_with("var_") || ident.starts_with("block_")
}

/// A map from placeholder names to their rendered values.
///
/// Scalar values are set through [`var`](Substitutions::var) and accept
/// anything displayable; multi-line sections go through
/// [`block`](Substitutions::block). Both take the bare name without its
/// `var_`/`block_` prefix.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: HashMap<String, String>,
}

impl Substitutions {
    /// Creates an empty substitution map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of the `$var_<name>` placeholder.
    #[must_use]
    pub fn var(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.values.insert(format!("var_{name}"), value.to_string());
        self
    }

    /// Sets the text of the `$block_<name>` placeholder.
    #[must_use]
    pub fn block(mut self, name: &str, text: impl Into<String>) -> Self {
        self.values.insert(format!("block_{name}"), text.into());
        self
    }

    /// Looks up the value of a full placeholder identifier.
    pub fn get(&self, ident: &str) -> Option<&str> {
        self.values.get(ident).map(String::as_str)
    }
}

/// The full set of templates the deck builders draw from.
///
/// Defaults are compiled into the library; any member can be replaced by a
/// like-named file in a user-supplied template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    /// Top-level CP2K constrained-MD deck.
    pub cp2k_md: Template,
    /// Per-constraint `&COLLECTIVE` section referenced from the MD deck.
    pub cp2k_collective: Template,
    /// Per-constraint `&COLVAR` section defining the constrained distance.
    pub cp2k_colvar: Template,
    /// Per-element `&KIND` section naming basis set and pseudopotential.
    pub cp2k_kind: Template,
    /// Top-level Molpro constrained-optimization deck.
    pub molpro_opt: Template,
}

impl TemplateSet {
    /// Returns the built-in template set.
    pub fn embedded() -> Self {
        Self {
            cp2k_md: Template::new(CP2K_MD_TEMPLATE, EMBEDDED_CP2K_MD),
            cp2k_collective: Template::new(CP2K_COLLECTIVE_TEMPLATE, EMBEDDED_CP2K_COLLECTIVE),
            cp2k_colvar: Template::new(CP2K_COLVAR_TEMPLATE, EMBEDDED_CP2K_COLVAR),
            cp2k_kind: Template::new(CP2K_KIND_TEMPLATE, EMBEDDED_CP2K_KIND),
            molpro_opt: Template::new(MOLPRO_OPT_TEMPLATE, EMBEDDED_MOLPRO_OPT),
        }
    }

    /// Loads a template set from a directory, falling back to the built-ins.
    ///
    /// Each member is read from the file of the same name under `dir`; a
    /// missing file keeps the embedded default, so a directory holding a single
    /// customized template is enough to override just that one.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory to look up template files in.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLoadError::Io`] if a template file exists but cannot
    /// be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateLoadError> {
        let dir = dir.as_ref();
        let defaults = Self::embedded();
        Ok(Self {
            cp2k_md: load_or(dir, CP2K_MD_TEMPLATE, defaults.cp2k_md)?,
            cp2k_collective: load_or(dir, CP2K_COLLECTIVE_TEMPLATE, defaults.cp2k_collective)?,
            cp2k_colvar: load_or(dir, CP2K_COLVAR_TEMPLATE, defaults.cp2k_colvar)?,
            cp2k_kind: load_or(dir, CP2K_KIND_TEMPLATE, defaults.cp2k_kind)?,
            molpro_opt: load_or(dir, MOLPRO_OPT_TEMPLATE, defaults.molpro_opt)?,
        })
    }

    /// Lists the file name and built-in text of every template.
    ///
    /// The order matches the file name constants in this module.
    pub fn embedded_files() -> [(&'static str, &'static str); 5] {
        [
            (CP2K_MD_TEMPLATE, EMBEDDED_CP2K_MD),
            (CP2K_COLLECTIVE_TEMPLATE, EMBEDDED_CP2K_COLLECTIVE),
            (CP2K_COLVAR_TEMPLATE, EMBEDDED_CP2K_COLVAR),
            (CP2K_KIND_TEMPLATE, EMBEDDED_CP2K_KIND),
            (MOLPRO_OPT_TEMPLATE, EMBEDDED_MOLPRO_OPT),
        ]
    }

    /// Iterates over the templates in this set, paired with their file names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Template)> {
        [
            (CP2K_MD_TEMPLATE, &self.cp2k_md),
            (CP2K_COLLECTIVE_TEMPLATE, &self.cp2k_collective),
            (CP2K_COLVAR_TEMPLATE, &self.cp2k_colvar),
            (CP2K_KIND_TEMPLATE, &self.cp2k_kind),
            (MOLPRO_OPT_TEMPLATE, &self.molpro_opt),
        ]
        .into_iter()
    }
}

fn load_or(dir: &Path, file: &str, fallback: Template) -> Result<Template, TemplateLoadError> {
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Template::new(file, text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(fallback),
        Err(e) => Err(TemplateLoadError::Io { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod rendering {
        use super::*;

        #[test]
        fn substitutes_every_occurrence_of_a_placeholder() {
            let t = Template::new("t", "PROJECT $var_name\nRESTART $var_name.restart\n");
            let out = t.render(&Substitutions::new().var("name", "job_1.20")).unwrap();
            assert_eq!(out, "PROJECT job_1.20\nRESTART job_1.20.restart\n");
        }

        #[test]
        fn matches_the_longest_identifier() {
            // `$var_constraint_n` must not satisfy `$var_constraint_distance`.
            let t = Template::new("t", "COLVAR $var_constraint_n TARGET $var_constraint_distance");
            let subs = Substitutions::new()
                .var("constraint_n", 2)
                .var("constraint_distance", "1.40");
            assert_eq!(t.render(&subs).unwrap(), "COLVAR 2 TARGET 1.40");
        }

        #[test]
        fn does_not_alias_placeholders_sharing_a_prefix() {
            let t = Template::new("t", "$var_constraint_distance");
            let err = t
                .render(&Substitutions::new().var("constraint", "oops"))
                .unwrap_err();
            assert_eq!(
                err,
                TemplateError::UnresolvedPlaceholder {
                    template: "t".to_string(),
                    name: "var_constraint_distance".to_string(),
                }
            );
        }

        #[test]
        fn leaves_ordinary_dollar_signs_alone() {
            let t = Template::new("t", "cost $5, path $HOME, end$");
            let out = t.render(&Substitutions::new()).unwrap();
            assert_eq!(out, "cost $5, path $HOME, end$");
        }

        #[test]
        fn substitutes_multi_line_blocks() {
            let t = Template::new("t", "  &CONSTRAINT\n$block_constraints1\n  &END CONSTRAINT\n");
            let block = "    &COLLECTIVE\n    &END COLLECTIVE";
            let out = t
                .render(&Substitutions::new().block("constraints1", block))
                .unwrap();
            assert_eq!(
                out,
                "  &CONSTRAINT\n    &COLLECTIVE\n    &END COLLECTIVE\n  &END CONSTRAINT\n"
            );
        }

        #[test]
        fn ignores_keys_the_template_never_mentions() {
            let t = Template::new("t", "STEPS $var_steps");
            let subs = Substitutions::new().var("steps", 300).var("unused", "x");
            assert_eq!(t.render(&subs).unwrap(), "STEPS 300");
        }

        #[test]
        fn does_not_rescan_substituted_values() {
            let t = Template::new("t", "$var_a");
            let out = t.render(&Substitutions::new().var("a", "$var_b")).unwrap();
            assert_eq!(out, "$var_b");
        }

        #[test]
        fn reports_the_template_name_on_unresolved_placeholders() {
            let t = Template::new("cp2k_md.inp.tmpl", "STEPS $var_steps");
            let err = t.render(&Substitutions::new()).unwrap_err();
            assert!(err.to_string().contains("cp2k_md.inp.tmpl"));
            assert!(err.to_string().contains("$var_steps"));
        }
    }

    mod placeholders {
        use super::*;

        #[test]
        fn lists_identifiers_in_sorted_order() {
            let t = Template::new("t", "$var_steps $block_kind $var_cell $var_steps");
            let found: Vec<&str> = t.placeholders().into_iter().collect();
            assert_eq!(found, vec!["block_kind", "var_cell", "var_steps"]);
        }

        #[test]
        fn skips_non_placeholder_identifiers() {
            let t = Template::new("t", "$PATH and $var_name");
            let found: Vec<&str> = t.placeholders().into_iter().collect();
            assert_eq!(found, vec!["var_name"]);
        }
    }

    mod sets {
        use super::*;
        use std::fs;

        #[test]
        fn embedded_set_carries_the_expected_placeholders() {
            let set = TemplateSet::embedded();
            let md = set.cp2k_md.placeholders();
            for name in [
                "var_name",
                "var_filename",
                "var_steps",
                "var_timestep",
                "var_temperature",
                "var_dump_frequency",
                "var_cell",
                "block_constraints1",
                "block_constraints2",
                "block_kind",
                "block_charge",
            ] {
                assert!(md.contains(name), "cp2k_md is missing {name}");
            }
            let opt = set.molpro_opt.placeholders();
            for name in ["var_name", "var_xyzfilename", "block_constraints"] {
                assert!(opt.contains(name), "molpro_opt is missing {name}");
            }
        }

        #[test]
        fn directory_overrides_replace_only_their_own_file() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join(CP2K_KIND_TEMPLATE), "KIND $var_atomtype\n").unwrap();

            let set = TemplateSet::from_dir(dir.path()).unwrap();
            assert_eq!(set.cp2k_kind.text(), "KIND $var_atomtype\n");
            assert_eq!(set.cp2k_md, TemplateSet::embedded().cp2k_md);
        }

        #[test]
        fn missing_directory_falls_back_to_embedded() {
            let dir = tempfile::tempdir().unwrap();
            let set = TemplateSet::from_dir(dir.path().join("no_such")).unwrap();
            assert_eq!(set, TemplateSet::embedded());
        }
    }
}
