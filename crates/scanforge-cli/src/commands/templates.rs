use crate::cli::{TemplatesArgs, TemplatesCommands};
use crate::error::{CliError, Result};
use scanforge::core::decks::template::TemplateSet;
use std::path::Path;
use tracing::info;

pub fn run(args: TemplatesArgs) -> Result<()> {
    match args.command {
        TemplatesCommands::List => handle_list(),
        TemplatesCommands::Export { dir, force } => handle_export(&dir, force),
    }
}

fn handle_list() -> Result<()> {
    let set = TemplateSet::embedded();
    for (file_name, template) in set.iter() {
        println!("{}", file_name);
        let placeholders: Vec<&str> = template.placeholders().into_iter().collect();
        if placeholders.is_empty() {
            println!("    (no placeholders)");
        } else {
            println!("    {}", placeholders.join(", "));
        }
    }
    Ok(())
}

fn handle_export(dir: &Path, force: bool) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let files = TemplateSet::embedded_files();
    for (file_name, text) in files {
        let path = dir.join(file_name);
        if path.exists() && !force {
            return Err(CliError::Argument(format!(
                "'{}' already exists; pass --force to overwrite.",
                path.display()
            )));
        }
        std::fs::write(&path, text)?;
        println!("✓ Wrote {}", path.display());
    }

    info!("Exported {} template files to {:?}", files.len(), dir);
    Ok(())
}
