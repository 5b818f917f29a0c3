//! Backup export and import commands

use crate::config::Config;
use crate::error::{IdeaflowError, Result};
use crate::storage::RecordStore;
use crate::vault::Vault;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Directory an export goes to: flag, then config, then the working directory
pub fn resolve_export_dir(config: &Config, dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(|| config.vault.export_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `export` command
pub fn run_export<S: RecordStore>(vault: &Vault<S>, dir: &Path) -> Result<PathBuf> {
    let count = vault.get_ideas().len();
    let path = vault.export_vault(dir)?;
    println!(
        "{}",
        format!("Exported {} ideas to {}", count, path.display()).green()
    );
    Ok(path)
}

/// `import` command
///
/// # Errors
///
/// Fails when the file cannot be read or the backup is rejected; the vault
/// is left as it was in both cases.
pub fn run_import<S: RecordStore>(vault: &Vault<S>, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)?;

    if !vault.import_vault(&content) {
        return Err(IdeaflowError::Import(format!(
            "{} is not a valid IdeaFlow backup",
            file.display()
        ))
        .into());
    }

    let count = vault.get_ideas().len();
    println!("{}", format!("Restored {} ideas", count).green());
    Ok(())
}
