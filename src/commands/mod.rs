/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `ideas`: list, show, edit, favorite, delete and stats
- `assist`: capture, refine, expand and chat (calls the analysis pipeline)
- `backup`: export and import of JSON backups

Handlers take a [`Vault`] so they run the same against SQLite and the
in-memory store.
*/

use crate::config::Config;
use crate::error::Result;
use crate::storage::{Idea, SqliteStorage};
use crate::vault::Vault;
use chrono::DateTime;

pub mod assist;
pub mod backup;
pub mod ideas;

/// Open the vault named by configuration
///
/// Uses `vault.db_path` when set, otherwise the platform data directory.
pub fn open_vault(config: &Config) -> Result<Vault<SqliteStorage>> {
    let storage = match &config.vault.db_path {
        Some(path) => SqliteStorage::new_with_path(path)?,
        None => SqliteStorage::new()?,
    };
    Ok(Vault::new(storage))
}

/// `createdAt` in UTC
pub(crate) fn format_created_at(idea: &Idea) -> String {
    DateTime::from_timestamp_millis(idea.created_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Shorten to `max` characters with a trailing ellipsis
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
