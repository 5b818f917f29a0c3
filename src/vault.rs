//! Vault service
//!
//! The operations the rest of the application uses to read and change the
//! idea collection: upsert, delete, favorite toggling, edits that rewrite a
//! full record, and JSON backup/restore. Callers re-query with
//! [`Vault::get_ideas`] after every mutation instead of caching.

use crate::error::{IdeaflowError, Result};
use crate::pipeline::Refinement;
use crate::storage::{Idea, RecordStore};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the backup file written for `date`
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ideaflow::vault::backup_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(backup_file_name(date), "ideaflow_vault_backup_2024-03-09.json");
/// ```
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("ideaflow_vault_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Public operations over a [`RecordStore`]
pub struct Vault<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Vault<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All ideas, newest insertion first
    pub fn get_ideas(&self) -> Vec<Idea> {
        self.store.get_all()
    }

    /// A single idea by exact id
    pub fn get_idea(&self, id: &str) -> Option<Idea> {
        self.store.get(id)
    }

    /// Resolve a full id or 8+ character prefix to one idea
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches; `NotFound` with a note when the
    /// prefix is ambiguous.
    pub fn find_idea(&self, id_or_prefix: &str) -> Result<Idea> {
        if let Some(idea) = self.store.get(id_or_prefix) {
            return Ok(idea);
        }

        let mut matches: Vec<Idea> = self
            .store
            .get_all()
            .into_iter()
            .filter(|idea| idea.matches_id(id_or_prefix))
            .collect();

        match matches.len() {
            0 => Err(IdeaflowError::NotFound(id_or_prefix.to_string()).into()),
            1 => Ok(matches.remove(0)),
            n => Err(IdeaflowError::NotFound(format!(
                "{} is ambiguous ({} matches)",
                id_or_prefix, n
            ))
            .into()),
        }
    }

    /// Insert a new idea or replace the one with the same id
    pub fn save_idea(&self, idea: &Idea) -> Result<()> {
        self.store.put(idea)
    }

    /// Remove an idea; unknown ids are ignored
    pub fn delete_idea(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    /// Flip `is_favorite` and return the new value
    ///
    /// Returns `Ok(None)` without writing anything when the idea no longer
    /// exists.
    pub fn toggle_favorite(&self, id: &str) -> Result<Option<bool>> {
        self.update(id, |idea| idea.is_favorite = !idea.is_favorite)
            .map(|updated| updated.map(|idea| idea.is_favorite))
    }

    /// Rewrite title and/or transcript
    pub fn edit_idea(
        &self,
        id: &str,
        title: Option<String>,
        transcript: Option<String>,
    ) -> Result<Option<Idea>> {
        self.update(id, |idea| {
            if let Some(title) = title {
                idea.title = title;
            }
            if let Some(transcript) = transcript {
                idea.transcript = transcript;
            }
        })
    }

    /// Merge a refine result into the stored idea
    pub fn apply_refinement(&self, id: &str, refinement: &Refinement) -> Result<Option<Idea>> {
        self.update(id, |idea| refinement.apply_to(idea))
    }

    /// Store a deep dive verbatim
    pub fn apply_expansion(&self, id: &str, expansion: String) -> Result<Option<Idea>> {
        self.update(id, |idea| idea.expansion = Some(expansion))
    }

    /// Read, modify a full copy, write back; no-op when the id is gone
    ///
    /// The write goes through `RecordStore::update`, so a delete that lands
    /// between the read and the write wins.
    fn update<F>(&self, id: &str, change: F) -> Result<Option<Idea>>
    where
        F: FnOnce(&mut Idea),
    {
        let Some(mut idea) = self.store.get(id) else {
            tracing::debug!(id = %id, "Idea vanished before update, skipping");
            return Ok(None);
        };

        change(&mut idea);
        if !self.store.update(&idea)? {
            tracing::debug!(id = %id, "Idea deleted during update, skipping");
            return Ok(None);
        }
        Ok(Some(idea))
    }

    /// Pretty-printed JSON array of every idea
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.store.get_all())?)
    }

    /// Write a dated backup file into `dir` and return its path
    pub fn export_vault(&self, dir: &Path) -> Result<PathBuf> {
        let json = self.export_json()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(backup_file_name(Utc::now().date_naive()));
        std::fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "Exported vault");
        Ok(path)
    }

    /// Replace the whole vault with the ideas in `content`
    ///
    /// Returns `false`, leaving the vault untouched, when the content is not
    /// a JSON array, when its first element lacks a truthy `id` or `title`,
    /// or when storage fails. Later elements are not checked beyond being
    /// decodable as ideas.
    pub fn import_vault(&self, content: &str) -> bool {
        match self.try_import(content) {
            Ok(count) => {
                tracing::info!(count, "Vault restored");
                true
            }
            Err(e) => {
                tracing::error!("Failed to import vault: {:#}", e);
                false
            }
        }
    }

    fn try_import(&self, content: &str) -> Result<usize> {
        let ideas = parse_backup(content)?;
        self.store.replace_all(&ideas)?;
        Ok(ideas.len())
    }
}

/// Validate and decode a backup file
///
/// Duplicate ids keep their first occurrence.
pub fn parse_backup(content: &str) -> Result<Vec<Idea>> {
    let parsed: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| IdeaflowError::Import(format!("not valid JSON: {}", e)))?;

    let items = parsed
        .as_array()
        .ok_or_else(|| IdeaflowError::Import("backup must be a JSON array".to_string()))?;

    if let Some(first) = items.first() {
        if !is_truthy(first.get("id")) || !is_truthy(first.get("title")) {
            return Err(IdeaflowError::Import(
                "first record is missing an id or title".to_string(),
            )
            .into());
        }
    }

    let decoded: Vec<Idea> = serde_json::from_value(parsed)
        .map_err(|e| IdeaflowError::Import(format!("record could not be decoded: {}", e)))?;

    let mut seen = HashSet::new();
    let mut ideas = Vec::with_capacity(decoded.len());
    for idea in decoded {
        if seen.insert(idea.id.clone()) {
            ideas.push(idea);
        } else {
            tracing::warn!(id = %idea.id, "Dropping duplicate id in backup");
        }
    }

    Ok(ideas)
}

/// `null`, `false`, `0`, `""` and a missing field are falsy
fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}
