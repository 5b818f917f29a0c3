//! In-process record store
//!
//! Keeps the vault as an ordered list with the same prepend-on-insert,
//! replace-in-place semantics as the SQLite store. Nothing survives the
//! process.

use std::sync::RwLock;

use super::{Idea, RecordStore};
use crate::error::{IdeaflowError, Result};

/// Volatile [`RecordStore`]
///
/// # Examples
///
/// ```
/// use ideaflow::storage::{Idea, MemoryStore, RecordStore};
///
/// let store = MemoryStore::new();
/// store.put(&Idea { id: "a".into(), title: "X".into(), ..Default::default() }).unwrap();
/// assert_eq!(store.get_all().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    ideas: RwLock<Vec<Idea>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with `ideas`, first element materialized first
    pub fn with_ideas(ideas: Vec<Idea>) -> Self {
        Self {
            ideas: RwLock::new(ideas),
        }
    }
}

fn poisoned() -> IdeaflowError {
    IdeaflowError::Storage("In-memory vault lock poisoned".to_string())
}

impl RecordStore for MemoryStore {
    fn get_all(&self) -> Vec<Idea> {
        match self.ideas.read() {
            Ok(ideas) => ideas.clone(),
            Err(_) => {
                tracing::warn!("In-memory vault lock poisoned, treating it as empty");
                Vec::new()
            }
        }
    }

    fn put(&self, idea: &Idea) -> Result<()> {
        let mut ideas = self.ideas.write().map_err(|_| poisoned())?;
        match ideas.iter_mut().find(|existing| existing.id == idea.id) {
            Some(existing) => *existing = idea.clone(),
            None => ideas.insert(0, idea.clone()),
        }
        Ok(())
    }

    fn update(&self, idea: &Idea) -> Result<bool> {
        let mut ideas = self.ideas.write().map_err(|_| poisoned())?;
        match ideas.iter_mut().find(|existing| existing.id == idea.id) {
            Some(existing) => {
                *existing = idea.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut ideas = self.ideas.write().map_err(|_| poisoned())?;
        ideas.retain(|idea| idea.id != id);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.ideas.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    fn replace_all(&self, ideas: &[Idea]) -> Result<()> {
        let mut current = self.ideas.write().map_err(|_| poisoned())?;
        current.clear();
        for idea in ideas {
            if !current.iter().any(|existing| existing.id == idea.id) {
                current.push(idea.clone());
            }
        }
        Ok(())
    }
}
