//! Test utilities for IdeaFlow
//!
//! This module provides common test utilities: temporary directories and
//! files, sample ideas, and assertion helpers.

use crate::error::Result;
use crate::storage::{Category, Idea, MemoryStore};
use crate::vault::Vault;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// A minimal idea with a fixed creation time
pub fn sample_idea(id: &str, title: &str) -> Idea {
    Idea {
        id: id.to_string(),
        created_at: 1_700_000_000_000,
        title: title.to_string(),
        transcript: format!("Notes about {}", title.to_lowercase()),
        summary: format!("{} in one line", title),
        category: Category::Other,
        ..Default::default()
    }
}

/// In-memory vault seeded with `ideas`, first element newest
pub fn memory_vault(ideas: Vec<Idea>) -> Vault<MemoryStore> {
    Vault::new(MemoryStore::with_ideas(ideas))
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let msg = format!("{:#}", e);
            assert!(
                msg.contains(expected),
                "Error '{}' does not contain '{}'",
                msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdeaflowError;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "note.txt", "hello");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_sample_idea_fields() {
        let idea = sample_idea("id-1", "Tea Shop");
        assert_eq!(idea.transcript, "Notes about tea shop");
        assert!(!idea.is_favorite);
    }

    #[test]
    fn test_memory_vault_order() {
        let vault = memory_vault(vec![sample_idea("b", "B"), sample_idea("a", "A")]);
        let ids: Vec<String> = vault.get_ideas().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_assert_error_contains() {
        let result: Result<()> = Err(IdeaflowError::Config("invalid".to_string()).into());
        assert_error_contains(result, "invalid");
    }

    #[test]
    #[should_panic(expected = "Expected error")]
    fn test_assert_error_contains_panics_on_ok() {
        assert_error_contains(Ok(()), "anything");
    }
}
