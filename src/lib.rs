//! IdeaFlow - AI-assisted idea vault library
//!
//! This library provides the core functionality for IdeaFlow: a local vault
//! of structured ideas, the AI pipeline that turns raw notes and voice
//! recordings into those ideas, and JSON backup/restore.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: `Idea` record type and the `RecordStore` backends (SQLite, memory)
//! - `vault`: Vault service (upsert, delete, favorites, edits, import/export)
//! - `pipeline`: AI analysis, refine, deep-dive and chat pipeline (Gemini)
//! - `prompts`: Prompt text sent to the models
//! - `view`: Filtering, sorting and statistics over a vault snapshot
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use ideaflow::storage::{Idea, SqliteStorage};
//! use ideaflow::Vault;
//!
//! fn main() -> anyhow::Result<()> {
//!     let vault = Vault::new(SqliteStorage::new()?);
//!     vault.save_idea(&Idea {
//!         id: "1".into(),
//!         title: "Board game cafe".into(),
//!         ..Default::default()
//!     })?;
//!     println!("{}", vault.export_json()?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod storage;
pub mod vault;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use error::{IdeaflowError, Result};
pub use pipeline::{CaptureInput, IdeaPipeline};
pub use storage::{Category, Idea, RecordStore};
pub use vault::Vault;

#[cfg(test)]
pub mod test_utils;
