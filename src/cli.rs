//! Command-line interface definition for IdeaFlow
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for capturing, browsing, and backing up ideas.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// IdeaFlow - capture ideas by text or voice and keep them in a local vault
#[derive(Parser, Debug, Clone)]
#[command(name = "ideaflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the vault database location
    #[arg(long, env = "IDEAFLOW_VAULT_DB")]
    pub vault_db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for IdeaFlow
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a note or recording and save it as a new idea
    Capture {
        /// Typed note to analyze
        #[arg(short, long, conflicts_with = "audio", required_unless_present = "audio")]
        text: Option<String>,

        /// Audio recording to transcribe and analyze
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Skip illustration generation
        #[arg(long)]
        no_image: bool,
    },

    /// List ideas in the vault
    List {
        /// Case-insensitive match on title or tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only show one category (work, personal, creative, other)
        #[arg(short, long, conflicts_with = "favorites")]
        category: Option<String>,

        /// Only show favorites
        #[arg(short, long)]
        favorites: bool,

        /// Sort order: newest, oldest, title
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Print the matching ideas as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one idea in full
    Show {
        /// Idea id or unique prefix (8+ characters)
        id: String,

        /// Print the idea as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit the title or transcript of an idea
    Edit {
        /// Idea id or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New transcript
        #[arg(long)]
        transcript: Option<String>,
    },

    /// Toggle the favorite flag of an idea
    Favorite {
        /// Idea id or unique prefix
        id: String,
    },

    /// Delete an idea
    Delete {
        /// Idea id or unique prefix
        id: String,
    },

    /// Ask the model to polish an idea's title, summary, actions and tags
    Refine {
        /// Idea id or unique prefix
        id: String,
    },

    /// Generate and store a deep-dive expansion for an idea
    Expand {
        /// Idea id or unique prefix
        id: String,
    },

    /// Brainstorm about an idea in an interactive chat
    Chat {
        /// Idea id or unique prefix
        id: String,
    },

    /// Write a JSON backup of the whole vault
    Export {
        /// Output directory (defaults to vault.export_dir, then the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Replace the vault with the contents of a JSON backup
    Import {
        /// Backup file to read
        file: PathBuf,
    },

    /// Show vault statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            vault_db: None,
            command: Commands::Stats { json: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.vault_db.is_none());
        assert!(matches!(cli.command, Commands::Stats { json: false }));
    }

    #[test]
    fn test_cli_parse_capture_text() {
        let cli = Cli::try_parse_from(["ideaflow", "capture", "--text", "a robot gardener"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Capture {
            text,
            audio,
            no_image,
        } = cli.command
        {
            assert_eq!(text, Some("a robot gardener".to_string()));
            assert_eq!(audio, None);
            assert!(!no_image);
        } else {
            panic!("Expected Capture command");
        }
    }

    #[test]
    fn test_cli_parse_capture_audio_without_image() {
        let cli =
            Cli::try_parse_from(["ideaflow", "capture", "--audio", "memo.webm", "--no-image"])
                .unwrap();
        if let Commands::Capture {
            text,
            audio,
            no_image,
        } = cli.command
        {
            assert_eq!(text, None);
            assert_eq!(audio, Some(PathBuf::from("memo.webm")));
            assert!(no_image);
        } else {
            panic!("Expected Capture command");
        }
    }

    #[test]
    fn test_cli_parse_capture_requires_input() {
        assert!(Cli::try_parse_from(["ideaflow", "capture"]).is_err());
    }

    #[test]
    fn test_cli_parse_capture_rejects_both_inputs() {
        let cli = Cli::try_parse_from([
            "ideaflow", "capture", "--text", "x", "--audio", "memo.webm",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_list_defaults() {
        let cli = Cli::try_parse_from(["ideaflow", "list"]).unwrap();
        if let Commands::List {
            search,
            category,
            favorites,
            sort,
            json,
        } = cli.command
        {
            assert_eq!(search, None);
            assert_eq!(category, None);
            assert!(!favorites);
            assert_eq!(sort, "newest");
            assert!(!json);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "ideaflow", "list", "--search", "robot", "--category", "work", "--sort", "title",
            "--json",
        ])
        .unwrap();
        if let Commands::List {
            search,
            category,
            sort,
            json,
            ..
        } = cli.command
        {
            assert_eq!(search, Some("robot".to_string()));
            assert_eq!(category, Some("work".to_string()));
            assert_eq!(sort, "title");
            assert!(json);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_parse_list_category_conflicts_with_favorites() {
        let cli = Cli::try_parse_from(["ideaflow", "list", "--category", "work", "--favorites"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_edit() {
        let cli =
            Cli::try_parse_from(["ideaflow", "edit", "abc12345", "--title", "New"]).unwrap();
        if let Commands::Edit {
            id,
            title,
            transcript,
        } = cli.command
        {
            assert_eq!(id, "abc12345");
            assert_eq!(title, Some("New".to_string()));
            assert_eq!(transcript, None);
        } else {
            panic!("Expected Edit command");
        }
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::try_parse_from(["ideaflow", "chat", "abc12345"]).unwrap();
        if let Commands::Chat { id } = cli.command {
            assert_eq!(id, "abc12345");
        } else {
            panic!("Expected Chat command");
        }
        assert!(Cli::try_parse_from(["ideaflow", "chat"]).is_err());
    }

    #[test]
    fn test_cli_parse_import_requires_file() {
        assert!(Cli::try_parse_from(["ideaflow", "import"]).is_err());
        let cli = Cli::try_parse_from(["ideaflow", "import", "backup.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { .. }));
    }

    #[test]
    fn test_cli_parse_export_with_dir() {
        let cli = Cli::try_parse_from(["ideaflow", "export", "--dir", "/tmp/out"]).unwrap();
        if let Commands::Export { dir } = cli.command {
            assert_eq!(dir, Some(PathBuf::from("/tmp/out")));
        } else {
            panic!("Expected Export command");
        }
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "ideaflow",
            "--config",
            "custom.yaml",
            "-v",
            "--vault-db",
            "/tmp/v.db",
            "stats",
        ])
        .unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert!(cli.verbose);
        assert_eq!(cli.vault_db, Some(PathBuf::from("/tmp/v.db")));
    }

    #[test]
    fn test_cli_parse_missing_command() {
        assert!(Cli::try_parse_from(["ideaflow"]).is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        assert!(Cli::try_parse_from(["ideaflow", "invalid"]).is_err());
    }
}
