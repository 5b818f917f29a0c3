//! Pipeline-backed commands: capture, refine, expand, chat
//!
//! Each handler has a core function taking `&dyn IdeaPipeline` so tests can
//! drive it with a canned pipeline, and a `run_*` wrapper that builds the
//! configured pipeline and prints the outcome.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{create_pipeline, CaptureInput, ChatTurn, IdeaPipeline};
use crate::storage::{Idea, RecordStore};
use crate::vault::Vault;
use chrono::Utc;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Shown in place of a reply when a chat request fails
pub const CHAT_RETRY_MESSAGE: &str = "I hit a snag. Can you try asking that again?";

/// Analyze `input` and store the resulting idea at the top of the vault
pub async fn capture<S: RecordStore>(
    vault: &Vault<S>,
    pipeline: &dyn IdeaPipeline,
    input: CaptureInput,
    generate_image: bool,
) -> Result<Idea> {
    let analysis = pipeline.analyze(input, generate_image).await?;
    let idea = analysis.into_idea(Utc::now().timestamp_millis());
    vault.save_idea(&idea)?;
    tracing::info!(id = %idea.id, title = %idea.title, "Captured idea");
    Ok(idea)
}

/// Ask for a refinement and merge it into the stored idea
///
/// Returns `Ok(None)` when the idea was deleted while the request ran.
pub async fn refine<S: RecordStore>(
    vault: &Vault<S>,
    pipeline: &dyn IdeaPipeline,
    id: &str,
) -> Result<Option<Idea>> {
    let idea = vault.find_idea(id)?;
    let refinement = pipeline.refine(&idea).await?;
    vault.apply_refinement(&idea.id, &refinement)
}

/// Generate a deep dive and store it on the idea
///
/// Returns `Ok(None)` when the idea was deleted while the request ran.
pub async fn expand<S: RecordStore>(
    vault: &Vault<S>,
    pipeline: &dyn IdeaPipeline,
    id: &str,
) -> Result<Option<Idea>> {
    let idea = vault.find_idea(id)?;
    let expansion = pipeline.deep_dive(&idea).await?;
    vault.apply_expansion(&idea.id, expansion)
}

/// Send one chat message about `idea`
///
/// On success both the message and the reply are appended to `history`.
/// A failed request leaves `history` unchanged so the user can ask again.
pub async fn chat_turn(
    pipeline: &dyn IdeaPipeline,
    idea: &Idea,
    history: &mut Vec<ChatTurn>,
    message: &str,
) -> Result<String> {
    let reply = pipeline.chat(idea, history.as_slice(), message).await?;
    history.push(ChatTurn::user(message));
    history.push(ChatTurn::model(reply.clone()));
    Ok(reply)
}

/// `capture` command
pub async fn run_capture<S: RecordStore>(
    config: &Config,
    vault: &Vault<S>,
    input: CaptureInput,
    no_image: bool,
) -> Result<()> {
    let pipeline = create_pipeline(&config.pipeline)?;
    let generate_image = config.pipeline.generate_images && !no_image;

    println!("{}", "Analyzing...".dimmed());
    let idea = capture(vault, pipeline.as_ref(), input, generate_image).await?;

    println!(
        "{} {} [{}]",
        "Captured".green(),
        idea.title.bold(),
        idea.category
    );
    println!("{} {}", "id:".dimmed(), idea.short_id().cyan());
    if !idea.summary.is_empty() {
        println!("{}", idea.summary);
    }
    Ok(())
}

/// `refine` command
pub async fn run_refine<S: RecordStore>(config: &Config, vault: &Vault<S>, id: &str) -> Result<()> {
    let pipeline = create_pipeline(&config.pipeline)?;

    println!("{}", "Refining...".dimmed());
    match refine(vault, pipeline.as_ref(), id).await? {
        Some(idea) => {
            println!("{} {}", "Refined".green(), idea.title.bold());
            println!("{}", idea.summary);
        }
        None => println!("{}", "Idea was deleted before the refinement finished".yellow()),
    }
    Ok(())
}

/// `expand` command
pub async fn run_expand<S: RecordStore>(config: &Config, vault: &Vault<S>, id: &str) -> Result<()> {
    let pipeline = create_pipeline(&config.pipeline)?;

    println!("{}", "Expanding...".dimmed());
    match expand(vault, pipeline.as_ref(), id).await? {
        Some(idea) => {
            println!("{} {}\n", "Deep dive for".green(), idea.title.bold());
            println!("{}", idea.expansion.unwrap_or_default());
        }
        None => println!("{}", "Idea was deleted before the expansion finished".yellow()),
    }
    Ok(())
}

/// `chat` command: interactive brainstorming about one idea
///
/// The conversation lives only for this session and is never written to the
/// vault. `exit`, `quit`, Ctrl-C and Ctrl-D end it.
pub async fn run_chat<S: RecordStore>(config: &Config, vault: &Vault<S>, id: &str) -> Result<()> {
    let idea = vault.find_idea(id)?;
    let pipeline = create_pipeline(&config.pipeline)?;
    let mut history: Vec<ChatTurn> = Vec::new();

    let mut rl = DefaultEditor::new()?;

    println!("{} {}", "Brainstorming".cyan().bold(), idea.title.bold());
    println!(
        "{}\n",
        "Ask anything about this idea. Type 'exit' to leave.".dimmed()
    );

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let message = line.trim();
                if message.is_empty() {
                    continue;
                }
                if matches!(message, "exit" | "quit") {
                    break;
                }

                rl.add_history_entry(message)?;

                match chat_turn(pipeline.as_ref(), &idea, &mut history, message).await {
                    Ok(reply) => println!("\n{}\n", reply),
                    Err(e) => {
                        tracing::error!(id = %idea.id, "Chat request failed: {:#}", e);
                        println!("\n{}\n", CHAT_RETRY_MESSAGE.yellow());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }

    tracing::debug!(id = %idea.id, turns = history.len(), "Chat ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdeaflowError;
    use crate::pipeline::{ChatRole, IdeaAnalysis, Refinement};
    use crate::storage::{Category, MemoryStore};
    use async_trait::async_trait;

    struct Canned;

    #[async_trait]
    impl IdeaPipeline for Canned {
        async fn analyze(&self, input: CaptureInput, generate_image: bool) -> Result<IdeaAnalysis> {
            let mut analysis = IdeaAnalysis::placeholder(&input);
            analysis.title = "Garden Robot".to_string();
            analysis.category = Category::Creative;
            if generate_image {
                analysis.image_url = Some("data:image/png;base64,AAAA".to_string());
            }
            Ok(analysis)
        }

        async fn refine(&self, _idea: &Idea) -> Result<Refinement> {
            Ok(Refinement {
                title: "Autonomous Garden Robot".to_string(),
                summary: String::new(),
                additional_action_items: vec!["Order parts".to_string()],
                new_tags: vec!["robots".to_string()],
            })
        }

        async fn deep_dive(&self, idea: &Idea) -> Result<String> {
            Ok(format!("PHASE 1: {}", idea.title.to_uppercase()))
        }

        async fn chat(&self, idea: &Idea, history: &[ChatTurn], message: &str) -> Result<String> {
            Ok(format!(
                "{} ({} earlier): {}",
                idea.title,
                history.len(),
                message
            ))
        }
    }

    struct Failing;

    #[async_trait]
    impl IdeaPipeline for Failing {
        async fn analyze(&self, _input: CaptureInput, _image: bool) -> Result<IdeaAnalysis> {
            Err(IdeaflowError::Pipeline("boom".to_string()).into())
        }

        async fn refine(&self, _idea: &Idea) -> Result<Refinement> {
            Err(IdeaflowError::Pipeline("boom".to_string()).into())
        }

        async fn deep_dive(&self, _idea: &Idea) -> Result<String> {
            Err(IdeaflowError::Pipeline("boom".to_string()).into())
        }

        async fn chat(&self, _idea: &Idea, _history: &[ChatTurn], _message: &str) -> Result<String> {
            Err(IdeaflowError::Pipeline("boom".to_string()).into())
        }
    }

    fn stored(id: &str) -> Idea {
        Idea {
            id: id.to_string(),
            title: "Robot".to_string(),
            summary: "Weeds the garden".to_string(),
            action_items: vec!["Sketch".to_string()],
            tags: vec!["garden".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_capture_prepends_new_idea() {
        let vault = Vault::new(MemoryStore::with_ideas(vec![stored("older-idea-1")]));

        let idea = capture(&vault, &Canned, CaptureInput::Text("robot".to_string()), true)
            .await
            .unwrap();

        let ideas = vault.get_ideas();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0].id, idea.id);
        assert_eq!(idea.transcript, "robot");
        assert!(idea.image_url.is_some());
        assert!(!idea.is_favorite);
        assert!(idea.created_at > 0);
    }

    #[tokio::test]
    async fn test_capture_without_image() {
        let vault = Vault::new(MemoryStore::new());
        let idea = capture(&vault, &Canned, CaptureInput::Text("x".to_string()), false)
            .await
            .unwrap();
        assert!(idea.image_url.is_none());
    }

    #[tokio::test]
    async fn test_capture_failure_leaves_vault_untouched() {
        let vault = Vault::new(MemoryStore::new());
        let result = capture(&vault, &Failing, CaptureInput::Text("x".to_string()), true).await;
        assert!(result.is_err());
        assert!(vault.get_ideas().is_empty());
    }

    #[tokio::test]
    async fn test_refine_merges_into_stored_idea() {
        let vault = Vault::new(MemoryStore::with_ideas(vec![stored("idea-0001")]));

        let idea = refine(&vault, &Canned, "idea-0001").await.unwrap().unwrap();
        assert_eq!(idea.title, "Autonomous Garden Robot");
        assert_eq!(idea.summary, "Weeds the garden");
        assert_eq!(idea.action_items, vec!["Sketch", "Order parts"]);
        assert_eq!(idea.tags, vec!["garden", "robots"]);
        assert_eq!(vault.get_idea("idea-0001").unwrap(), idea);
    }

    #[tokio::test]
    async fn test_refine_failure_keeps_idea() {
        let vault = Vault::new(MemoryStore::with_ideas(vec![stored("idea-0001")]));
        assert!(refine(&vault, &Failing, "idea-0001").await.is_err());
        assert_eq!(vault.get_idea("idea-0001").unwrap(), stored("idea-0001"));
    }

    #[tokio::test]
    async fn test_expand_stores_expansion() {
        let vault = Vault::new(MemoryStore::with_ideas(vec![stored("idea-0001")]));

        let idea = expand(&vault, &Canned, "idea-0001").await.unwrap().unwrap();
        assert_eq!(idea.expansion.as_deref(), Some("PHASE 1: ROBOT"));
        assert_eq!(
            vault.get_idea("idea-0001").unwrap().expansion.as_deref(),
            Some("PHASE 1: ROBOT")
        );
    }

    #[tokio::test]
    async fn test_expand_unknown_idea() {
        let vault = Vault::new(MemoryStore::new());
        assert!(expand(&vault, &Canned, "missing-id").await.is_err());
    }

    #[tokio::test]
    async fn test_chat_turn_records_both_sides() {
        let idea = stored("idea-0001");
        let mut history = Vec::new();

        let first = chat_turn(&Canned, &idea, &mut history, "Is it cheap?")
            .await
            .unwrap();
        assert_eq!(first, "Robot (0 earlier): Is it cheap?");

        let second = chat_turn(&Canned, &idea, &mut history, "What breaks?")
            .await
            .unwrap();
        assert_eq!(second, "Robot (2 earlier): What breaks?");

        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ChatTurn::user("Is it cheap?"));
        assert_eq!(history[3].role, ChatRole::Model);
    }

    #[tokio::test]
    async fn test_chat_turn_failure_keeps_history() {
        let idea = stored("idea-0001");
        let mut history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];

        assert!(chat_turn(&Failing, &idea, &mut history, "again?")
            .await
            .is_err());
        assert_eq!(history.len(), 2);
    }
}
