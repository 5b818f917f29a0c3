//! Idea analysis pipeline
//!
//! The pipeline turns raw captured input into the structured fields of an
//! [`Idea`] and runs the on-demand refine and deep dive passes. The vault
//! never sees a partially analyzed record: callers only persist the result of
//! a completed [`IdeaPipeline::analyze`] call.

pub mod gemini;

pub use gemini::GeminiPipeline;

use crate::config::PipelineConfig;
use crate::error::{IdeaflowError, Result};
use crate::storage::{Category, Idea};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

/// Transcript stored when an audio analysis cannot be parsed
pub const UNPARSED_TRANSCRIPT: &str = "Could not parse transcript.";

/// Deep dive text used when the model returns nothing
pub const EMPTY_EXPANSION: &str = "Could not generate expansion.";

/// Raw input handed to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureInput {
    /// Typed free text
    Text(String),
    /// Recorded voice note
    Audio {
        /// Encoded audio bytes
        data: Vec<u8>,
        /// MIME type of `data`, e.g. `audio/webm`
        mime_type: String,
    },
}

impl CaptureInput {
    /// Read an audio file, guessing its MIME type from the extension
    pub fn from_audio_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mime_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("ogg") | Some("oga") => "audio/ogg",
            Some("m4a") | Some("mp4") => "audio/mp4",
            Some("flac") => "audio/flac",
            Some("aac") => "audio/aac",
            _ => "audio/webm",
        }
        .to_string();

        tracing::debug!(path = %path.display(), bytes = data.len(), %mime_type, "Loaded audio");
        Ok(Self::Audio { data, mime_type })
    }

    /// Text preserved in the placeholder when analysis output is unusable
    fn fallback_transcript(&self) -> String {
        match self {
            CaptureInput::Text(text) => text.clone(),
            CaptureInput::Audio { .. } => UNPARSED_TRANSCRIPT.to_string(),
        }
    }
}

/// Structured fields extracted from a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaAnalysis {
    pub title: String,
    pub transcript: String,
    pub summary: String,
    pub action_items: Vec<String>,
    pub tags: Vec<String>,
    pub category: Category,
    /// Subject for the illustration request
    pub image_prompt: String,
    /// Rendered illustration, if one was generated
    pub image_url: Option<String>,
}

impl IdeaAnalysis {
    /// Clearly labeled stand-in for an unparseable model response
    pub fn placeholder(input: &CaptureInput) -> Self {
        let (summary, image_prompt) = match input {
            CaptureInput::Text(_) => ("Could not analyze the idea.", "abstract concept"),
            CaptureInput::Audio { .. } => ("AI response format error.", "abstract error concept"),
        };

        Self {
            title: "Untitled Idea".to_string(),
            transcript: input.fallback_transcript(),
            summary: summary.to_string(),
            action_items: Vec::new(),
            tags: Vec::new(),
            category: Category::Other,
            image_prompt: image_prompt.to_string(),
            image_url: None,
        }
    }

    /// Assemble a complete, never-before-saved idea
    ///
    /// # Examples
    ///
    /// ```
    /// use ideaflow::pipeline::{CaptureInput, IdeaAnalysis};
    ///
    /// let analysis = IdeaAnalysis::placeholder(&CaptureInput::Text("tea shop".into()));
    /// let idea = analysis.into_idea(1_700_000_000_000);
    /// assert_eq!(idea.title, "Untitled Idea");
    /// assert_eq!(idea.transcript, "tea shop");
    /// assert!(!idea.is_favorite);
    /// ```
    pub fn into_idea(self, created_at: i64) -> Idea {
        Idea {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            title: self.title,
            transcript: self.transcript,
            summary: self.summary,
            action_items: self.action_items,
            tags: self.tags,
            category: self.category,
            is_favorite: false,
            image_url: self.image_url,
            expansion: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Wire shape of the analysis JSON; every field optional so a partial
/// answer still yields something useful
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct AnalysisPayload {
    title: Option<String>,
    transcript: Option<String>,
    summary: Option<String>,
    action_items: Vec<String>,
    tags: Vec<String>,
    category: Option<String>,
    image_prompt: Option<String>,
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*\n?(.*?)\n?\s*```\s*$").expect("valid fence regex")
    })
}

/// Remove a surrounding markdown code fence from model output
///
/// # Examples
///
/// ```
/// use ideaflow::pipeline::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
/// ```
pub fn strip_code_fences(raw: &str) -> &str {
    match fence_pattern().captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// Parse the analysis JSON, substituting a placeholder when unusable
///
/// Missing string fields fall back to the placeholder's values and an
/// unknown category becomes `Other`.
pub fn parse_analysis(raw: &str, input: &CaptureInput) -> IdeaAnalysis {
    let placeholder = IdeaAnalysis::placeholder(input);
    let cleaned = strip_code_fences(raw);

    let payload: AnalysisPayload = match serde_json::from_str(cleaned) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Analysis JSON parsing failed: {}", e);
            return placeholder;
        }
    };

    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    IdeaAnalysis {
        title: non_empty(payload.title).unwrap_or(placeholder.title),
        transcript: non_empty(payload.transcript).unwrap_or(placeholder.transcript),
        summary: non_empty(payload.summary).unwrap_or(placeholder.summary),
        action_items: payload.action_items,
        tags: dedup_preserving_order(payload.tags),
        category: payload
            .category
            .and_then(|c| c.parse().ok())
            .unwrap_or_default(),
        image_prompt: non_empty(payload.image_prompt).unwrap_or(placeholder.image_prompt),
        image_url: None,
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Result of a refine pass
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Refinement {
    /// Improved title
    pub title: String,
    /// Deeper summary that replaces the current one
    #[serde(rename = "expandedSummary")]
    pub summary: String,
    /// Appended after the existing action items
    pub additional_action_items: Vec<String>,
    /// Unioned with the existing tags
    pub new_tags: Vec<String>,
}

impl Refinement {
    /// Merge into `idea`
    ///
    /// Title and summary are replaced when non-empty, action items are
    /// appended, and tags are unioned keeping existing order first.
    ///
    /// # Examples
    ///
    /// ```
    /// use ideaflow::pipeline::Refinement;
    /// use ideaflow::storage::Idea;
    ///
    /// let mut idea = Idea {
    ///     tags: vec!["a".into(), "b".into()],
    ///     action_items: vec!["first".into()],
    ///     ..Default::default()
    /// };
    /// Refinement {
    ///     title: "Sharper".into(),
    ///     summary: String::new(),
    ///     additional_action_items: vec!["second".into()],
    ///     new_tags: vec!["b".into(), "c".into()],
    /// }
    /// .apply_to(&mut idea);
    ///
    /// assert_eq!(idea.title, "Sharper");
    /// assert_eq!(idea.action_items, vec!["first", "second"]);
    /// assert_eq!(idea.tags, vec!["a", "b", "c"]);
    /// ```
    pub fn apply_to(&self, idea: &mut Idea) {
        if !self.title.trim().is_empty() {
            idea.title = self.title.clone();
        }
        if !self.summary.trim().is_empty() {
            idea.summary = self.summary.clone();
        }
        idea.action_items.extend(self.additional_action_items.iter().cloned());
        for tag in &self.new_tags {
            if !idea.tags.contains(tag) {
                idea.tags.push(tag.clone());
            }
        }
    }
}

/// Parse the refine JSON; unlike analysis, garbage here is an error
pub fn parse_refinement(raw: &str) -> Result<Refinement> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(IdeaflowError::Pipeline("No response from refine model".to_string()).into());
    }
    serde_json::from_str(cleaned).map_err(|e| {
        IdeaflowError::Pipeline(format!("Failed to parse refine response: {}", e)).into()
    })
}

/// Speaker of one chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    /// Role name on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One message of a brainstorming chat; chats are never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// AI collaborator that analyzes and augments ideas
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use ideaflow::error::Result;
/// use ideaflow::pipeline::{CaptureInput, ChatTurn, IdeaAnalysis, IdeaPipeline, Refinement};
/// use ideaflow::storage::Idea;
///
/// struct Canned;
///
/// #[async_trait]
/// impl IdeaPipeline for Canned {
///     async fn analyze(&self, input: CaptureInput, _image: bool) -> Result<IdeaAnalysis> {
///         Ok(IdeaAnalysis::placeholder(&input))
///     }
///     async fn refine(&self, _idea: &Idea) -> Result<Refinement> {
///         Ok(Refinement::default())
///     }
///     async fn deep_dive(&self, _idea: &Idea) -> Result<String> {
///         Ok("PHASE 1: START".to_string())
///     }
///     async fn chat(&self, _idea: &Idea, _history: &[ChatTurn], message: &str) -> Result<String> {
///         Ok(format!("You said: {}", message))
///     }
/// }
/// ```
#[async_trait]
pub trait IdeaPipeline: Send + Sync {
    /// Extract structured fields from raw input, optionally with an image
    async fn analyze(&self, input: CaptureInput, generate_image: bool) -> Result<IdeaAnalysis>;

    /// Improve title/summary and propose more action items and tags
    async fn refine(&self, idea: &Idea) -> Result<Refinement>;

    /// Long-form expansion stored verbatim in `Idea::expansion`
    async fn deep_dive(&self, idea: &Idea) -> Result<String>;

    /// Answer `message` in a brainstorming chat about `idea`
    ///
    /// `history` holds the earlier turns, oldest first, without `message`.
    async fn chat(&self, idea: &Idea, history: &[ChatTurn], message: &str) -> Result<String>;
}

/// Create the configured pipeline
pub fn create_pipeline(config: &PipelineConfig) -> Result<Box<dyn IdeaPipeline>> {
    Ok(Box::new(GeminiPipeline::new(config.clone())?))
}
